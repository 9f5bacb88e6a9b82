use std::fmt;

pub type CalcResult = Result<f64, CalcError>;
pub(crate) type CalcErrorResult = Result<(), CalcError>;

#[derive(PartialEq)]
pub enum CalcError {
    InvalidCharacter(char),
    StrToFloat(String),

    InvalidOp(String),
    MisplacedComma,
    OpenBracketMismatch,
    ClosingBracketMismatch,
    EmptyExpression,
    InvalidExpression,

    NotEnoughOperands(String),
    FunctionNotEnoughArgs(String, usize),

    VarUndeclared(String),

    DividedByZero,
    ModuloByZero,
    NotForNegativeInt(String),
    OnlyInt(String),
    InvalidArgument(String, String),
    ArgumentOutOfRange(String, String, String),

    Unreachable,
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            CalcError::InvalidCharacter(c) => write!(f, "Invalid character '{}'", c),
            CalcError::StrToFloat(s) => write!(f, "Failed to convert '{}' to float", s),

            CalcError::InvalidOp(s) => write!(f, "Invalid operator '{}'", s),
            CalcError::MisplacedComma => write!(f, "Argument separator outside of function arguments"),
            CalcError::OpenBracketMismatch => write!(f, "Mismatched opening bracket"),
            CalcError::ClosingBracketMismatch => write!(f, "Mismatched closing bracket"),
            CalcError::EmptyExpression => write!(f, "Nothing to calculate"),
            CalcError::InvalidExpression => write!(f, "Invalid expression"),

            CalcError::NotEnoughOperands(s) => write!(f, "Not enough operands for operator '{}'", s),
            CalcError::FunctionNotEnoughArgs(s, i) => write!(f, "Function '{}' requires {} arguments", s, i),

            CalcError::VarUndeclared(s) => write!(f, "Variable '{}' not found", s),

            CalcError::DividedByZero => write!(f, "Division by zero"),
            CalcError::ModuloByZero => write!(f, "Modulo by zero"),
            CalcError::NotForNegativeInt(s) => write!(f, "Function '{}' is not supported for negative numbers", s),
            CalcError::OnlyInt(s) => write!(f, "{} supports only integers", s),
            CalcError::InvalidArgument(func, val) => write!(f, "Invalid argument {} for function '{}'", val, func),
            CalcError::ArgumentOutOfRange(func, val, range) => {
                write!(f, "Argument {} of {} out of range({})", val, func, range)
            }

            CalcError::Unreachable => write!(f, "unreachable"),
        }
    }
}

impl fmt::Debug for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
