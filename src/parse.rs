use pest::Parser;

use crate::errors::*;
use crate::funcs::{self, EvalContext};
use crate::stack::{eval_postfix, to_postfix, Token};

#[derive(Parser)]
#[grammar = "calc.pest"]
pub struct CalcParser;

// the tokenizer emits single-character operators from a fixed set
fn op_symbol(s: &str) -> Result<&'static str, CalcError> {
    let sym = match s {
        "+" => "+",
        "-" => "-",
        "*" => "*",
        "/" => "/",
        "^" => "^",
        "%" => "%",
        "!" => "!",
        _ => return Err(CalcError::InvalidOp(s.to_string())),
    };
    Ok(sym)
}

// maps a grammar failure to the character the tokenizer stopped at
fn unexpected_char(expr: &str, err: &pest::error::Error<Rule>) -> CalcError {
    let pos = match err.location {
        pest::error::InputLocation::Pos(p) => p,
        pest::error::InputLocation::Span((start, _)) => start,
    };
    match expr.get(pos..).and_then(|tail| tail.chars().next()) {
        Some(c) => CalcError::InvalidCharacter(c),
        None => CalcError::Unreachable,
    }
}

// Splits an expression into a flat token list. Names are lowercased here,
// so the rest of the engine deals with one case only.
pub(crate) fn tokenize(expr: &str) -> Result<Vec<Token>, CalcError> {
    let pairs = match CalcParser::parse(Rule::expr, expr) {
        Ok(pairs) => pairs,
        Err(err) => return Err(unexpected_char(expr, &err)),
    };

    let mut tokens: Vec<Token> = Vec::new();
    for pair in pairs {
        let val = pair.as_str();
        match pair.as_rule() {
            Rule::number => match val.parse::<f64>() {
                Ok(n) => tokens.push(Token::Num(n)),
                Err(..) => return Err(CalcError::StrToFloat(val.to_string())),
            },
            Rule::ident => tokens.push(Token::Name(val.to_lowercase())),
            Rule::op => tokens.push(Token::Op(op_symbol(val)?)),
            Rule::open_b => tokens.push(Token::OpenB),
            Rule::close_b => tokens.push(Token::CloseB),
            Rule::arg_sep => tokens.push(Token::ArgSep),
            _ => return Err(CalcError::Unreachable),
        }
    }
    Ok(tokens)
}

/// Injects the multiplication omitted between adjacent values: `2pi`,
/// `3(4+5)`, `(1+2)(3+4)`, `5!2` and so on. A function name does not end
/// a value because it binds to the bracket that follows it.
pub(crate) fn insert_implicit_mul(tokens: Vec<Token>) -> Vec<Token> {
    let mut fixed: Vec<Token> = Vec::with_capacity(tokens.len());
    for (i, tok) in tokens.iter().enumerate() {
        fixed.push(tok.clone());
        let next = match tokens.get(i + 1) {
            Some(next) => next,
            None => break,
        };
        let ends_value = match tok {
            Token::Num(..) | Token::CloseB => true,
            Token::Op(op) => *op == "!",
            Token::Name(name) => !funcs::is_func(name),
            _ => false,
        };
        let starts_value = match next {
            Token::Num(..) | Token::OpenB | Token::Name(..) => true,
            _ => false,
        };
        if ends_value && starts_value {
            fixed.push(Token::Op("*"));
        }
    }
    fixed
}

/// Evaluates a given expression against the context and returns either
/// result or error. The context supplies the angle convention and the
/// values of `ans` and `mem`; evaluation never changes it.
pub fn evaluate(expr: &str, ctx: &EvalContext) -> CalcResult {
    let tokens = tokenize(expr)?;
    // only a blank input counts as empty: an expression that merely
    // produces no value, like `()`, is invalid instead
    if tokens.is_empty() {
        return Err(CalcError::EmptyExpression);
    }
    let tokens = insert_implicit_mul(tokens);
    let rpn = to_postfix(&tokens)?;
    eval_postfix(&rpn, ctx)
}

/// Appends the closing brackets missing at the end of the expression,
/// so e.g. a user typing `sin(2` still gets an answer. Extra closing
/// brackets are left as they are.
pub fn close_brackets(expr: &str) -> String {
    let mut depth = 0i32;
    for c in expr.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
    }

    let mut fixed = String::from(expr);
    while depth > 0 {
        fixed.push(')');
        depth -= 1;
    }
    fixed
}
