use crate::errors::*;
use crate::funcs::{self, EvalContext, OpInfo, DIV_EPSILON, UNARY_MINUS, UNARY_PLUS};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Token {
    Num(f64),
    Name(String),
    Op(&'static str),
    OpenB,
    CloseB,
    ArgSep,
}

// Shunting-yard state: queue holds pending operators and function names,
// output accumulates the postfix order.
pub(crate) struct Stack {
    queue: Vec<Token>,
    output: Vec<Token>,
    expect_unary: bool,
}

impl Stack {
    fn new() -> Stack {
        Stack {
            queue: Vec::new(),
            output: Vec::new(),
            expect_unary: true,
        }
    }

    // Moves queued operators to the output while their priority wins over
    // the incoming one. Function names and brackets stop the drain.
    fn pop_while_priority(&mut self, cur: OpInfo) {
        loop {
            if self.queue.is_empty() {
                return;
            }
            // queue is not empty, so unwrap is OK
            let e = self.queue.pop().unwrap();
            match &e {
                Token::Op(top) => {
                    let info = match funcs::op_info(top) {
                        Some(info) => info,
                        None => {
                            self.queue.push(e);
                            return;
                        }
                    };
                    let pop = if cur.right_assoc {
                        cur.precedence < info.precedence
                    } else {
                        cur.precedence <= info.precedence
                    };
                    if pop {
                        self.output.push(e);
                    } else {
                        self.queue.push(e);
                        return;
                    }
                }
                _ => {
                    self.queue.push(e);
                    return;
                }
            }
        }
    }

    // Feeds the next infix token. `next_is_open` tells whether the following
    // token is an opening bracket: that is what distinguishes a function
    // call from a variable read.
    pub(crate) fn push(&mut self, tok: Token, next_is_open: bool) -> CalcErrorResult {
        match tok {
            Token::Num(..) => {
                self.output.push(tok);
                self.expect_unary = false;
            }
            Token::Name(..) => {
                if next_is_open {
                    self.queue.push(tok);
                } else {
                    self.output.push(tok);
                }
                self.expect_unary = false;
            }
            Token::ArgSep => {
                loop {
                    match self.queue.pop() {
                        None => return Err(CalcError::MisplacedComma),
                        Some(Token::OpenB) => {
                            self.queue.push(Token::OpenB);
                            break;
                        }
                        Some(e) => self.output.push(e),
                    }
                }
                self.expect_unary = true;
            }
            Token::Op(sym) => {
                // after an operator or an opening bracket a sign is unary
                let sym = if self.expect_unary {
                    match sym {
                        "+" => UNARY_PLUS,
                        "-" => UNARY_MINUS,
                        _ => sym,
                    }
                } else {
                    sym
                };
                let info = match funcs::op_info(sym) {
                    Some(info) => info,
                    None => return Err(CalcError::InvalidOp(sym.to_string())),
                };
                self.pop_while_priority(info);
                self.queue.push(Token::Op(sym));
                // factorial is postfix, so a value may follow it directly
                self.expect_unary = sym != "!";
            }
            Token::OpenB => {
                self.queue.push(tok);
                self.expect_unary = true;
            }
            Token::CloseB => {
                loop {
                    match self.queue.pop() {
                        None => return Err(CalcError::ClosingBracketMismatch),
                        Some(Token::OpenB) => break,
                        Some(e) => self.output.push(e),
                    }
                }
                let is_func_top = match self.queue.last() {
                    Some(Token::Name(..)) => true,
                    _ => false,
                };
                if is_func_top {
                    // queue top is a function name, so unwrap is OK
                    let f = self.queue.pop().unwrap();
                    self.output.push(f);
                }
                self.expect_unary = false;
            }
        }
        Ok(())
    }

    // Drains the queue after the last infix token. Anything left except
    // operators and names means unbalanced brackets.
    fn into_postfix(mut self) -> Result<Vec<Token>, CalcError> {
        while let Some(e) = self.queue.pop() {
            match e {
                Token::OpenB => return Err(CalcError::OpenBracketMismatch),
                Token::Op(..) | Token::Name(..) => self.output.push(e),
                _ => return Err(CalcError::Unreachable),
            }
        }
        Ok(self.output)
    }
}

/// Converts an infix token list to postfix order
pub(crate) fn to_postfix(tokens: &[Token]) -> Result<Vec<Token>, CalcError> {
    let mut stk = Stack::new();
    for (i, tok) in tokens.iter().enumerate() {
        let next_is_open = match tokens.get(i + 1) {
            Some(Token::OpenB) => true,
            _ => false,
        };
        stk.push(tok.clone(), next_is_open)?;
    }
    stk.into_postfix()
}

/// Evaluates a postfix token list against the context
pub(crate) fn eval_postfix(rpn: &[Token], ctx: &EvalContext) -> CalcResult {
    let mut values: Vec<f64> = Vec::new();
    for tok in rpn {
        match tok {
            Token::Num(n) => values.push(*n),
            Token::Name(name) => apply_name(name, ctx, &mut values)?,
            Token::Op(op) => apply_operator(op, &mut values)?,
            _ => return Err(CalcError::Unreachable),
        }
    }

    if values.len() != 1 {
        return Err(CalcError::InvalidExpression);
    }
    // unwrap is OK - the length is checked above
    Ok(values.pop().unwrap())
}

// A name in postfix order is either a registered function applied to the
// values on top of the stack or a constant/variable lookup.
fn apply_name(name: &str, ctx: &EvalContext, values: &mut Vec<f64>) -> CalcErrorResult {
    if let Some(f) = funcs::FUNCS.get(name) {
        if values.len() < f.arity {
            return Err(CalcError::FunctionNotEnoughArgs(name.to_string(), f.arity));
        }
        let at = values.len() - f.arity;
        let args = values.split_off(at);
        let v = (f.apply)(&args, ctx.mode)?;
        values.push(v);
        return Ok(());
    }
    match ctx.resolve(name) {
        Some(v) => {
            values.push(v);
            Ok(())
        }
        None => Err(CalcError::VarUndeclared(name.to_string())),
    }
}

fn apply_operator(op: &str, values: &mut Vec<f64>) -> CalcErrorResult {
    let info = match funcs::op_info(op) {
        Some(info) => info,
        None => return Err(CalcError::InvalidOp(op.to_string())),
    };
    if values.len() < info.arity {
        return Err(CalcError::NotEnoughOperands(op.to_string()));
    }

    if info.arity == 1 {
        // the length is checked above, so unwrap is OK
        let v = values.pop().unwrap();
        let r = match op {
            UNARY_PLUS => v,
            UNARY_MINUS => -v,
            "!" => funcs::factorial(v)?,
            _ => return Err(CalcError::InvalidOp(op.to_string())),
        };
        values.push(r);
        return Ok(());
    }

    // the length is checked above, so unwrap is OK
    let v2 = values.pop().unwrap();
    let v1 = values.pop().unwrap();
    let r = match op {
        "+" => v1 + v2,
        "-" => v1 - v2,
        "*" => v1 * v2,
        "/" => {
            if v2.abs() < DIV_EPSILON {
                return Err(CalcError::DividedByZero);
            }
            v1 / v2
        }
        "%" => {
            if v2.abs() < DIV_EPSILON {
                return Err(CalcError::ModuloByZero);
            }
            v1 % v2
        }
        "^" => v1.powf(v2),
        _ => return Err(CalcError::InvalidOp(op.to_string())),
    };
    values.push(r);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_tokens(tokens: &[Token]) -> CalcResult {
        let rpn = to_postfix(tokens)?;
        eval_postfix(&rpn, &EvalContext::new())
    }

    #[test]
    fn test_simple_order() {
        // 2 + 3 * 2 + 5 = 13
        let tokens = [
            Token::Num(2.0),
            Token::Op("+"),
            Token::Num(3.0),
            Token::Op("*"),
            Token::Num(2.0),
            Token::Op("+"),
            Token::Num(5.0),
        ];
        assert_eq!(eval_tokens(&tokens), Ok(13.0));
    }

    #[test]
    fn test_postfix_order() {
        // 2 + 3 * 4 --> 2 3 4 * +
        let tokens = [
            Token::Num(2.0),
            Token::Op("+"),
            Token::Num(3.0),
            Token::Op("*"),
            Token::Num(4.0),
        ];
        let rpn = to_postfix(&tokens).unwrap();
        let expected = [
            Token::Num(2.0),
            Token::Num(3.0),
            Token::Num(4.0),
            Token::Op("*"),
            Token::Op("+"),
        ];
        assert_eq!(rpn, expected);
    }

    #[test]
    fn test_braces() {
        // 2 + 3 * (2 + 5) + 1 = 24
        let tokens = [
            Token::Num(2.0),
            Token::Op("+"),
            Token::Num(3.0),
            Token::Op("*"),
            Token::OpenB,
            Token::Num(2.0),
            Token::Op("+"),
            Token::Num(5.0),
            Token::CloseB,
            Token::Op("+"),
            Token::Num(1.0),
        ];
        assert_eq!(eval_tokens(&tokens), Ok(24.0));
    }

    #[test]
    fn test_power_right_assoc() {
        // 2 ^ 3 ^ 2 = 2 ^ 9 = 512
        let tokens = [
            Token::Num(2.0),
            Token::Op("^"),
            Token::Num(3.0),
            Token::Op("^"),
            Token::Num(2.0),
        ];
        assert_eq!(eval_tokens(&tokens), Ok(512.0));
    }

    #[test]
    fn test_unary_rewrite() {
        // -2 ^ 2 = 4: unary minus binds tighter than power
        let tokens = [
            Token::Op("-"),
            Token::Num(2.0),
            Token::Op("^"),
            Token::Num(2.0),
        ];
        let rpn = to_postfix(&tokens).unwrap();
        let expected = [
            Token::Num(2.0),
            Token::Op(UNARY_MINUS),
            Token::Num(2.0),
            Token::Op("^"),
        ];
        assert_eq!(rpn, expected);
        assert_eq!(eval_postfix(&rpn, &EvalContext::new()), Ok(4.0));
    }

    #[test]
    fn test_factorial() {
        // 3! + (3 + 2)! = 6 + 120 = 126
        let tokens = [
            Token::Num(3.0),
            Token::Op("!"),
            Token::Op("+"),
            Token::OpenB,
            Token::Num(3.0),
            Token::Op("+"),
            Token::Num(2.0),
            Token::CloseB,
            Token::Op("!"),
        ];
        assert_eq!(eval_tokens(&tokens), Ok(126.0));
    }

    #[test]
    fn test_function_binding() {
        // a name followed by a bracket is a call, otherwise a variable read
        let tokens = [
            Token::Name("sin".to_string()),
            Token::OpenB,
            Token::Num(0.0),
            Token::CloseB,
        ];
        let rpn = to_postfix(&tokens).unwrap();
        let expected = [Token::Num(0.0), Token::Name("sin".to_string())];
        assert_eq!(rpn, expected);
        assert_eq!(eval_postfix(&rpn, &EvalContext::new()), Ok(0.0));
    }

    #[test]
    fn test_two_arg_function() {
        // min(5, 2) = 2
        let tokens = [
            Token::Name("min".to_string()),
            Token::OpenB,
            Token::Num(5.0),
            Token::ArgSep,
            Token::Num(2.0),
            Token::CloseB,
        ];
        assert_eq!(eval_tokens(&tokens), Ok(2.0));
    }

    #[test]
    fn test_stack_errors() {
        // without values nothing ever reaches the stack, so the final
        // shape check reports it
        assert_eq!(eval_tokens(&[]), Err(CalcError::InvalidExpression));
        let empty_brackets = [Token::OpenB, Token::CloseB];
        assert_eq!(eval_tokens(&empty_brackets), Err(CalcError::InvalidExpression));
        let misplaced = [Token::Num(1.0), Token::ArgSep, Token::Num(2.0)];
        assert_eq!(eval_tokens(&misplaced), Err(CalcError::MisplacedComma));
        let unclosed = [Token::OpenB, Token::Num(1.0)];
        assert_eq!(eval_tokens(&unclosed), Err(CalcError::OpenBracketMismatch));
        let unopened = [Token::Num(1.0), Token::CloseB];
        assert_eq!(eval_tokens(&unopened), Err(CalcError::ClosingBracketMismatch));
        let short = [Token::Num(2.0), Token::Op("+")];
        assert_eq!(eval_tokens(&short), Err(CalcError::NotEnoughOperands("+".to_string())));
        let leftover = [Token::Num(1.0), Token::Num(2.0)];
        assert_eq!(eval_tokens(&leftover), Err(CalcError::InvalidExpression));
    }

    #[test]
    fn test_division_guards() {
        let div = [Token::Num(10.0), Token::Op("/"), Token::Num(0.0)];
        assert_eq!(eval_tokens(&div), Err(CalcError::DividedByZero));
        let rem = [Token::Num(10.0), Token::Op("%"), Token::Num(0.0)];
        assert_eq!(eval_tokens(&rem), Err(CalcError::ModuloByZero));
    }
}
