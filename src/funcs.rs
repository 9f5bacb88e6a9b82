use std::collections::HashMap;
use std::f64::consts::{E, PI};

use lazy_static::lazy_static;

use crate::errors::*;

// Tolerance for treating a float as an integer: series bounds, a geometric
// ratio of one, the k = -1 case of intpow.
const INT_EPSILON: f64 = 1e-12;
// Right operands of '/' and '%' closer to zero than this are rejected.
pub(crate) const DIV_EPSILON: f64 = 1e-15;
// Step of the central-difference derivatives when the caller passes none.
const DERIV_STEP: f64 = 1e-6;
// Offset from the limit point used by one-sided limits.
const LIMIT_EPSILON: f64 = 1e-10;
// Largest n whose factorial still fits into f64.
const FACTORIAL_MAX: i64 = 170;

// Names of the operators synthesized by the shunting-yard pass. They cannot
// clash with user input: the tokenizer emits single-character operators only.
pub(crate) const UNARY_PLUS: &str = "u+";
pub(crate) const UNARY_MINUS: &str = "u-";

/// How trigonometric functions interpret their argument, and inverse ones
/// their result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AngleMode {
    Radians,
    Degrees,
}

/// Per-call evaluation input: the angle convention and the two caller-owned
/// values an expression can reference by name. The engine never mutates the
/// context; updating `ans` and `mem` after a successful evaluation is the
/// caller's job.
pub struct EvalContext {
    pub mode: AngleMode,
    /// result of the previous evaluation, available as `ans`
    pub ans: f64,
    /// memory register, available as `mem`
    pub mem: f64,
}

impl Default for EvalContext {
    fn default() -> EvalContext {
        EvalContext {
            mode: AngleMode::Radians,
            ans: 0.0,
            mem: 0.0,
        }
    }
}

impl EvalContext {
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns a constant value by its name. Name is case-insensitive
    pub fn constant(&self, name: &str) -> Option<f64> {
        let a = name.to_lowercase();
        match a.as_str() {
            "pi" => Some(PI),
            "e" => Some(E),
            _ => None,
        }
    }

    /// Returns a variable value by its name. Name is case-insensitive
    pub fn variable(&self, name: &str) -> Option<f64> {
        let a = name.to_lowercase();
        match a.as_str() {
            "ans" => Some(self.ans),
            "mem" => Some(self.mem),
            _ => None,
        }
    }

    // constants shadow variables, so `pi` cannot be rebound
    pub(crate) fn resolve(&self, name: &str) -> Option<f64> {
        match self.constant(name) {
            Some(v) => Some(v),
            None => self.variable(name),
        }
    }
}

#[derive(Clone, Copy)]
pub(crate) struct OpInfo {
    pub(crate) precedence: i32,
    pub(crate) right_assoc: bool,
    pub(crate) arity: usize,
}

// Operator descriptors: priority, associativity, and the number of operands.
pub(crate) fn op_info(op: &str) -> Option<OpInfo> {
    let (precedence, right_assoc, arity) = match op {
        "!" => (6, false, 1),                     // factorial
        UNARY_PLUS | UNARY_MINUS => (5, true, 1), // sign
        "^" => (4, true, 2),                      // power
        "*" | "/" | "%" => (3, false, 2),         // mult, div, mod
        "+" | "-" => (2, false, 2),               // add, sub
        _ => return None,
    };
    Some(OpInfo {
        precedence,
        right_assoc,
        arity,
    })
}

type FuncRule = fn(&[f64], AngleMode) -> CalcResult;

/// A registry entry: the number of arguments and the evaluation rule.
/// The evaluator always passes exactly `arity` values to `apply`.
pub(crate) struct FuncSpec {
    pub(crate) arity: usize,
    pub(crate) apply: FuncRule,
}

fn spec(arity: usize, apply: FuncRule) -> FuncSpec {
    FuncSpec { arity, apply }
}

pub(crate) fn is_func(name: &str) -> bool {
    FUNCS.contains_key(name)
}

fn range_err(func: &str, val: f64, range: &str) -> CalcError {
    CalcError::ArgumentOutOfRange(func.to_string(), format!("{}", val), range.to_string())
}

// every argument of `func` must be positive
fn require_positive(func: &str, args: &[f64]) -> CalcErrorResult {
    for arg in args {
        if *arg <= 0.0 {
            return Err(range_err(func, *arg, "x>0"));
        }
    }
    Ok(())
}

// series bound: non-negative and integral within the tolerance
fn int_arg(func: &str, x: f64) -> CalcResult {
    if x < 0.0 {
        return Err(CalcError::NotForNegativeInt(func.to_string()));
    }
    if !is_nearly_int(x) {
        return Err(CalcError::OnlyInt(func.to_string()));
    }
    Ok(x.round())
}

fn is_nearly_int(x: f64) -> bool {
    (x - x.round()).abs() < INT_EPSILON
}

fn to_rad(x: f64, mode: AngleMode) -> f64 {
    match mode {
        AngleMode::Degrees => x * PI / 180.0,
        AngleMode::Radians => x,
    }
}

fn from_rad(x: f64, mode: AngleMode) -> f64 {
    match mode {
        AngleMode::Degrees => x * 180.0 / PI,
        AngleMode::Radians => x,
    }
}

/// Returns factorial of a number. The argument must be a non-negative
/// integer not greater than 170, the largest factorial that fits f64.
pub(crate) fn factorial(x: f64) -> CalcResult {
    if x < 0.0 {
        return Err(CalcError::NotForNegativeInt("factorial".to_string()));
    }
    if !is_nearly_int(x) {
        return Err(CalcError::OnlyInt("factorial".to_string()));
    }
    let n = x.round() as i64;
    if n > FACTORIAL_MAX {
        return Err(range_err("factorial", x, "[0..170]"));
    }

    let mut res = 1.0;
    for i in 2..=n {
        res *= i as f64;
    }
    Ok(res)
}

// central difference with the step checked against zero
macro_rules! deriv_rule {
    ($f:path) => {
        spec(2, |a, _| {
            let h = if a[1] <= 0.0 { DERIV_STEP } else { a[1] };
            Ok(($f(a[0] + h) - $f(a[0] - h)) / (2.0 * h))
        })
    };
}

lazy_static! {
    // Function registry keyed by the lowercased name. Built once, never
    // mutated afterwards, safe for concurrent lookups.
    pub(crate) static ref FUNCS: HashMap<&'static str, FuncSpec> = {
        let mut m: HashMap<&'static str, FuncSpec> = HashMap::new();

        // trigonometry honors the angle mode: direct functions convert the
        // argument, inverse ones convert the result
        m.insert("sin", spec(1, |a, mode| Ok(to_rad(a[0], mode).sin())));
        m.insert("cos", spec(1, |a, mode| Ok(to_rad(a[0], mode).cos())));
        m.insert("tan", spec(1, |a, mode| Ok(to_rad(a[0], mode).tan())));
        m.insert("asin", spec(1, |a, mode| {
            if a[0] < -1.0 || a[0] > 1.0 {
                return Err(range_err("asin", a[0], "[-1..1]"));
            }
            Ok(from_rad(a[0].asin(), mode))
        }));
        m.insert("acos", spec(1, |a, mode| {
            if a[0] < -1.0 || a[0] > 1.0 {
                return Err(range_err("acos", a[0], "[-1..1]"));
            }
            Ok(from_rad(a[0].acos(), mode))
        }));
        m.insert("atan", spec(1, |a, mode| Ok(from_rad(a[0].atan(), mode))));

        // general purpose
        m.insert("sqrt", spec(1, |a, _| {
            if a[0] < 0.0 {
                return Err(range_err("sqrt", a[0], "x>=0"));
            }
            Ok(a[0].sqrt())
        }));
        m.insert("ln", spec(1, |a, _| {
            if a[0] <= 0.0 {
                return Err(range_err("ln", a[0], "x>0"));
            }
            Ok(a[0].ln())
        }));
        m.insert("log", spec(1, |a, _| {
            if a[0] <= 0.0 {
                return Err(range_err("log", a[0], "x>0"));
            }
            Ok(a[0].log10())
        }));
        m.insert("abs", spec(1, |a, _| Ok(a[0].abs())));
        m.insert("pow", spec(2, |a, _| Ok(a[0].powf(a[1]))));
        m.insert("min", spec(2, |a, _| Ok(a[0].min(a[1]))));
        m.insert("max", spec(2, |a, _| Ok(a[0].max(a[1]))));

        // Ohm's law and DC power wheel. The name is the result quantity
        // followed by the given ones, arguments in name order.
        m.insert("pvi", spec(2, |a, _| Ok(a[0] * a[1])));          // P = V*I
        m.insert("pir", spec(2, |a, _| Ok(a[0] * a[0] * a[1])));   // P = I^2*R
        m.insert("pvr", spec(2, |a, _| Ok(a[0] * a[0] / a[1])));   // P = V^2/R
        m.insert("vir", spec(2, |a, _| Ok(a[0] * a[1])));          // V = I*R
        m.insert("ivr", spec(2, |a, _| Ok(a[0] / a[1])));          // I = V/R
        m.insert("rvi", spec(2, |a, _| Ok(a[0] / a[1])));          // R = V/I
        m.insert("vpi", spec(2, |a, _| Ok(a[0] / a[1])));          // V = P/I
        m.insert("ipv", spec(2, |a, _| Ok(a[0] / a[1])));          // I = P/V
        m.insert("rpi", spec(2, |a, _| Ok(a[0] / (a[1] * a[1])))); // R = P/I^2
        m.insert("rpv", spec(2, |a, _| Ok(a[1] * a[1] / a[0])));   // R = V^2/P
        m.insert("vpr", spec(2, |a, _| Ok((a[0] * a[1]).sqrt()))); // V = sqrt(P*R)
        m.insert("ipr", spec(2, |a, _| Ok((a[0] / a[1]).sqrt()))); // I = sqrt(P/R)

        // AC power: the phase angle honors the angle mode
        m.insert("preal", spec(3, |a, mode| Ok(a[0] * a[1] * to_rad(a[2], mode).cos())));
        m.insert("preact", spec(3, |a, mode| Ok(a[0] * a[1] * to_rad(a[2], mode).sin())));
        m.insert("papp", spec(2, |a, _| Ok(a[0] * a[1])));
        m.insert("pf", spec(1, |a, mode| Ok(to_rad(a[0], mode).cos())));

        // impedance and resonance
        m.insert("zrx", spec(2, |a, _| Ok((a[0] * a[0] + a[1] * a[1]).sqrt())));
        m.insert("xc", spec(2, |a, _| {
            require_positive("xc", a)?;
            Ok(1.0 / (2.0 * PI * a[0] * a[1]))
        }));
        m.insert("xl", spec(2, |a, _| {
            if a[0] < 0.0 || a[1] < 0.0 {
                let bad = if a[0] < 0.0 { a[0] } else { a[1] };
                return Err(range_err("xl", bad, "x>=0"));
            }
            Ok(2.0 * PI * a[0] * a[1])
        }));
        m.insert("fres", spec(2, |a, _| {
            require_positive("fres", a)?;
            Ok(1.0 / (2.0 * PI * (a[0] * a[1]).sqrt()))
        }));

        // decibels
        m.insert("dbv", spec(2, |a, _| {
            require_positive("dbv", a)?;
            Ok(20.0 * (a[0] / a[1]).log10())
        }));
        m.insert("dbp", spec(2, |a, _| {
            require_positive("dbp", a)?;
            Ok(10.0 * (a[0] / a[1]).log10())
        }));

        // voltage divider
        m.insert("vdiv", spec(3, |a, _| {
            if a[1] + a[2] == 0.0 {
                return Err(CalcError::InvalidArgument("vdiv".to_string(), "r1+r2=0".to_string()));
            }
            Ok(a[0] * a[2] / (a[1] + a[2]))
        }));

        // finite series with a non-negative integer bound
        m.insert("sum", spec(1, |a, _| {
            let n = int_arg("sum", a[0])?;
            Ok(n * (n + 1.0) / 2.0)
        }));
        m.insert("sum2", spec(1, |a, _| {
            let n = int_arg("sum2", a[0])?;
            Ok(n * (n + 1.0) * (2.0 * n + 1.0) / 6.0)
        }));
        m.insert("sum3", spec(1, |a, _| {
            let n = int_arg("sum3", a[0])?;
            let t = n * (n + 1.0) / 2.0;
            Ok(t * t)
        }));
        m.insert("geom", spec(3, |a, _| {
            let (first, ratio, n) = (a[0], a[1], a[2]);
            if (ratio - 1.0).abs() < INT_EPSILON {
                return Ok(first * (n + 1.0));
            }
            Ok(first * (1.0 - ratio.powf(n + 1.0)) / (1.0 - ratio))
        }));

        // closed-form integrals
        m.insert("intpow", spec(3, |a, _| {
            let (lo, hi, k) = (a[0], a[1], a[2]);
            if (k + 1.0).abs() < INT_EPSILON {
                // the antiderivative degenerates to ln(x)
                if lo <= 0.0 || hi <= 0.0 {
                    let bad = if lo <= 0.0 { lo } else { hi };
                    return Err(range_err("intpow", bad, "x>0 when k=-1"));
                }
                return Ok(hi.ln() - lo.ln());
            }
            Ok((hi.powf(k + 1.0) - lo.powf(k + 1.0)) / (k + 1.0))
        }));
        m.insert("intexp", spec(2, |a, _| Ok(a[1].exp() - a[0].exp())));
        m.insert("intsin", spec(2, |a, _| Ok(-a[1].cos() + a[0].cos())));
        m.insert("intcos", spec(2, |a, _| Ok(a[1].sin() - a[0].sin())));
        m.insert("intlog", spec(2, |a, _| {
            require_positive("intlog", a)?;
            Ok(a[1].ln() - a[0].ln())
        }));

        // numeric derivatives, central difference
        m.insert("derivpow", spec(3, |a, _| {
            let h = if a[2] <= 0.0 { DERIV_STEP } else { a[2] };
            Ok(((a[0] + h).powf(a[1]) - (a[0] - h).powf(a[1])) / (2.0 * h))
        }));
        m.insert("derivexp", deriv_rule!(f64::exp));
        m.insert("derivsin", deriv_rule!(f64::sin));
        m.insert("derivcos", deriv_rule!(f64::cos));
        m.insert("derivln", spec(2, |a, _| {
            let h = if a[1] <= 0.0 { DERIV_STEP } else { a[1] };
            if a[0] - h <= 0.0 {
                return Err(range_err("derivln", a[0] - h, "x-h>0"));
            }
            Ok((f64::ln(a[0] + h) - f64::ln(a[0] - h)) / (2.0 * h))
        }));

        // one-sided limits
        m.insert("limpow", spec(3, |a, _| {
            let x = if a[2] >= 0.0 { a[0] + LIMIT_EPSILON } else { a[0] - LIMIT_EPSILON };
            Ok(x.powf(a[1]))
        }));

        m
    };
}
