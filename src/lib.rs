//! # Expression engine for a scientific calculator
//!
//! The engine parses a formula, evaluates it on 64-bit floats, and returns
//! either the result or an error describing what went wrong. It was written
//! for an electronics-flavored calculator, so besides the usual scientific
//! set it ships formulas for Ohm's law, AC power, reactance, decibels,
//! simple series, closed-form integrals, numeric derivatives, and limits.
//!
//! Trigonometric functions honor the angle convention passed with every
//! call: direct ones read the argument in radians or degrees, inverse ones
//! return the angle in the same unit. All other math is unit-agnostic.
//!
//! Operators (starting from highest priority):
//! * `!` - factorial (when used after a number or closing bracket)
//! * `-`, `+` - unary sign
//! * `^` - power (right associative)
//! * `*`, `/`, `%` - multiplication, division, remainder
//! * `+`, `-` - addition, subtraction
//!
//! Unary minus binds tighter than power, so `-2^2` is `4`.
//!
//! The list of supported functions:
//! * trigonometric functions (including inverted ones): sin, cos, tan, asin, acos, atan
//! * roots, logarithms, powers: sqrt, ln, log, pow
//! * absolute value and picking: abs, min, max
//! * Ohm's law and power wheel: pvi, pir, pvr, vir, ivr, rvi, vpi, ipv, rpi, rpv, vpr, ipr
//! * AC power: preal, preact, papp, pf
//! * impedance and resonance: zrx, xc, xl, fres
//! * decibels: dbv, dbp
//! * voltage divider: vdiv
//! * series: sum, sum2, sum3, geom
//! * closed-form integrals: intpow, intexp, intsin, intcos, intlog
//! * numeric derivatives: derivpow, derivexp, derivsin, derivcos, derivln
//! * one-sided limits: limpow
//!
//! Predefined constants:
//! * `pi` - 3.14159...
//! * `e` - 2.71828...
//!
//! Names are case-insensitive. Two variables are read from the evaluation
//! context the caller provides: `ans`, the previous result, and `mem`, the
//! memory register. The engine never writes them back.
//!
//! Multiplication may be omitted between adjacent values: `2pi`, `3(4+5)`,
//! `(1+2)(3+4)`, and `5!2` all work. A known function name still binds to
//! the bracket that follows it.
//!
//! Any problem, from an unknown character to a division by zero, comes back
//! as a value of a single error enum, so a caller can match on the exact
//! failure instead of parsing a message.

#[macro_use]
extern crate pest_derive;

pub mod errors;
pub mod format;
pub mod funcs;
pub mod parse;
pub mod stack;
