//! Numeric primitives shared by the dose kernel: bracketing search over sorted
//! tables and the four one-dimensional interpolation laws.

pub mod interpolation;
pub mod search;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum NumericsError {
    #[error("Cannot search an empty sequence")]
    EmptySequence,

    #[error("Value {value} lies outside the sequence range [{first}, {last}]")]
    OutOfRange { value: f64, first: f64, last: f64 },

    #[error("Degenerate interval: x0 ({x0}) must be strictly less than x1 ({x1})")]
    DegenerateInterval { x0: f64, x1: f64 },

    #[error("Interpolation point {x} lies outside [{x0}, {x1}]")]
    OutsideInterval { x: f64, x0: f64, x1: f64 },

    #[error("Logarithmic {axis} axis received a non-positive value: {value}")]
    NonPositiveLogValue { axis: &'static str, value: f64 },
}
