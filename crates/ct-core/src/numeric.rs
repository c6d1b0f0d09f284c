//! Float helpers for simulated time and state values.

use crate::error::{CtError, CtResult};

/// Two values agree when they differ by at most `abs`, or by at most `rel`
/// times the larger magnitude.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    pub abs: f64,
    pub rel: f64,
}

impl Tolerances {
    pub const fn new(abs: f64, rel: f64) -> Self {
        Self { abs, rel }
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self::new(1e-12, 1e-9)
    }
}

pub fn nearly_equal(a: f64, b: f64, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    diff <= tol.abs || diff <= tol.rel * a.abs().max(b.abs())
}

/// Pass `v` through, or name it in a `NonFinite` error.
pub fn ensure_finite(v: f64, what: &'static str) -> CtResult<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CtError::NonFinite { what, value: v })
    }
}

/// Two instants closer than `resolution` are the same instant.
pub fn same_instant(a: f64, b: f64, resolution: f64) -> bool {
    (a - b).abs() <= resolution
}

/// `t` lies in `(start, end)` and coincides with neither end.
pub fn strictly_inside(t: f64, start: f64, end: f64, resolution: f64) -> bool {
    t > start + resolution && t < end - resolution
}
