//! Float helpers shared by the unit and geometry code.

use crate::{CoreError, CoreResult};

/// Floating point type used for every normalized quantity.
pub type Real = f64;

/// Absolute/relative tolerance pair used when comparing normalized values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Tolerances {
    pub const fn new(abs: Real, rel: Real) -> Self {
        Self { abs, rel }
    }

    /// Loose enough to absorb a unit conversion round trip (e.g. in -> m -> in).
    pub const CONVERSION: Tolerances = Tolerances::new(1e-6, 1e-6);
}

impl Default for Tolerances {
    fn default() -> Self {
        Self::new(1e-12, 1e-9)
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    diff <= tol.abs || diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> CoreResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}
