use crate::SxError;

/// Floating point type carried on every wire.
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, SxError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(SxError::NonFinite { what, value: v })
    }
}

/// Finite and strictly greater than zero (step sizes, rates, periods).
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, SxError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(SxError::NotPositive { what, value: v })
    }
}

/// Index of the period of length `period` that contains `t`.
///
/// Truncates toward zero like the sampling stages expect; `t` is never
/// negative inside a run.
pub fn period_index(t: Real, period: Real) -> i64 {
    (t / period) as i64
}

/// Position of `t` inside its period, always in `[0, period)`.
pub fn period_phase(t: Real, period: Real) -> Real {
    t.rem_euclid(period)
}
