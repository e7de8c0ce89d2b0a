//! Numeric coercion helpers used on every hot path.
//!
//! Nothing here fails: malformed numbers collapse to a safe default so the
//! dispatch loop is never interrupted by bad input.

/// Returns `value` when finite, `0.0` otherwise.
#[inline]
pub fn finite(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Clamps `value` into `[lo, hi]`. NaN collapses to `lo`.
#[inline]
pub fn clip(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        return lo;
    }
    value.max(lo).min(hi)
}

/// Truncates toward zero after finite coercion.
#[inline]
pub fn int(value: f64) -> i64 {
    finite(value).trunc() as i64
}

/// Returns the value or a fallback when absent.
#[inline]
pub fn defaults<T>(value: Option<T>, fallback: T) -> T {
    value.unwrap_or(fallback)
}

/// `finite(defaults(value, fallback))`, the most common combination.
#[inline]
pub fn finite_or(value: Option<f64>, fallback: f64) -> f64 {
    finite(value.unwrap_or(fallback))
}
