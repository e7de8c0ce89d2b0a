//! Tolerance constants for timing and value comparisons.

/// Floating point rounding errors on times and control values.
pub const FLOAT_EPSILON: f64 = 1e-9;

/// One sample at the test rate.
pub const SAMPLE_EPSILON: f64 = 1.0 / super::TEST_SAMPLE_RATE;
