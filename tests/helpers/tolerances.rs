//! Tolerance constants for metering tests.
//!
//! Different measurements require different precision levels.

/// Floating point rounding errors (constant signals, exact ratios).
pub const FLOAT_EPSILON: f32 = 1e-6;

/// Linear level tolerance after summing a few thousand squares in f64.
pub const LEVEL_EPSILON: f32 = 1e-3;

/// Level comparisons in dB.
pub const DB_EPSILON: f32 = 0.05;

/// Absolute loudness target, e.g. a calibrated sine.
pub const LOUDNESS_TOLERANCE_LU: f64 = 1.0;

/// Same audio metered with different chunking.
pub const CHUNKING_TOLERANCE_LU: f64 = 0.1;

/// Agreement with the reference EBU R128 implementation.
pub const REFERENCE_TOLERANCE_LU: f64 = 0.75;

/// Spectrum bin comparison in dB.
pub const SPECTRUM_EPSILON_DB: f32 = 0.01;
