//! # meterbridge-analysis
//!
//! Streaming measurement algorithms used by the metering engine.
//!
//! - **Stereo statistics**: RMS, sample peak, crest factor, Pearson correlation,
//!   balance and Mid/Side width accumulated one frame at a time
//! - **True peak**: parabolic and Catmull-Rom inter-sample peak estimation
//! - **Spectrum**: Hann-windowed FFT with dominant frequency, centroid, roll-off,
//!   noise floor, SNR and ENOB
//! - **Loudness**: EBU R128 Momentary, Short-term, gated Integrated and
//!   Loudness Range
//! - **Scope**: decimated oscilloscope rings
//!
//! All functions operate on raw `f32`/`f64` samples - no framework dependencies.
//!
//! ## Example
//!
//! ```rust
//! use meterbridge_analysis::{correlation::analyze_stereo, loudness::analyze_loudness};
//!
//! let left: Vec<f32> = (0..48000)
//!     .map(|i| (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / 48000.0).sin() * 0.1)
//!     .collect();
//!
//! let stereo = analyze_stereo(&left, &left);
//! assert!(stereo.correlation > 0.99);
//!
//! let loudness = analyze_loudness(&left, &left, 48000);
//! assert!(loudness.integrated_lufs.is_finite());
//! ```

pub mod correlation;
pub mod loudness;
pub mod scope;
pub mod spectrum;
pub mod true_peak;

mod stats;

pub use correlation::{
    analyze_stereo, analyze_stereo_interleaved, ChannelLevels, StereoAccumulator, StereoAnalysis,
};
pub use loudness::{
    analyze_loudness, EnergyWindow, GatedIntegrator, LoudnessMeter, LoudnessRange, LoudnessReading,
    LoudnessResult,
};
pub use scope::ScopeRing;
pub use spectrum::{SpectrumAccumulator, SpectrumAnalyzer, SpectrumMetrics};
pub use stats::percentile;
pub use true_peak::{estimate_true_peak, SampleHistory};

/// Floor applied to every dB quantity handed to consumers.
pub const DB_FLOOR: f32 = -120.0;

/// Guard below which energy sums are treated as zero.
pub const ENERGY_EPSILON: f64 = 1e-18;
