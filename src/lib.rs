//! # meterbridge - Real-time Audio Metering
//!
//! Turns a stream of interleaved PCM chunks into one immutable metrics
//! snapshot per chunk: levels, true peak, stereo image, spectrum and
//! EBU R128 loudness.
//!
//! ## Architecture
//!
//! meterbridge is an umbrella crate that coordinates:
//! - **meterbridge-core** - Session state, chunk pipeline, snapshot delivery, PCM ingestion, capture
//! - **meterbridge-analysis** - Stereo statistics, true peak, spectrum, loudness, oscilloscope rings
//! - **meterbridge-dsp** - Biquads and K-weighting, peak-hold ballistics, DC estimation
//!
//! ## Quick Start
//!
//! ```
//! use meterbridge::prelude::*;
//!
//! let engine = MeterEngine::builder()
//!     .fft_size(2048)
//!     .build()?;
//!
//! engine.on_snapshot(|snapshot| {
//!     let _ = (snapshot.left.rms_db, snapshot.loudness.momentary_lufs);
//! });
//!
//! // Stereo, 48 kHz, 480 frames of silence.
//! let snapshot = engine.push_audio(&[0.0; 960], 480, 48000, 2)?;
//! assert!(snapshot.is_some_and(|s| s.is_silent));
//! # Ok::<(), meterbridge::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Push-based metering engine
//! - `capture` - Live input and loopback capture via CPAL
//! - `serialization` - serde derives on snapshot types

mod error;
pub use error::{Error, Result};

/// Re-export of meterbridge-core for direct access
pub use meterbridge_core as core;

/// Re-export of meterbridge-analysis for offline analysis
pub use meterbridge_analysis as analysis;

/// Re-export of meterbridge-dsp
pub use meterbridge_dsp as dsp;

// Core types
pub use meterbridge_core::{
    AtomicAmplitude,
    AtomicFlag,

    // Lock-free primitives
    AtomicFloat,

    // Snapshots
    AudioMetricsSnapshot,
    BasicLevels,
    ChannelMetrics,
    LoudnessMetrics,
    LoudnessReading,

    // Configuration
    MeterConfig,
    MeteringHandle,

    // Metering
    MeteringManager,
    MeteringSession,

    // Ingestion
    SampleFormat,
    SnapshotCallback,
    SpectrumMetrics,
};

// Offline helpers
pub use meterbridge_analysis::{analyze_loudness, analyze_stereo, LoudnessResult, StereoAnalysis};

#[cfg(feature = "capture")]
pub use meterbridge_core::{list_capture_devices, CaptureConfig, CaptureStream};

mod builder;
mod engine;

pub use builder::MeterEngineBuilder;
pub use engine::MeterEngine;

/// Convenience prelude for common imports
pub mod prelude {
    // Main engine
    pub use crate::{MeterEngine, MeterEngineBuilder};

    // Errors
    pub use crate::{Error, Result};

    // Snapshots
    pub use crate::{AudioMetricsSnapshot, BasicLevels, ChannelMetrics, LoudnessMetrics};

    // Configuration and ingestion
    pub use crate::{MeterConfig, SampleFormat};

    // Capture
    #[cfg(feature = "capture")]
    pub use crate::{CaptureConfig, CaptureStream};
}
