//! Real-time audio metering runtime.
//!
//! # Primary API
//!
//! - [`MeteringManager`]: session lifecycle, `push_audio` / `push_pcm`, snapshot delivery
//! - [`MeteringSession`]: the per-session state and chunk pipeline, usable on its own
//! - [`AudioMetricsSnapshot`]: immutable per-chunk measurements
//! - [`MeterConfig`]: FFT size, scope, ballistics and loudness settings
//!
//! # Feature-gated APIs
//!
//! - `"capture"`: [`CaptureStream`], [`list_capture_devices`] for CPAL input/loopback
//! - `"serialization"`: serde derives on snapshot types
//!
//! # Example
//!
//! ```
//! use meterbridge_core::{MeterConfig, MeteringManager};
//!
//! let manager = MeteringManager::new(MeterConfig::default())?;
//! manager.start(48000)?;
//!
//! let chunk = vec![0.0f32; 2 * 512];
//! let snapshot = manager.push_audio(&chunk, 512, 48000, 2)?.expect("non-empty chunk");
//! assert!(snapshot.is_silent);
//! # Ok::<(), meterbridge_core::Error>(())
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub use config::{validate_sample_rate, MeterConfig, MAX_SAMPLE_RATE, MIN_SAMPLE_RATE};

pub(crate) mod metering;
pub use metering::{
    decode_pcm, decode_pcm_into, AtomicAmplitude, AudioMetricsSnapshot, BasicLevels,
    ChannelMetrics, LoudnessMetrics, MeteringHandle, MeteringManager, MeteringSession,
    SampleFormat, SnapshotCallback,
};

pub use meterbridge_analysis::{LoudnessReading, SpectrumMetrics};

pub(crate) mod lockfree;
pub use lockfree::{AtomicCounter, AtomicFlag, AtomicFloat};

/// Shared synchronization and atomic types.
pub mod compat;

#[cfg(feature = "capture")]
mod capture;

#[cfg(feature = "capture")]
pub use capture::{list_capture_devices, CaptureConfig, CaptureStream};
