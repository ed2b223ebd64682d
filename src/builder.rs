//! Builder for configuring and constructing a `MeterEngine`.

use meterbridge_core::MeterConfig;

use crate::{MeterEngine, Result};

/// Every setting starts from [`MeterConfig::default`]; `build()` validates the
/// final configuration before any session exists.
///
/// The sample rate is not configured here. It comes with the audio, either
/// through `engine.start(rate)` or the first `push_audio` call.
///
/// # Example
///
/// ```
/// use meterbridge::prelude::*;
///
/// let engine = MeterEngine::builder()
///     .fft_size(2048)
///     .scope_length(512)
///     .silence_threshold_db(-70.0)
///     .build()?;
///
/// assert_eq!(engine.config().fft_size, 2048);
/// # Ok::<(), meterbridge::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MeterEngineBuilder {
    config: MeterConfig,
}

impl MeterEngineBuilder {
    /// Start from an existing configuration, e.g. one loaded with serde.
    pub fn from_config(config: MeterConfig) -> Self {
        Self { config }
    }

    /// Default: 1024. Must be a power of two in 64..=65536.
    pub fn fft_size(mut self, size: usize) -> Self {
        self.config.fft_size = size;
        self
    }

    /// Default: 1024
    pub fn scope_length(mut self, length: usize) -> Self {
        self.config.scope_length = length;
        self
    }

    /// Default: 4
    pub fn scope_decimation(mut self, every: usize) -> Self {
        self.config.scope_decimation = every;
        self
    }

    /// Default: true
    pub fn true_peak_oversampling(mut self, enabled: bool) -> Self {
        self.config.true_peak_oversampling = enabled;
        self
    }

    /// Default: -65 dBFS
    pub fn silence_threshold_db(mut self, threshold: f32) -> Self {
        self.config.silence_threshold_db = threshold;
        self
    }

    /// Default: 6 dB/s
    pub fn peak_hold_decay(mut self, db_per_sec: f32) -> Self {
        self.config.peak_hold_decay_db_per_sec = db_per_sec;
        self
    }

    /// Default: 0.5 s
    pub fn dc_time_constant(mut self, secs: f64) -> Self {
        self.config.dc_time_constant_secs = secs;
        self
    }

    /// Default: 60 s
    pub fn lra_history(mut self, secs: f64) -> Self {
        self.config.lra_history_secs = secs;
        self
    }

    pub fn build(self) -> Result<MeterEngine> {
        if let Err(e) = self.config.validate() {
            tracing::warn!("Rejected meter configuration: {}", e);
            return Err(e.into());
        }
        MeterEngine::from_config(self.config)
    }
}
