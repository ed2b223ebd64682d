//! Metering engine configuration.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};
use meterbridge_analysis::spectrum::{is_valid_fft_size, MAX_FFT_SIZE, MIN_FFT_SIZE};

/// Lowest accepted stream sample rate.
pub const MIN_SAMPLE_RATE: u32 = 8000;
/// Highest accepted stream sample rate.
pub const MAX_SAMPLE_RATE: u32 = 384_000;

/// Check a stream sample rate against the supported range.
pub fn validate_sample_rate(sample_rate: u32) -> Result<()> {
    if (MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sample_rate) {
        Ok(())
    } else {
        Err(Error::InvalidSampleRate(sample_rate))
    }
}

/// Configuration for a metering session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeterConfig {
    /// FFT length, a power of two in 64..=65536.
    pub fft_size: usize,
    /// Oscilloscope ring length per channel.
    pub scope_length: usize,
    /// Keep every N-th frame in the oscilloscope ring.
    pub scope_decimation: usize,
    /// Run the 4x cubic pass in the true-peak estimator.
    pub true_peak_oversampling: bool,
    /// Blocks whose louder channel RMS is below this are silent (dBFS).
    pub silence_threshold_db: f32,
    pub peak_hold_decay_db_per_sec: f32,
    /// DC estimator time constant.
    pub dc_time_constant_secs: f64,
    /// Span of Short-term history used for Loudness Range.
    pub lra_history_secs: f64,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            fft_size: 1024,
            scope_length: 1024,
            scope_decimation: 4,
            true_peak_oversampling: true,
            silence_threshold_db: -65.0,
            peak_hold_decay_db_per_sec: 6.0,
            dc_time_constant_secs: 0.5,
            lra_history_secs: 60.0,
        }
    }
}

impl MeterConfig {
    pub fn validate(&self) -> Result<()> {
        if !is_valid_fft_size(self.fft_size) {
            return Err(Error::InvalidConfig(format!(
                "fft_size {} must be a power of two in {}..={}",
                self.fft_size, MIN_FFT_SIZE, MAX_FFT_SIZE
            )));
        }
        if self.scope_length == 0 {
            return Err(Error::InvalidConfig("scope_length must be at least 1".into()));
        }
        if self.scope_decimation == 0 {
            return Err(Error::InvalidConfig(
                "scope_decimation must be at least 1".into(),
            ));
        }
        if !(self.silence_threshold_db.is_finite() && self.silence_threshold_db < 0.0) {
            return Err(Error::InvalidConfig(format!(
                "silence_threshold_db {} must be negative",
                self.silence_threshold_db
            )));
        }
        if !(self.peak_hold_decay_db_per_sec.is_finite() && self.peak_hold_decay_db_per_sec > 0.0)
        {
            return Err(Error::InvalidConfig(format!(
                "peak_hold_decay_db_per_sec {} must be positive",
                self.peak_hold_decay_db_per_sec
            )));
        }
        if !(self.dc_time_constant_secs.is_finite() && self.dc_time_constant_secs > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "dc_time_constant_secs {} must be positive",
                self.dc_time_constant_secs
            )));
        }
        if !(self.lra_history_secs.is_finite() && self.lra_history_secs > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "lra_history_secs {} must be positive",
                self.lra_history_secs
            )));
        }
        Ok(())
    }
}
