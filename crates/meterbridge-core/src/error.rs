//! Error types for meterbridge-core.

use thiserror::Error;

/// Error type for meterbridge-core operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid sample rate: {0}. Must be between 8000 and 384000 Hz")]
    InvalidSampleRate(u32),

    #[error("Invalid channel count: {0}. Must be at least 1")]
    InvalidChannelCount(usize),

    #[error("Buffer too short: expected {expected} values, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid device: {0}")]
    InvalidDevice(String),

    #[cfg(feature = "capture")]
    #[error("Audio device not available")]
    DeviceNotAvailable(#[from] cpal::DefaultStreamConfigError),

    #[cfg(feature = "capture")]
    #[error("Failed to build audio stream")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[cfg(feature = "capture")]
    #[error("Failed to play audio stream")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[cfg(feature = "capture")]
    #[error("Failed to enumerate devices")]
    Devices(#[from] cpal::DevicesError),

    #[cfg(feature = "capture")]
    #[error("Failed to get device name")]
    DeviceName(#[from] cpal::DeviceNameError),
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;
