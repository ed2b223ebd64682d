//! Immutable per-chunk metric snapshots.

use meterbridge_analysis::{LoudnessReading, SpectrumMetrics, DB_FLOOR};
use meterbridge_dsp::amplitude_to_db;

/// Per-channel levels for one chunk.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ChannelMetrics {
    /// Linear RMS of the chunk (>= 0)
    pub rms: f32,
    /// Linear absolute sample peak of the chunk (>= 0)
    pub peak: f32,
    /// Linear peak-hold after ballistics (>= 0)
    pub peak_hold: f32,
    /// dBFS, clamped to [-120, 0]
    pub rms_db: f32,
    pub peak_db: f32,
    pub peak_hold_db: f32,
    /// Estimated inter-sample peak, floored at -120; can exceed 0
    pub true_peak_dbtp: f32,
    /// Clamped to [0, 24]
    pub crest_db: f32,
    /// Slow EMA of the raw signal
    pub dc_offset: f32,
}

impl Default for ChannelMetrics {
    fn default() -> Self {
        Self {
            rms: 0.0,
            peak: 0.0,
            peak_hold: 0.0,
            rms_db: DB_FLOOR,
            peak_db: DB_FLOOR,
            peak_hold_db: DB_FLOOR,
            true_peak_dbtp: DB_FLOOR,
            crest_db: 0.0,
            dc_offset: 0.0,
        }
    }
}

/// Clamp a linear level to the emitted dBFS range.
#[inline]
pub(crate) fn level_db(amplitude: f32) -> f32 {
    amplitude_to_db(amplitude, DB_FLOOR).min(0.0)
}

/// EBU R128 readings carried by a snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct LoudnessMetrics {
    /// -inf while unavailable
    pub momentary_lufs: f64,
    /// -inf while unavailable
    pub short_term_lufs: f64,
    /// -inf until a block survives gating
    pub integrated_lufs: f64,
    /// >= 0
    pub range_lu: f64,
    /// NaN while Short-term is unavailable
    pub psr_db: f64,
    /// NaN while Short-term is unavailable
    pub plr_db: f64,
}

impl Default for LoudnessMetrics {
    fn default() -> Self {
        Self::from_reading(LoudnessReading::default(), f64::NAN, f64::NAN)
    }
}

impl LoudnessMetrics {
    pub(crate) fn from_reading(reading: LoudnessReading, psr_db: f64, plr_db: f64) -> Self {
        Self {
            momentary_lufs: reading.momentary_lufs,
            short_term_lufs: reading.short_term_lufs,
            integrated_lufs: reading.integrated_lufs,
            range_lu: reading.range_lu,
            psr_db,
            plr_db,
        }
    }
}

/// Everything measured for one ingested chunk.
///
/// Handed out as `Arc<AudioMetricsSnapshot>`; never mutated after emission.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct AudioMetricsSnapshot {
    pub sample_rate: u32,
    pub fft_size: usize,
    /// Frames in the chunk that produced this snapshot
    pub frames: usize,
    /// Chunk counter within the session, starting at 1
    pub sequence: u64,
    /// Audio seconds processed in this session, including this chunk
    pub stream_time_secs: f64,

    pub left: ChannelMetrics,
    pub right: ChannelMetrics,

    /// Pearson correlation, [-1, 1]
    pub correlation: f32,
    /// Right-minus-left RMS balance, [-1, 1]
    pub balance: f32,
    /// Side/Mid energy ratio, [-30, 30] dB
    pub width_db: f32,

    /// Latest completed FFT analysis
    pub spectrum: SpectrumMetrics,

    /// Oscilloscope rings, most recent first
    pub scope_left: Vec<f32>,
    pub scope_right: Vec<f32>,

    pub is_silent: bool,

    /// Blocks whose held true peak reached 0 dBTP (session total)
    pub true_peak_clips: u64,
    /// Samples with |x| >= 1.0 (session total)
    pub sample_clips: u64,

    pub loudness: LoudnessMetrics,
}

impl AudioMetricsSnapshot {
    pub fn basic_levels(&self) -> BasicLevels {
        BasicLevels::from(self)
    }

    /// Higher of the two channel true peaks.
    pub fn max_true_peak_dbtp(&self) -> f32 {
        self.left.true_peak_dbtp.max(self.right.true_peak_dbtp)
    }
}

/// Level-only projection of a snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct BasicLevels {
    pub rms_left: f32,
    pub rms_right: f32,
    pub peak_hold_left: f32,
    pub peak_hold_right: f32,
    pub spectrum_db: Vec<f32>,
}

impl From<&AudioMetricsSnapshot> for BasicLevels {
    fn from(snapshot: &AudioMetricsSnapshot) -> Self {
        Self {
            rms_left: snapshot.left.rms,
            rms_right: snapshot.right.rms,
            peak_hold_left: snapshot.left.peak_hold,
            peak_hold_right: snapshot.right.peak_hold,
            spectrum_db: snapshot.spectrum.magnitudes_db.clone(),
        }
    }
}
