//! EBU R128 / ITU-R BS.1770 loudness.
//!
//! [`LoudnessMeter`] consumes `(K-weighted mean square, duration)` pairs, one
//! per processed block, and keeps:
//! - Momentary (400 ms) and Short-term (3 s) sliding windows
//! - gated Integrated loudness over contiguous 400 ms blocks
//! - Loudness Range over a rolling Short-term history
//!
//! K-weighting itself happens upstream (see `meterbridge_dsp::KWeighting`).
//! [`analyze_loudness`] runs the whole chain offline on planar buffers.

mod gating;
mod range;
mod window;

pub use gating::{gated_loudness, GatedIntegrator, BLOCK_SECS};
pub use range::{LoudnessRange, DEFAULT_HISTORY_SECS, RECORD_INTERVAL_SECS};
pub use window::EnergyWindow;

use meterbridge_dsp::KWeighting;

use crate::true_peak::SampleHistory;
use crate::DB_FLOOR;

pub const MOMENTARY_SECS: f64 = 0.4;
pub const SHORT_TERM_SECS: f64 = 3.0;

/// Windows report -inf until they hold this much audio.
pub const MIN_WINDOW_SECS: f64 = 0.1;

pub const ABSOLUTE_GATE_LUFS: f64 = -70.0;
pub const RELATIVE_GATE_LU: f64 = 10.0;

const LUFS_OFFSET: f64 = -0.691;
const MEAN_SQUARE_EPSILON: f64 = 1e-12;
const PEAK_EPSILON: f64 = 1e-12;

/// `10·log10(ms + 1e-12) - 0.691`
#[inline]
pub fn lufs_from_mean_square(mean_square: f64) -> f64 {
    10.0 * (mean_square.max(0.0) + MEAN_SQUARE_EPSILON).log10() + LUFS_OFFSET
}

/// Peak-to-Short-term ratio: `20·log10(peak + eps) - LUFS_S`, NaN without Short-term.
pub fn psr_db(sample_peak: f32, short_term_lufs: f64) -> f64 {
    if !short_term_lufs.is_finite() {
        return f64::NAN;
    }
    20.0 * (sample_peak.max(0.0) as f64 + PEAK_EPSILON).log10() - short_term_lufs
}

/// Peak-to-loudness ratio: `dBTP - LUFS_S`, NaN without Short-term.
pub fn plr_db(true_peak_dbtp: f64, short_term_lufs: f64) -> f64 {
    if !short_term_lufs.is_finite() {
        return f64::NAN;
    }
    true_peak_dbtp - short_term_lufs
}

/// Loudness after the latest block.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct LoudnessReading {
    /// -inf until 100 ms of audio has been seen
    pub momentary_lufs: f64,
    /// -inf until 100 ms of audio has been seen
    pub short_term_lufs: f64,
    /// -inf until a block survives gating
    pub integrated_lufs: f64,
    /// >= 0
    pub range_lu: f64,
}

impl Default for LoudnessReading {
    fn default() -> Self {
        Self {
            momentary_lufs: f64::NEG_INFINITY,
            short_term_lufs: f64::NEG_INFINITY,
            integrated_lufs: f64::NEG_INFINITY,
            range_lu: 0.0,
        }
    }
}

/// Streaming loudness meter
#[derive(Debug, Clone)]
pub struct LoudnessMeter {
    momentary: EnergyWindow,
    short_term: EnergyWindow,
    integrator: GatedIntegrator,
    range: LoudnessRange,
    stream_time: f64,
    reading: LoudnessReading,
}

impl Default for LoudnessMeter {
    fn default() -> Self {
        Self::new()
    }
}

impl LoudnessMeter {
    pub fn new() -> Self {
        Self::with_history(DEFAULT_HISTORY_SECS)
    }

    /// Create a meter whose LRA considers the last `history_secs` of stream time.
    pub fn with_history(history_secs: f64) -> Self {
        Self {
            momentary: EnergyWindow::new(MOMENTARY_SECS),
            short_term: EnergyWindow::new(SHORT_TERM_SECS),
            integrator: GatedIntegrator::new(),
            range: LoudnessRange::new(history_secs),
            stream_time: 0.0,
            reading: LoudnessReading::default(),
        }
    }

    /// Feed one block's K-weighted mean square and its duration in seconds.
    pub fn push(&mut self, mean_square: f64, duration_secs: f64) -> LoudnessReading {
        if !(duration_secs.is_finite() && duration_secs > 0.0) {
            return self.reading;
        }

        self.momentary.push(mean_square, duration_secs);
        self.short_term.push(mean_square, duration_secs);
        self.integrator.push(mean_square, duration_secs);
        self.stream_time += duration_secs;

        let momentary_lufs = window_lufs(&self.momentary);
        let short_term_lufs = window_lufs(&self.short_term);
        self.range.record(self.stream_time, short_term_lufs);

        let integrated_lufs = self.integrator.integrated_lufs();
        self.reading = LoudnessReading {
            momentary_lufs,
            short_term_lufs,
            integrated_lufs,
            range_lu: self.range.range_lu(integrated_lufs),
        };
        self.reading
    }

    pub fn reading(&self) -> LoudnessReading {
        self.reading
    }

    /// Seconds of audio fed since creation or the last full reset.
    pub fn stream_time(&self) -> f64 {
        self.stream_time
    }

    /// Restart Integrated and LRA while keeping Momentary and Short-term.
    pub fn reset_integration(&mut self) {
        self.integrator.reset();
        self.range.reset();
        self.reading.integrated_lufs = f64::NEG_INFINITY;
        self.reading.range_lu = 0.0;
    }

    pub fn reset(&mut self) {
        self.momentary.reset();
        self.short_term.reset();
        self.reset_integration();
        self.stream_time = 0.0;
        self.reading = LoudnessReading::default();
    }
}

fn window_lufs(window: &EnergyWindow) -> f64 {
    if window.duration() + 1e-9 < MIN_WINDOW_SECS {
        return f64::NEG_INFINITY;
    }
    lufs_from_mean_square(window.mean_square())
}

/// Result of offline loudness analysis.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct LoudnessResult {
    /// Integrated loudness in LUFS (-inf if nothing survives gating).
    pub integrated_lufs: f64,
    /// Maximum true peak in dBTP.
    pub true_peak_dbtp: f64,
    /// Loudness range in LU.
    pub loudness_range_lu: f64,
}

/// One-shot loudness analysis for offline processing.
///
/// Audio is K-weighted and fed to a [`LoudnessMeter`] in 100 ms blocks; the
/// block mean square is the average over both channels. Mismatched lengths
/// are truncated to the shorter buffer.
pub fn analyze_loudness(left: &[f32], right: &[f32], sample_rate: u32) -> LoudnessResult {
    let len = left.len().min(right.len());
    if sample_rate == 0 || len == 0 {
        return LoudnessResult {
            integrated_lufs: f64::NEG_INFINITY,
            true_peak_dbtp: DB_FLOOR as f64,
            loudness_range_lu: 0.0,
        };
    }

    let sr = sample_rate as f64;
    let block_frames = ((sr * RECORD_INTERVAL_SECS) as usize).max(1);
    let mut k_left = KWeighting::new(sr);
    let mut k_right = KWeighting::new(sr);
    let mut tp_left = SampleHistory::new();
    let mut tp_right = SampleHistory::new();
    let mut meter = LoudnessMeter::new();
    let mut true_peak = 0.0f32;

    for (l_block, r_block) in left[..len]
        .chunks(block_frames)
        .zip(right[..len].chunks(block_frames))
    {
        let mut sum = 0.0;
        for (&l, &r) in l_block.iter().zip(r_block) {
            let l = if l.is_finite() { l } else { 0.0 };
            let r = if r.is_finite() { r } else { 0.0 };
            let kl = k_left.process(l as f64);
            let kr = k_right.process(r as f64);
            sum += 0.5 * (kl * kl + kr * kr);
            true_peak = true_peak
                .max(tp_left.push(l, true))
                .max(tp_right.push(r, true));
        }
        let frames = l_block.len();
        meter.push(sum / frames as f64, frames as f64 / sr);
    }

    let reading = meter.reading();
    let true_peak_dbtp = if true_peak > 0.0 {
        (20.0 * (true_peak as f64).log10()).max(DB_FLOOR as f64)
    } else {
        DB_FLOOR as f64
    };

    LoudnessResult {
        integrated_lufs: reading.integrated_lufs,
        true_peak_dbtp,
        loudness_range_lu: reading.range_lu,
    }
}
