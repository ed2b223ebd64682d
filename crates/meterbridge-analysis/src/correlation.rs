//! Stereo Levels and Correlation
//!
//! Streaming per-block statistics for a stereo pair:
//! - **Levels**: RMS, sample peak and crest factor per channel
//! - **Correlation**: Pearson coefficient between L and R (-1 to +1)
//! - **Balance**: Left/right RMS balance (-1 to +1)
//! - **Width**: Side-to-Mid energy ratio in dB
//!
//! [`StereoAccumulator`] is fed one frame at a time and drained once per
//! block, so the caller can interleave it with other per-sample work.

use crate::ENERGY_EPSILON;

/// Crest factor bounds in dB.
const CREST_MAX_DB: f32 = 24.0;

/// Width bounds in dB. Silence sits at the floor, pure side at the ceiling.
pub const WIDTH_FLOOR_DB: f32 = -30.0;
pub const WIDTH_CEIL_DB: f32 = 30.0;

/// Balance is forced to 0 below this RMS sum.
const BALANCE_EPSILON: f64 = 1e-12;

/// Per-channel block levels
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ChannelLevels {
    /// Linear RMS (>= 0)
    pub rms: f32,
    /// Absolute sample peak (>= 0)
    pub peak: f32,
    /// Peak-to-RMS ratio in dB, clamped to [0, 24]
    pub crest_db: f32,
}

/// Stereo analysis results
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct StereoAnalysis {
    pub left: ChannelLevels,
    pub right: ChannelLevels,

    /// Pearson correlation (-1.0 to 1.0)
    /// - 1.0 = Mono (L and R identical)
    /// - 0.0 = Uncorrelated, or no energy
    /// - -1.0 = Out of phase (L and R are inverted)
    pub correlation: f32,

    /// Left/right balance (-1.0 to 1.0)
    /// - -1.0 = Full left
    /// - 0.0 = Center
    /// - 1.0 = Full right
    pub balance: f32,

    /// Side-to-Mid energy ratio in dB, clamped to [-30, 30]
    pub width_db: f32,

    /// Mid (L+R)/2 RMS level
    pub mid_level: f32,

    /// Side (L-R)/2 RMS level
    pub side_level: f32,

    /// Samples with |x| >= 1.0 across both channels
    pub clipped_samples: u64,

    /// Frames accumulated
    pub frames: usize,
}

impl StereoAnalysis {
    /// Louder of the two channel RMS values
    pub fn max_rms(&self) -> f32 {
        self.left.rms.max(self.right.rms)
    }

    /// Louder of the two channel sample peaks
    pub fn max_peak(&self) -> f32 {
        self.left.peak.max(self.right.peak)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ChannelSums {
    sum: f64,
    sum_sq: f64,
    peak: f32,
}

impl ChannelSums {
    #[inline]
    fn push(&mut self, x: f32) -> bool {
        let v = x as f64;
        self.sum += v;
        self.sum_sq += v * v;
        let a = x.abs();
        if a > self.peak {
            self.peak = a;
        }
        a >= 1.0
    }

    fn levels(&self, n: f64) -> ChannelLevels {
        let rms = (self.sum_sq / n).max(0.0).sqrt() as f32;
        ChannelLevels {
            rms,
            peak: self.peak,
            crest_db: crest_factor_db(self.peak, rms),
        }
    }

    /// Variance-style sum `Σx² - n·mean²`, never negative.
    fn centered_sum_sq(&self, n: f64) -> f64 {
        let mean = self.sum / n;
        (self.sum_sq - n * mean * mean).max(0.0)
    }
}

/// Frame-at-a-time stereo statistics for one block
#[derive(Debug, Clone, Default)]
pub struct StereoAccumulator {
    left: ChannelSums,
    right: ChannelSums,
    sum_lr: f64,
    sum_mid_sq: f64,
    sum_side_sq: f64,
    clipped: u64,
    frames: usize,
}

impl StereoAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one stereo frame. Inputs are expected to be finite.
    #[inline]
    pub fn push(&mut self, l: f32, r: f32) {
        if self.left.push(l) {
            self.clipped += 1;
        }
        if self.right.push(r) {
            self.clipped += 1;
        }

        let (lf, rf) = (l as f64, r as f64);
        self.sum_lr += lf * rf;

        let mid = 0.5 * (lf + rf);
        let side = 0.5 * (lf - rf);
        self.sum_mid_sq += mid * mid;
        self.sum_side_sq += side * side;
        self.frames += 1;
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Finalize the block and clear all sums.
    pub fn finish(&mut self) -> StereoAnalysis {
        let result = self.analysis();
        *self = Self::default();
        result
    }

    /// Compute the block result without clearing.
    pub fn analysis(&self) -> StereoAnalysis {
        if self.frames == 0 {
            return StereoAnalysis {
                width_db: WIDTH_FLOOR_DB,
                ..StereoAnalysis::default()
            };
        }

        let n = self.frames as f64;
        let left = self.left.levels(n);
        let right = self.right.levels(n);

        StereoAnalysis {
            left,
            right,
            correlation: self.pearson(n),
            balance: balance(left.rms, right.rms),
            width_db: width_db(self.sum_side_sq, self.sum_mid_sq),
            mid_level: (self.sum_mid_sq / n).sqrt() as f32,
            side_level: (self.sum_side_sq / n).sqrt() as f32,
            clipped_samples: self.clipped,
            frames: self.frames,
        }
    }

    // r = (Σlr - n·meanL·meanR) / sqrt(varL·varR)
    fn pearson(&self, n: f64) -> f32 {
        let mean_l = self.left.sum / n;
        let mean_r = self.right.sum / n;
        let cov = self.sum_lr - n * mean_l * mean_r;
        let denom = (self.left.centered_sum_sq(n) * self.right.centered_sum_sq(n)).sqrt();
        if !denom.is_finite() || denom <= ENERGY_EPSILON {
            return 0.0;
        }
        let r = cov / denom;
        if r.is_finite() {
            r.clamp(-1.0, 1.0) as f32
        } else {
            0.0
        }
    }
}

/// `clamp(20·log10(peak / max(rms, eps)), 0, 24)`; a zero peak gives 0.
pub fn crest_factor_db(peak: f32, rms: f32) -> f32 {
    let ratio = peak as f64 / (rms as f64).max(ENERGY_EPSILON);
    let db = (20.0 * ratio.log10()) as f32;
    if db.is_nan() {
        return 0.0;
    }
    db.clamp(0.0, CREST_MAX_DB)
}

/// `clamp((R - L) / (R + L), -1, 1)`, 0 when the sum is near zero.
pub fn balance(rms_left: f32, rms_right: f32) -> f32 {
    let sum = rms_left as f64 + rms_right as f64;
    if sum < BALANCE_EPSILON {
        return 0.0;
    }
    ((rms_right as f64 - rms_left as f64) / sum).clamp(-1.0, 1.0) as f32
}

/// `clamp(10·log10(ΣS² / ΣM²), -30, 30)` with silence at the floor and
/// pure side at the ceiling.
pub fn width_db(sum_side_sq: f64, sum_mid_sq: f64) -> f32 {
    if sum_mid_sq <= ENERGY_EPSILON {
        return if sum_side_sq > ENERGY_EPSILON {
            WIDTH_CEIL_DB
        } else {
            WIDTH_FLOOR_DB
        };
    }
    let db = (10.0 * (sum_side_sq / sum_mid_sq).log10()) as f32;
    if db.is_nan() {
        return WIDTH_FLOOR_DB;
    }
    db.clamp(WIDTH_FLOOR_DB, WIDTH_CEIL_DB)
}

/// Analyze a stereo buffer (non-streaming, instant analysis)
pub fn analyze_stereo(left: &[f32], right: &[f32]) -> StereoAnalysis {
    let mut acc = StereoAccumulator::new();
    for (&l, &r) in left.iter().zip(right) {
        acc.push(l, r);
    }
    acc.finish()
}

/// Analyze stereo from interleaved samples
pub fn analyze_stereo_interleaved(samples: &[f32]) -> StereoAnalysis {
    let mut acc = StereoAccumulator::new();
    for frame in samples.chunks_exact(2) {
        acc.push(frame[0], frame[1]);
    }
    acc.finish()
}
