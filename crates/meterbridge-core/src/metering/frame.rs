//! Per-sample work of the chunk pipeline.
//!
//! [`ChannelState`] owns everything one channel needs between chunks: the
//! K-weighting registers, the true-peak history and hold, the DC estimator,
//! peak-hold ballistics and the oscilloscope ring.

use meterbridge_analysis::{ChannelLevels, SampleHistory, ScopeRing};
use meterbridge_dsp::{DcEstimator, KWeighting, PeakHold};

use super::snapshot::{level_db, ChannelMetrics};
use crate::MeterConfig;

/// Floor for the held true peak before conversion to dB (-120 dBTP).
const TRUE_PEAK_EPSILON: f64 = 1e-6;

/// Map one interleaved frame to a stereo pair.
///
/// Mono is duplicated; with more than two channels the first two are used.
#[inline]
pub(crate) fn stereo_pair(frame: &[f32]) -> (f32, f32) {
    match frame {
        [mono] => (*mono, *mono),
        [l, r, ..] => (*l, *r),
        [] => (0.0, 0.0),
    }
}

/// Replace NaN and infinities with silence, counting replacements.
#[inline]
pub(crate) fn sanitize(x: f32, replaced: &mut usize) -> f32 {
    if x.is_finite() {
        x
    } else {
        *replaced += 1;
        0.0
    }
}

/// Cross-chunk state for one output channel.
#[derive(Debug, Clone)]
pub(crate) struct ChannelState {
    k_weighting: KWeighting,
    k_sum_sq: f64,
    history: SampleHistory,
    true_peak_hold: f32,
    dc: DcEstimator,
    peak_hold: PeakHold,
    scope: ScopeRing,
    oversample: bool,
}

impl ChannelState {
    pub(crate) fn new(sample_rate: u32, config: &MeterConfig) -> Self {
        let sr = sample_rate as f64;
        Self {
            k_weighting: KWeighting::new(sr),
            k_sum_sq: 0.0,
            history: SampleHistory::new(),
            true_peak_hold: 0.0,
            dc: DcEstimator::new(config.dc_time_constant_secs, sr),
            peak_hold: PeakHold::new(config.peak_hold_decay_db_per_sec),
            scope: ScopeRing::new(config.scope_length, config.scope_decimation),
            oversample: config.true_peak_oversampling,
        }
    }

    /// Feed one finite sample.
    #[inline]
    pub(crate) fn push(&mut self, x: f32) {
        let tp = self.history.push(x, self.oversample);
        if tp > self.true_peak_hold {
            self.true_peak_hold = tp;
        }

        let xf = x as f64;
        self.dc.push(xf);
        self.scope.push(x);

        let k = self.k_weighting.process(xf);
        self.k_sum_sq += k * k;
    }

    /// Sum of K-weighted squares since the last call; clears it.
    pub(crate) fn take_k_sum_sq(&mut self) -> f64 {
        std::mem::take(&mut self.k_sum_sq)
    }

    /// Held true peak of the current block (linear).
    pub(crate) fn true_peak(&self) -> f32 {
        self.true_peak_hold
    }

    /// Close the block: apply ballistics, convert to dB and reset the
    /// true-peak hold.
    pub(crate) fn finish_block(
        &mut self,
        levels: ChannelLevels,
        elapsed_secs: f32,
        silent: bool,
    ) -> ChannelMetrics {
        let peak_hold = self.peak_hold.update(levels.peak, elapsed_secs, silent);

        let held = (self.true_peak_hold as f64).max(TRUE_PEAK_EPSILON);
        let true_peak_dbtp = (20.0 * held.log10()) as f32;
        self.true_peak_hold = 0.0;

        ChannelMetrics {
            rms: levels.rms,
            peak: levels.peak,
            peak_hold,
            rms_db: level_db(levels.rms),
            peak_db: level_db(levels.peak),
            peak_hold_db: level_db(peak_hold),
            true_peak_dbtp,
            crest_db: levels.crest_db,
            dc_offset: self.dc.value() as f32,
        }
    }

    pub(crate) fn scope(&self) -> Vec<f32> {
        self.scope.snapshot()
    }
}
