//! Loudness Range (EBU Tech 3342 style, over a rolling window).

use std::collections::VecDeque;

use super::ABSOLUTE_GATE_LUFS;
use crate::percentile;

/// Default span of Short-term history considered.
pub const DEFAULT_HISTORY_SECS: f64 = 60.0;

/// Minimum stream-time spacing between recorded values.
pub const RECORD_INTERVAL_SECS: f64 = 0.1;

/// LRA relative gate below Integrated.
const RANGE_GATE_LU: f64 = 20.0;

/// Fewer filtered values than this report a range of 0.
const MIN_VALUES: usize = 5;

const LOW_PERCENTILE: f64 = 10.0;
const HIGH_PERCENTILE: f64 = 95.0;

/// Time-stamped Short-term history with P95 - P10 spread.
#[derive(Debug, Clone)]
pub struct LoudnessRange {
    history_secs: f64,
    history: VecDeque<(f64, f64)>,
    last_recorded: Option<f64>,
}

impl Default for LoudnessRange {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SECS)
    }
}

impl LoudnessRange {
    pub fn new(history_secs: f64) -> Self {
        Self {
            history_secs: history_secs.max(RECORD_INTERVAL_SECS),
            history: VecDeque::new(),
            last_recorded: None,
        }
    }

    /// Record a Short-term value at `time_secs` of stream time.
    ///
    /// Non-finite values and values closer than 100 ms to the previous
    /// record are skipped. Returns true if the value was kept.
    pub fn record(&mut self, time_secs: f64, short_term_lufs: f64) -> bool {
        if !short_term_lufs.is_finite() || !time_secs.is_finite() {
            return false;
        }
        if let Some(last) = self.last_recorded {
            if time_secs - last < RECORD_INTERVAL_SECS - 1e-9 {
                return false;
            }
        }

        self.history.push_back((time_secs, short_term_lufs));
        self.last_recorded = Some(time_secs);

        let cutoff = time_secs - self.history_secs;
        while self.history.front().is_some_and(|&(t, _)| t < cutoff) {
            self.history.pop_front();
        }
        true
    }

    /// P95 - P10 of the gated history, floored at 0.
    ///
    /// The gate is `max(-70, integrated - 20)`, or -70 when `integrated_lufs`
    /// is not finite.
    pub fn range_lu(&self, integrated_lufs: f64) -> f64 {
        let gate = if integrated_lufs.is_finite() {
            ABSOLUTE_GATE_LUFS.max(integrated_lufs - RANGE_GATE_LU)
        } else {
            ABSOLUTE_GATE_LUFS
        };

        let mut values: Vec<f64> = self
            .history
            .iter()
            .map(|&(_, lufs)| lufs)
            .filter(|&lufs| lufs >= gate)
            .collect();
        if values.len() < MIN_VALUES {
            return 0.0;
        }
        values.sort_by(|a, b| a.total_cmp(b));

        (percentile(&values, HIGH_PERCENTILE) - percentile(&values, LOW_PERCENTILE)).max(0.0)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.last_recorded = None;
    }
}
