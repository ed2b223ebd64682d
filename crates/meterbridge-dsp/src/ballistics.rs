//! Peak-hold ballistics for level meters.

/// Default hold release rate.
pub const DEFAULT_DECAY_DB_PER_SEC: f32 = 6.0;

/// Decaying peak-hold for one channel.
///
/// The hold falls exponentially at a fixed dB/s rate, scaled by the wall-clock
/// time since the previous update, and snaps up to any block peak above it.
/// While the signal is silent it additionally halves every second so a stale
/// hold does not hang around.
#[derive(Debug, Clone)]
pub struct PeakHold {
    value: f32,
    decay_db_per_sec: f32,
}

impl Default for PeakHold {
    fn default() -> Self {
        Self::new(DEFAULT_DECAY_DB_PER_SEC)
    }
}

impl PeakHold {
    pub fn new(decay_db_per_sec: f32) -> Self {
        Self {
            value: 0.0,
            decay_db_per_sec: decay_db_per_sec.max(0.0),
        }
    }

    /// Advance the hold by `elapsed_secs` and merge in `block_peak`.
    ///
    /// Negative or non-finite elapsed times are treated as zero.
    pub fn update(&mut self, block_peak: f32, elapsed_secs: f32, silent: bool) -> f32 {
        let elapsed = if elapsed_secs.is_finite() {
            elapsed_secs.max(0.0)
        } else {
            0.0
        };

        if elapsed > 0.0 {
            let decay_db = self.decay_db_per_sec * elapsed;
            self.value *= 10f32.powf(-decay_db / 20.0);
            if silent {
                self.value *= 0.5f32.powf(elapsed);
            }
        }

        let peak = if block_peak.is_finite() {
            block_peak.max(0.0)
        } else {
            0.0
        };
        if peak > self.value {
            self.value = peak;
        }
        self.value
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }
}
