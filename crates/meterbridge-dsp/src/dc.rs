//! DC offset tracking.

/// One-pole exponential moving average of the raw signal.
///
/// `alpha = 1 - exp(-1 / (tau * sample_rate))`, so the estimate settles to
/// ~63 % of a step after `tau` seconds.
#[derive(Debug, Clone)]
pub struct DcEstimator {
    alpha: f64,
    value: f64,
}

impl DcEstimator {
    pub fn new(time_constant_secs: f64, sample_rate: f64) -> Self {
        let samples = time_constant_secs * sample_rate;
        let alpha = if samples > 0.0 {
            1.0 - (-1.0 / samples).exp()
        } else {
            1.0
        };
        Self { alpha, value: 0.0 }
    }

    #[inline]
    pub fn push(&mut self, x: f64) {
        self.value += self.alpha * (x - self.value);
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }
}
