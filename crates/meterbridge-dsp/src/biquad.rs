//! Second-order IIR sections and the BS.1770 K-weighting cascade.
//!
//! Coefficients come from the RBJ "Audio EQ Cookbook" bilinear-transform
//! designs. Processing uses the transposed direct form II, which keeps only
//! two state registers and behaves well numerically for low cutoffs.

use core::f64::consts::PI;

/// K-weighting stage 1: high-pass (RLB) corner.
const K_HIGHPASS_HZ: f64 = 38.0;
const K_HIGHPASS_Q: f64 = 0.707;

/// K-weighting stage 2: high-shelf corner, Q and gain.
const K_SHELF_HZ: f64 = 1682.0;
const K_SHELF_Q: f64 = 0.707;
const K_SHELF_GAIN_DB: f64 = 4.0;

/// Biquad response type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterKind {
    /// Pass-through (b0 = 1, all other coefficients 0).
    #[default]
    Bypass,
    HighPass,
    HighShelf,
}

/// A single biquad section, transposed direct form II.
#[derive(Debug, Clone, Default)]
pub struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    z1: f64,
    z2: f64,
}

impl Biquad {
    /// Create a configured section with cleared state.
    pub fn new(sample_rate: f64, kind: FilterKind, freq_hz: f64, q: f64, gain_db: f64) -> Self {
        let mut filter = Self::default();
        filter.configure(sample_rate, kind, freq_hz, q, gain_db);
        filter
    }

    /// Recompute the five normalized coefficients.
    ///
    /// State registers are left untouched; call [`reset`](Self::reset) when the
    /// sample rate changes. `gain_db` is ignored by kinds without gain.
    pub fn configure(
        &mut self,
        sample_rate: f64,
        kind: FilterKind,
        freq_hz: f64,
        q: f64,
        gain_db: f64,
    ) {
        let kind = if sample_rate > 0.0 && q > 0.0 {
            kind
        } else {
            FilterKind::Bypass
        };

        // Keep the corner strictly below Nyquist so the design stays stable.
        let nyquist_guard = (sample_rate * 0.49).max(1.0);
        let w0 = 2.0 * PI * freq_hz.clamp(1.0, nyquist_guard) / sample_rate.max(1.0);
        let (sin_w0, cos_w0) = w0.sin_cos();
        let alpha = sin_w0 / (2.0 * q.max(f64::EPSILON));

        match kind {
            FilterKind::Bypass => self.set_coefficients(1.0, 0.0, 0.0, 1.0, 0.0, 0.0),
            FilterKind::HighPass => {
                let b0 = (1.0 + cos_w0) * 0.5;
                let b1 = -(1.0 + cos_w0);
                let b2 = b0;
                let a0 = 1.0 + alpha;
                let a1 = -2.0 * cos_w0;
                let a2 = 1.0 - alpha;
                self.set_coefficients(b0, b1, b2, a0, a1, a2);
            }
            FilterKind::HighShelf => {
                let a = 10f64.powf(gain_db / 40.0);
                let two_sqrt_a_alpha = 2.0 * a.sqrt() * alpha;
                let b0 = a * ((a + 1.0) + (a - 1.0) * cos_w0 + two_sqrt_a_alpha);
                let b1 = -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_w0);
                let b2 = a * ((a + 1.0) + (a - 1.0) * cos_w0 - two_sqrt_a_alpha);
                let a0 = (a + 1.0) - (a - 1.0) * cos_w0 + two_sqrt_a_alpha;
                let a1 = 2.0 * ((a - 1.0) - (a + 1.0) * cos_w0);
                let a2 = (a + 1.0) - (a - 1.0) * cos_w0 - two_sqrt_a_alpha;
                self.set_coefficients(b0, b1, b2, a0, a1, a2);
            }
        }
    }

    fn set_coefficients(&mut self, b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) {
        let inv_a0 = 1.0 / a0;
        self.b0 = b0 * inv_a0;
        self.b1 = b1 * inv_a0;
        self.b2 = b2 * inv_a0;
        self.a1 = a1 * inv_a0;
        self.a2 = a2 * inv_a0;
    }

    #[inline]
    pub fn process(&mut self, x: f64) -> f64 {
        let y = self.b0 * x + self.z1;
        self.z1 = self.b1 * x - self.a1 * y + self.z2;
        self.z2 = self.b2 * x - self.a2 * y;
        y
    }

    /// Zero the state registers.
    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }

    /// Normalized coefficients `(b0, b1, b2, a1, a2)`.
    pub fn coefficients(&self) -> (f64, f64, f64, f64, f64) {
        (self.b0, self.b1, self.b2, self.a1, self.a2)
    }
}

/// High-pass followed by high-shelf: the BS.1770 perceptual pre-filter.
#[derive(Debug, Clone)]
pub struct KWeighting {
    highpass: Biquad,
    shelf: Biquad,
}

impl KWeighting {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            highpass: Biquad::new(
                sample_rate,
                FilterKind::HighPass,
                K_HIGHPASS_HZ,
                K_HIGHPASS_Q,
                0.0,
            ),
            shelf: Biquad::new(
                sample_rate,
                FilterKind::HighShelf,
                K_SHELF_HZ,
                K_SHELF_Q,
                K_SHELF_GAIN_DB,
            ),
        }
    }

    /// Redesign both stages for a new rate and clear their state.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        *self = Self::new(sample_rate);
    }

    #[inline]
    pub fn process(&mut self, x: f64) -> f64 {
        self.shelf.process(self.highpass.process(x))
    }

    pub fn reset(&mut self) {
        self.highpass.reset();
        self.shelf.reset();
    }
}
