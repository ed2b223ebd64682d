//! Lock-free level storage.

use super::AudioMetricsSnapshot;
use crate::AtomicFloat;

/// Lock-free level storage (RMS L/R, peak-hold L/R), linear.
///
/// Updated by the producer after every chunk so level meters can poll
/// without touching the session lock.
#[derive(Debug, Default)]
pub struct AtomicAmplitude {
    rms_left: AtomicFloat,
    rms_right: AtomicFloat,
    peak_hold_left: AtomicFloat,
    peak_hold_right: AtomicFloat,
}

impl AtomicAmplitude {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns (rms_left, rms_right, peak_hold_left, peak_hold_right).
    #[inline]
    pub fn get(&self) -> (f32, f32, f32, f32) {
        (
            self.rms_left.get(),
            self.rms_right.get(),
            self.peak_hold_left.get(),
            self.peak_hold_right.get(),
        )
    }

    #[inline]
    pub fn set(&self, rms_l: f32, rms_r: f32, peak_hold_l: f32, peak_hold_r: f32) {
        self.rms_left.set(rms_l);
        self.rms_right.set(rms_r);
        self.peak_hold_left.set(peak_hold_l);
        self.peak_hold_right.set(peak_hold_r);
    }

    pub(crate) fn store(&self, snapshot: &AudioMetricsSnapshot) {
        self.set(
            snapshot.left.rms,
            snapshot.right.rms,
            snapshot.left.peak_hold,
            snapshot.right.peak_hold,
        );
    }

    pub fn clear(&self) {
        self.set(0.0, 0.0, 0.0, 0.0);
    }
}
