//! Leaf DSP building blocks for the metering pipeline: biquad filters and the
//! BS.1770 K-weighting cascade, peak-hold ballistics, and DC offset tracking.
//!
//! Everything here is allocation-free and operates one sample (or one block
//! peak) at a time, so the frame processor can drive it from the audio thread.

mod ballistics;
mod biquad;
mod dc;

pub use ballistics::{PeakHold, DEFAULT_DECAY_DB_PER_SEC};
pub use biquad::{Biquad, FilterKind, KWeighting};
pub use dc::DcEstimator;

/// Convert a linear amplitude to dB, flooring at `floor_db`.
#[inline]
pub fn amplitude_to_db(amplitude: f32, floor_db: f32) -> f32 {
    if amplitude > 0.0 {
        (20.0 * amplitude.log10()).max(floor_db)
    } else {
        floor_db
    }
}
