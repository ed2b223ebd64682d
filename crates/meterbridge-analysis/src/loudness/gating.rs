//! Two-stage gated Integrated loudness (BS.1770-4).

use super::{lufs_from_mean_square, ABSOLUTE_GATE_LUFS, RELATIVE_GATE_LU};

/// Integration block length.
pub const BLOCK_SECS: f64 = 0.4;

const BLOCK_SLACK: f64 = 1e-9;

/// Splits incoming `(mean square, duration)` pairs into contiguous 400 ms
/// blocks and keeps the gated mean over all committed blocks.
#[derive(Debug, Clone)]
pub struct GatedIntegrator {
    partial_energy: f64,
    partial_duration: f64,
    blocks: Vec<f64>,
    integrated_lufs: f64,
}

impl Default for GatedIntegrator {
    fn default() -> Self {
        Self::new()
    }
}

impl GatedIntegrator {
    pub fn new() -> Self {
        Self {
            partial_energy: 0.0,
            partial_duration: 0.0,
            blocks: Vec::new(),
            integrated_lufs: f64::NEG_INFINITY,
        }
    }

    /// Feed one pair. Returns true if at least one block was committed.
    pub fn push(&mut self, mean_square: f64, duration_secs: f64) -> bool {
        if !(duration_secs.is_finite() && duration_secs > 0.0 && mean_square.is_finite()) {
            return false;
        }
        let mean_square = mean_square.max(0.0);

        let mut remaining = duration_secs;
        let mut committed = false;
        while remaining > BLOCK_SLACK {
            let take = (BLOCK_SECS - self.partial_duration).min(remaining);
            self.partial_energy += mean_square * take;
            self.partial_duration += take;
            remaining -= take;

            if self.partial_duration >= BLOCK_SECS - BLOCK_SLACK {
                self.blocks.push(self.partial_energy / self.partial_duration);
                self.partial_energy = 0.0;
                self.partial_duration = 0.0;
                committed = true;
            }
        }

        if committed {
            self.integrated_lufs = gated_loudness(&self.blocks);
        }
        committed
    }

    /// Gated Integrated loudness, -inf until a block survives both gates.
    pub fn integrated_lufs(&self) -> f64 {
        self.integrated_lufs
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Gated loudness of a set of block mean squares.
///
/// Blocks below -70 LUFS are dropped, then blocks more than 10 LU below the
/// energy mean of the survivors. Returns -inf if nothing survives.
pub fn gated_loudness(blocks: &[f64]) -> f64 {
    let (sum, count) = blocks
        .iter()
        .filter(|&&ms| lufs_from_mean_square(ms) >= ABSOLUTE_GATE_LUFS)
        .fold((0.0, 0usize), |(s, c), &ms| (s + ms, c + 1));
    if count == 0 {
        return f64::NEG_INFINITY;
    }

    let relative_gate = lufs_from_mean_square(sum / count as f64) - RELATIVE_GATE_LU;
    let (sum, count) = blocks
        .iter()
        .filter(|&&ms| {
            let lufs = lufs_from_mean_square(ms);
            lufs >= ABSOLUTE_GATE_LUFS && lufs >= relative_gate
        })
        .fold((0.0, 0usize), |(s, c), &ms| (s + ms, c + 1));
    if count == 0 {
        return f64::NEG_INFINITY;
    }

    lufs_from_mean_square(sum / count as f64)
}
