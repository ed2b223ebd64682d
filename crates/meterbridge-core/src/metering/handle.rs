//! Fluent API handle for metering access.

use crossbeam_channel::Receiver;
use meterbridge_analysis::LoudnessReading;

use super::{AudioMetricsSnapshot, BasicLevels, MeteringManager};
use crate::compat::Arc;

/// Fluent API handle for metering access.
///
/// Created via `engine.metering()`.
///
/// # Example
/// ```ignore
/// let m = engine.metering();
/// let (rms_l, rms_r, hold_l, hold_r) = m.levels();
/// let lufs = m.loudness().map(|l| l.integrated_lufs);
///
/// // Start a new programme measurement
/// engine.metering().reset_loudness();
/// ```
#[derive(Clone)]
pub struct MeteringHandle {
    manager: Arc<MeteringManager>,
}

impl MeteringHandle {
    pub fn new(manager: Arc<MeteringManager>) -> Self {
        Self { manager }
    }

    pub fn is_active(&self) -> bool {
        self.manager.is_active()
    }

    pub fn latest(&self) -> Option<Arc<AudioMetricsSnapshot>> {
        self.manager.latest()
    }

    /// Returns (rms_left, rms_right, peak_hold_left, peak_hold_right).
    pub fn levels(&self) -> (f32, f32, f32, f32) {
        self.manager.levels()
    }

    pub fn basic_levels(&self) -> Option<BasicLevels> {
        self.manager.basic_levels()
    }

    pub fn loudness(&self) -> Option<LoudnessReading> {
        self.manager.loudness()
    }

    pub fn reset_loudness(self) -> Self {
        self.manager.reset_loudness();
        self
    }

    pub fn on_snapshot<F>(self, callback: F) -> Self
    where
        F: Fn(&Arc<AudioMetricsSnapshot>) + Send + Sync + 'static,
    {
        self.manager.on_snapshot(callback);
        self
    }

    pub fn subscribe(&self, capacity: usize) -> Receiver<Arc<AudioMetricsSnapshot>> {
        self.manager.subscribe(capacity)
    }

    pub fn inner(&self) -> &Arc<MeteringManager> {
        &self.manager
    }
}
