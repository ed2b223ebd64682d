//! MeterEngine that owns the metering pipeline and its delivery channels.

use crossbeam_channel::Receiver;
use meterbridge_core::{
    AudioMetricsSnapshot, BasicLevels, LoudnessReading, MeterConfig, MeteringHandle,
    MeteringManager, SampleFormat,
};

use crate::Result;
use meterbridge_core::compat::Arc;

#[cfg(feature = "capture")]
use meterbridge_core::{CaptureConfig, CaptureStream};

/// Main metering engine.
///
/// MeterEngine wraps a shared [`MeteringManager`]. Audio goes in through
/// [`push_audio`](Self::push_audio), [`push_pcm`](Self::push_pcm) or a
/// capture stream (feature "capture"); every non-empty chunk produces one
/// immutable [`AudioMetricsSnapshot`] delivered to callbacks, subscribers and
/// the `latest()` slot.
///
/// # Example
///
/// ```
/// use meterbridge::prelude::*;
///
/// let engine = MeterEngine::builder().build()?;
/// let rx = engine.subscribe(16);
///
/// let chunk: Vec<f32> = (0..1024)
///     .flat_map(|i| {
///         let x = 0.5 * (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / 48000.0).sin();
///         [x, x]
///     })
///     .collect();
/// engine.push_audio(&chunk, 1024, 48000, 2)?;
///
/// let snapshot = rx.try_recv().unwrap();
/// assert!(!snapshot.is_silent);
/// assert!((snapshot.correlation - 1.0).abs() < 1e-3);
/// # Ok::<(), meterbridge::Error>(())
/// ```
pub struct MeterEngine {
    manager: Arc<MeteringManager>,
}

impl std::fmt::Debug for MeterEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeterEngine").finish_non_exhaustive()
    }
}

impl MeterEngine {
    pub fn builder() -> crate::MeterEngineBuilder {
        crate::MeterEngineBuilder::default()
    }

    pub(crate) fn from_config(config: MeterConfig) -> Result<Self> {
        let manager = MeteringManager::new(config)?;
        tracing::debug!(
            "Meter engine ready (fft {}, scope {}x{})",
            manager.config().fft_size,
            manager.config().scope_length,
            manager.config().scope_decimation
        );
        Ok(Self {
            manager: Arc::new(manager),
        })
    }

    pub fn config(&self) -> &MeterConfig {
        self.manager.config()
    }

    /// Begin a fresh session at `sample_rate`, discarding any previous state.
    pub fn start(&self, sample_rate: u32) -> Result<()> {
        Ok(self.manager.start(sample_rate)?)
    }

    pub fn stop(&self) {
        self.manager.stop();
    }

    pub fn is_active(&self) -> bool {
        self.manager.is_active()
    }

    /// Sample rate of the running session.
    pub fn sample_rate(&self) -> Option<u32> {
        self.manager.sample_rate()
    }

    /// Meter one chunk of interleaved f32 samples.
    ///
    /// Returns `Ok(None)` for an empty chunk. A sample rate different from the
    /// running session restarts it.
    pub fn push_audio(
        &self,
        samples: &[f32],
        frames: usize,
        sample_rate: u32,
        channels: usize,
    ) -> Result<Option<Arc<AudioMetricsSnapshot>>> {
        Ok(self
            .manager
            .push_audio(samples, frames, sample_rate, channels)?)
    }

    /// Decode and meter one chunk of raw interleaved PCM bytes.
    pub fn push_pcm(
        &self,
        bytes: &[u8],
        format: SampleFormat,
        frames: usize,
        sample_rate: u32,
        channels: usize,
    ) -> Result<Option<Arc<AudioMetricsSnapshot>>> {
        Ok(self
            .manager
            .push_pcm(bytes, format, frames, sample_rate, channels)?)
    }

    /// Register a callback for every future snapshot.
    ///
    /// Callbacks run on the thread that pushed the audio.
    pub fn on_snapshot<F>(&self, callback: F)
    where
        F: Fn(&Arc<AudioMetricsSnapshot>) + Send + Sync + 'static,
    {
        self.manager.on_snapshot(callback);
    }

    /// Bounded snapshot channel. A full channel drops snapshots instead of
    /// blocking the producer.
    pub fn subscribe(&self, capacity: usize) -> Receiver<Arc<AudioMetricsSnapshot>> {
        self.manager.subscribe(capacity)
    }

    pub fn latest(&self) -> Option<Arc<AudioMetricsSnapshot>> {
        self.manager.latest()
    }

    pub fn basic_levels(&self) -> Option<BasicLevels> {
        self.manager.basic_levels()
    }

    /// Returns (rms_left, rms_right, peak_hold_left, peak_hold_right).
    pub fn levels(&self) -> (f32, f32, f32, f32) {
        self.manager.levels()
    }

    pub fn loudness(&self) -> Option<LoudnessReading> {
        self.manager.loudness()
    }

    /// Snapshots discarded because a subscriber's channel was full.
    pub fn dropped_snapshots(&self) -> u64 {
        self.manager.dropped_snapshots()
    }

    /// Fluent metering handle.
    ///
    /// # Example
    /// ```
    /// # use meterbridge::prelude::*;
    /// # let engine = MeterEngine::builder().build()?;
    /// let lufs = engine.metering().reset_loudness().loudness();
    /// assert!(lufs.is_none());
    /// # Ok::<(), meterbridge::Error>(())
    /// ```
    pub fn metering(&self) -> MeteringHandle {
        MeteringHandle::new(Arc::clone(&self.manager))
    }

    /// Direct access to the metering manager.
    ///
    /// Use `metering()` for the fluent API.
    pub fn metering_manager(&self) -> &Arc<MeteringManager> {
        &self.manager
    }

    /// Open a capture stream that feeds this engine.
    ///
    /// The stream stops when the returned value is dropped.
    #[cfg(feature = "capture")]
    pub fn capture(&self, config: CaptureConfig) -> Result<CaptureStream> {
        Ok(CaptureStream::open(Arc::clone(&self.manager), config)?)
    }
}
