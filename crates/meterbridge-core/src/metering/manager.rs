//! Central metering manager.

use arc_swap::ArcSwapOption;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use meterbridge_analysis::LoudnessReading;

use super::ingest::{decode_pcm_into, SampleFormat};
use super::session::validate_chunk;
use super::{AtomicAmplitude, AudioMetricsSnapshot, BasicLevels, MeteringSession};
use crate::compat::{Arc, Mutex, RwLock};
use crate::config::validate_sample_rate;
use crate::lockfree::{AtomicCounter, AtomicFlag};
use crate::{MeterConfig, Result};

/// Callback invoked with every emitted snapshot, on the producer thread.
pub type SnapshotCallback = Arc<dyn Fn(&Arc<AudioMetricsSnapshot>) + Send + Sync>;

type Subscribers = Mutex<Vec<Sender<Arc<AudioMetricsSnapshot>>>>;

/// Owns the session and delivers snapshots.
///
/// One producer thread drives [`push_audio`](Self::push_audio); the session
/// mutex is held for the whole chunk and released before any consumer runs.
/// Consumers either register a callback, take a bounded channel, or poll
/// [`latest`](Self::latest) and [`levels`](Self::levels).
pub struct MeteringManager {
    config: MeterConfig,
    session: Mutex<Option<MeteringSession>>,
    pcm_scratch: Mutex<Vec<f32>>,

    callbacks: RwLock<Vec<SnapshotCallback>>,
    subscribers: Subscribers,
    latest: ArcSwapOption<AudioMetricsSnapshot>,
    amplitude: Arc<AtomicAmplitude>,

    active: AtomicFlag,
    dropped: AtomicCounter,
}

impl MeteringManager {
    pub fn new(config: MeterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            session: Mutex::new(None),
            pcm_scratch: Mutex::new(Vec::new()),
            callbacks: RwLock::new(Vec::new()),
            subscribers: Mutex::new(Vec::new()),
            latest: ArcSwapOption::empty(),
            amplitude: Arc::new(AtomicAmplitude::new()),
            active: AtomicFlag::new(false),
            dropped: AtomicCounter::new(),
        })
    }

    pub fn config(&self) -> &MeterConfig {
        &self.config
    }

    /// Begin a fresh session, discarding any previous state.
    pub fn start(&self, sample_rate: u32) -> Result<()> {
        if let Err(e) = validate_sample_rate(sample_rate) {
            tracing::warn!("Rejected session start: {}", e);
            return Err(e);
        }
        let session = MeteringSession::new(sample_rate, self.config.clone())?;
        *self.session.lock() = Some(session);
        self.clear_outputs();
        self.active.set(true);
        tracing::info!("Metering session started at {} Hz", sample_rate);
        Ok(())
    }

    /// End the session. Snapshots already handed out stay valid.
    pub fn stop(&self) {
        let previous = self.session.lock().take();
        self.active.set(false);
        if let Some(session) = previous {
            tracing::info!(
                "Metering session stopped after {} chunks ({:.2} s)",
                session.sequence(),
                session.stream_time()
            );
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Sample rate of the running session.
    pub fn sample_rate(&self) -> Option<u32> {
        self.session.lock().as_ref().map(|s| s.sample_rate())
    }

    /// Run one interleaved f32 chunk through the pipeline.
    ///
    /// Starts a session if none is running and restarts it when
    /// `sample_rate` differs from the running one. Invalid input is rejected
    /// before anything changes. `frames == 0` returns `Ok(None)`.
    pub fn push_audio(
        &self,
        samples: &[f32],
        frames: usize,
        sample_rate: u32,
        channels: usize,
    ) -> Result<Option<Arc<AudioMetricsSnapshot>>> {
        if let Err(e) = validate_sample_rate(sample_rate)
            .and_then(|_| validate_chunk(samples.len(), frames, channels))
        {
            tracing::warn!("Rejected audio chunk: {}", e);
            return Err(e);
        }
        if frames == 0 {
            return Ok(None);
        }

        let snapshot = {
            let mut guard = self.session.lock();
            let restart = match guard.as_ref() {
                Some(session) if session.sample_rate() == sample_rate => false,
                Some(session) => {
                    tracing::info!(
                        "Sample rate changed from {} to {} Hz, resetting session",
                        session.sample_rate(),
                        sample_rate
                    );
                    true
                }
                None => {
                    tracing::info!("Metering session started at {} Hz", sample_rate);
                    true
                }
            };
            if restart {
                *guard = Some(MeteringSession::new(sample_rate, self.config.clone())?);
                self.active.set(true);
            }

            match guard.as_mut() {
                Some(session) => session.process_chunk(samples, frames, channels)?,
                None => None,
            }
        };

        Ok(snapshot.map(|snapshot| {
            let snapshot = Arc::new(snapshot);
            self.emit(&snapshot);
            snapshot
        }))
    }

    /// Decode a raw PCM byte buffer and run it through [`push_audio`](Self::push_audio).
    pub fn push_pcm(
        &self,
        bytes: &[u8],
        format: SampleFormat,
        frames: usize,
        sample_rate: u32,
        channels: usize,
    ) -> Result<Option<Arc<AudioMetricsSnapshot>>> {
        // The buffer is taken out so no lock is held while snapshots are emitted.
        let mut scratch = std::mem::take(&mut *self.pcm_scratch.lock());
        let result = match decode_pcm_into(bytes, format, frames, channels, &mut scratch) {
            Ok(()) => self.push_audio(&scratch, frames, sample_rate, channels),
            Err(e) => {
                tracing::warn!("Rejected {:?} buffer: {}", format, e);
                Err(e)
            }
        };
        *self.pcm_scratch.lock() = scratch;
        result
    }

    fn emit(&self, snapshot: &Arc<AudioMetricsSnapshot>) {
        self.latest.store(Some(Arc::clone(snapshot)));
        self.amplitude.store(snapshot);

        let callbacks = self.callbacks.read().clone();
        for callback in &callbacks {
            callback(snapshot);
        }

        self.subscribers
            .lock()
            .retain(|tx| match tx.try_send(Arc::clone(snapshot)) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    self.dropped.increment();
                    true
                }
                Err(TrySendError::Disconnected(_)) => false,
            });
    }

    fn clear_outputs(&self) {
        self.latest.store(None);
        self.amplitude.clear();
    }

    /// Register a callback for every future snapshot.
    ///
    /// Runs synchronously on the producer thread; it must return quickly.
    /// No manager lock is held while it runs, so it may push audio or
    /// register further callbacks. Those take effect from the next snapshot.
    pub fn on_snapshot<F>(&self, callback: F)
    where
        F: Fn(&Arc<AudioMetricsSnapshot>) + Send + Sync + 'static,
    {
        self.callbacks.write().push(Arc::new(callback));
    }

    /// Bounded channel of future snapshots.
    ///
    /// When the receiver falls behind, new snapshots are dropped for it
    /// rather than blocking the producer. Dropping the receiver unsubscribes.
    pub fn subscribe(&self, capacity: usize) -> Receiver<Arc<AudioMetricsSnapshot>> {
        let (tx, rx) = crossbeam_channel::bounded(capacity.max(1));
        self.subscribers.lock().push(tx);
        rx
    }

    /// Most recent snapshot of the running session.
    pub fn latest(&self) -> Option<Arc<AudioMetricsSnapshot>> {
        self.latest.load_full()
    }

    pub fn basic_levels(&self) -> Option<BasicLevels> {
        self.latest.load().as_deref().map(BasicLevels::from)
    }

    /// Returns (rms_left, rms_right, peak_hold_left, peak_hold_right), lock-free.
    pub fn levels(&self) -> (f32, f32, f32, f32) {
        self.amplitude.get()
    }

    /// The atomic level store, for pollers that keep their own handle.
    pub fn amplitude_atomic(&self) -> &Arc<AtomicAmplitude> {
        &self.amplitude
    }

    /// Current loudness of the running session.
    pub fn loudness(&self) -> Option<LoudnessReading> {
        self.session.lock().as_ref().map(|s| s.loudness())
    }

    /// Restart Integrated loudness and LRA, keeping everything else.
    pub fn reset_loudness(&self) {
        if let Some(session) = self.session.lock().as_mut() {
            session.reset_loudness();
            tracing::info!("Integrated loudness reset");
        }
    }

    /// Snapshots not delivered because a subscriber queue was full.
    pub fn dropped_snapshots(&self) -> u64 {
        self.dropped.get()
    }
}
