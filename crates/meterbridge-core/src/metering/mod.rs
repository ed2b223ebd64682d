//! Audio metering.
//!
//! - [`MeteringSession`]: explicit per-session state and the shared chunk pipeline
//! - [`MeteringManager`]: session lifecycle, locking and snapshot delivery
//! - [`AudioMetricsSnapshot`]: the immutable per-chunk result
//! - [`SampleFormat`]: raw PCM decoding for byte-buffer producers

mod amplitude;
mod frame;
mod handle;
mod ingest;
mod manager;
mod session;
mod snapshot;

pub use amplitude::AtomicAmplitude;
pub use handle::MeteringHandle;
pub use ingest::{decode_pcm, decode_pcm_into, SampleFormat};
pub use manager::{MeteringManager, SnapshotCallback};
pub use session::MeteringSession;
pub use snapshot::{AudioMetricsSnapshot, BasicLevels, ChannelMetrics, LoudnessMetrics};
