//! Test helpers and fixtures for meterbridge integration tests
//!
//! Deterministic signal generators plus a few engine shortcuts. Every
//! generator is pure so the same call always produces the same buffer.
//!
//! ## Tolerance Levels
//!
//! Use the appropriate tolerance from [`tolerances`] module:
//! - `FLOAT_EPSILON` (1e-6): Exact operations (constant signals)
//! - `LEVEL_EPSILON` (1e-3): Linear levels after accumulation
//! - `LOUDNESS_TOLERANCE_LU` (1.0): Absolute loudness targets
//! - `CHUNKING_TOLERANCE_LU` (0.1): Same audio, different chunking

#![allow(dead_code)]

pub mod tolerances;

use meterbridge::prelude::*;
use std::sync::Arc;

/// Default test sample rate (matches common hardware)
pub const TEST_SAMPLE_RATE: u32 = 48000;

/// Standard chunk size for deterministic testing
pub const TEST_CHUNK_FRAMES: usize = 512;

/// Create a test engine with the default configuration.
pub fn test_engine() -> MeterEngine {
    MeterEngine::builder()
        .build()
        .expect("Failed to create test engine")
}

/// Create a test engine with a specific FFT size.
pub fn test_engine_with_fft(fft_size: usize) -> MeterEngine {
    MeterEngine::builder()
        .fft_size(fft_size)
        .build()
        .expect("Failed to create test engine")
}

/// Generate a test signal: sine wave at given frequency and peak amplitude.
pub fn generate_sine(
    frequency: f64,
    amplitude: f64,
    sample_rate: u32,
    num_samples: usize,
) -> Vec<f32> {
    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            (amplitude * (2.0 * std::f64::consts::PI * frequency * t).sin()) as f32
        })
        .collect()
}

/// Sine whose RMS is `rms_dbfs` (peak is 3.01 dB higher).
pub fn generate_sine_rms_db(
    frequency: f64,
    rms_dbfs: f64,
    sample_rate: u32,
    num_samples: usize,
) -> Vec<f32> {
    let amplitude = 10f64.powf(rms_dbfs / 20.0) * std::f64::consts::SQRT_2;
    generate_sine(frequency, amplitude, sample_rate, num_samples)
}

/// Square wave alternating between `+amplitude` and `-amplitude`.
pub fn generate_square(
    frequency: f64,
    amplitude: f32,
    sample_rate: u32,
    num_samples: usize,
) -> Vec<f32> {
    let period = sample_rate as f64 / frequency;
    (0..num_samples)
        .map(|i| {
            if (i as f64 % period) < period / 2.0 {
                amplitude
            } else {
                -amplitude
            }
        })
        .collect()
}

/// Generate silence (zero samples).
pub fn generate_silence(num_samples: usize) -> Vec<f32> {
    vec![0.0; num_samples]
}

/// Generate a DC offset signal (constant value).
pub fn generate_dc(value: f32, num_samples: usize) -> Vec<f32> {
    vec![value; num_samples]
}

/// Generate white noise (random samples in -amplitude..amplitude).
pub fn generate_noise(num_samples: usize, amplitude: f32, seed: u64) -> Vec<f32> {
    // Simple LCG for reproducible "random" noise
    let mut rng = seed;
    (0..num_samples)
        .map(|_| {
            rng = rng.wrapping_mul(6364136223846793005).wrapping_add(1);
            (((rng >> 33) as f32 / (1u64 << 31) as f32) * 2.0 - 1.0) * amplitude
        })
        .collect()
}

/// Interleave two equally long channels into L R L R ...
pub fn interleave(left: &[f32], right: &[f32]) -> Vec<f32> {
    left.iter()
        .zip(right)
        .flat_map(|(&l, &r)| [l, r])
        .collect()
}

/// Same signal on both channels.
pub fn dual_mono(signal: &[f32]) -> Vec<f32> {
    interleave(signal, signal)
}

/// Push interleaved stereo through the engine in `chunk_frames` pieces and
/// return every snapshot produced.
pub fn push_chunked(
    engine: &MeterEngine,
    interleaved: &[f32],
    chunk_frames: usize,
    sample_rate: u32,
) -> Vec<Arc<AudioMetricsSnapshot>> {
    interleaved
        .chunks(chunk_frames * 2)
        .filter_map(|chunk| {
            engine
                .push_audio(chunk, chunk.len() / 2, sample_rate, 2)
                .expect("push_audio failed")
        })
        .collect()
}

/// Push the whole buffer as one chunk.
pub fn push_all(
    engine: &MeterEngine,
    interleaved: &[f32],
    sample_rate: u32,
) -> Arc<AudioMetricsSnapshot> {
    engine
        .push_audio(interleaved, interleaved.len() / 2, sample_rate, 2)
        .expect("push_audio failed")
        .expect("non-empty chunk produces a snapshot")
}

/// Calculate RMS of a signal.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|&s| s as f64 * s as f64).sum();
    (sum_sq / samples.len() as f64).sqrt() as f32
}

/// Calculate peak amplitude of a signal.
pub fn peak(samples: &[f32]) -> f32 {
    samples
        .iter()
        .map(|s| s.abs())
        .fold(0.0_f32, |a, b| a.max(b))
}

/// Assert that every dB field of a snapshot respects its clamp range.
pub fn assert_snapshot_bounds(snapshot: &AudioMetricsSnapshot) {
    for ch in [&snapshot.left, &snapshot.right] {
        assert!(ch.rms >= 0.0 && ch.peak >= 0.0 && ch.peak_hold >= 0.0);
        for db in [ch.rms_db, ch.peak_db, ch.peak_hold_db] {
            assert!((-120.0..=0.0).contains(&db), "level {} out of range", db);
        }
        assert!(ch.true_peak_dbtp >= -120.0);
        assert!((0.0..=24.0).contains(&ch.crest_db));
        assert!(ch.dc_offset.is_finite());
    }
    assert!((-1.0..=1.0).contains(&snapshot.correlation));
    assert!((-1.0..=1.0).contains(&snapshot.balance));
    assert!((-30.0..=30.0).contains(&snapshot.width_db));
    assert_eq!(
        snapshot.spectrum.magnitudes_db.len(),
        snapshot.fft_size / 2 + 1
    );
    assert!(snapshot
        .spectrum
        .magnitudes_db
        .iter()
        .all(|db| (-120.0..=0.0).contains(db)));
    assert!(snapshot.loudness.range_lu >= 0.0);
}
