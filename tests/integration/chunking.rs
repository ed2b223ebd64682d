//! Chunk-size invariance tests
//!
//! The pipeline carries all state across chunks, so the same audio pushed
//! in one piece or in many small pieces must meter the same.

use crate::helpers::tolerances::*;
use crate::helpers::*;
use approx::assert_abs_diff_eq;

fn programme(seconds: usize) -> Vec<f32> {
    let n = seconds * TEST_SAMPLE_RATE as usize;
    let left = generate_sine(1000.0, 0.4, TEST_SAMPLE_RATE, n);
    let right: Vec<f32> = generate_sine(1000.0, 0.3, TEST_SAMPLE_RATE, n)
        .iter()
        .zip(generate_noise(n, 0.05, 3))
        .map(|(s, w)| s + w)
        .collect();
    interleave(&left, &right)
}

/// One big push and many small pushes reach the same loudness.
#[test]
fn test_loudness_chunking_invariance() {
    let audio = programme(5);

    let whole = test_engine();
    let single = push_all(&whole, &audio, TEST_SAMPLE_RATE);

    for chunk_frames in [64, 441, 1024, 4800] {
        let split = test_engine();
        let snapshots = push_chunked(&split, &audio, chunk_frames, TEST_SAMPLE_RATE);
        let last = snapshots.last().unwrap();

        assert_abs_diff_eq!(
            last.loudness.integrated_lufs,
            single.loudness.integrated_lufs,
            epsilon = CHUNKING_TOLERANCE_LU
        );
        assert_abs_diff_eq!(
            last.loudness.short_term_lufs,
            single.loudness.short_term_lufs,
            epsilon = CHUNKING_TOLERANCE_LU
        );
        assert_abs_diff_eq!(
            last.loudness.momentary_lufs,
            single.loudness.momentary_lufs,
            epsilon = CHUNKING_TOLERANCE_LU
        );
        assert_abs_diff_eq!(
            last.stream_time_secs,
            single.stream_time_secs,
            epsilon = 1e-9
        );
    }
}

/// The spectrum depends only on the samples, not on chunk boundaries.
#[test]
fn test_spectrum_chunking_invariance() {
    let audio = programme(1);

    let whole = test_engine();
    let single = push_all(&whole, &audio, TEST_SAMPLE_RATE);

    for chunk_frames in [100, 512, 1000, 3000] {
        let split = test_engine();
        let snapshots = push_chunked(&split, &audio, chunk_frames, TEST_SAMPLE_RATE);
        let last = snapshots.last().unwrap();

        assert_eq!(last.spectrum.bin_count(), single.spectrum.bin_count());
        for (a, b) in last
            .spectrum
            .magnitudes_db
            .iter()
            .zip(&single.spectrum.magnitudes_db)
        {
            assert_abs_diff_eq!(*a, *b, epsilon = SPECTRUM_EPSILON_DB);
        }
        assert_abs_diff_eq!(
            last.spectrum.dominant_hz,
            single.spectrum.dominant_hz,
            epsilon = 0.01
        );
    }
}

/// Per-chunk RMS of a steady signal does not depend on chunk length.
#[test]
fn test_rms_chunking_invariance() {
    // Whole periods of 1 kHz at 48 kHz are 48 frames.
    let tone = generate_sine(1000.0, 0.5, TEST_SAMPLE_RATE, 48_000);
    let audio = dual_mono(&tone);

    let whole = test_engine();
    let single = push_all(&whole, &audio, TEST_SAMPLE_RATE);

    for chunk_frames in [48, 480, 4800] {
        let split = test_engine();
        let snapshots = push_chunked(&split, &audio, chunk_frames, TEST_SAMPLE_RATE);
        for s in &snapshots {
            assert_abs_diff_eq!(s.left.rms, single.left.rms, epsilon = LEVEL_EPSILON);
            assert_abs_diff_eq!(s.right.rms, single.right.rms, epsilon = LEVEL_EPSILON);
        }
        assert_eq!(snapshots.len(), 48_000 / chunk_frames);
    }
}

/// Clip totals add up the same way regardless of chunking.
#[test]
fn test_clip_totals_chunking_invariance() {
    let square = generate_square(250.0, 1.0, TEST_SAMPLE_RATE, 9600);
    let audio = dual_mono(&square);

    let whole = test_engine();
    let single = push_all(&whole, &audio, TEST_SAMPLE_RATE);

    let split = test_engine();
    let snapshots = push_chunked(&split, &audio, 333, TEST_SAMPLE_RATE);
    assert_eq!(
        snapshots.last().unwrap().sample_clips,
        single.sample_clips
    );
}
