//! Metering integration tests
//!
//! Known signals in, known measurements out: levels, stereo image,
//! spectrum, clip counting and loudness.

use crate::helpers::tolerances::*;
use crate::helpers::*;
use approx::assert_abs_diff_eq;
use meterbridge::prelude::*;

/// Sine levels: RMS = A/sqrt(2), peak = A, crest = 3.01 dB.
#[test]
fn test_sine_levels() {
    let engine = test_engine();
    let amp = 0.5;
    let signal = generate_sine(1000.0, amp, TEST_SAMPLE_RATE, 4800);
    let snapshot = push_all(&engine, &dual_mono(&signal), TEST_SAMPLE_RATE);

    assert_abs_diff_eq!(snapshot.left.rms, rms(&signal), epsilon = LEVEL_EPSILON);
    assert_abs_diff_eq!(snapshot.left.peak, peak(&signal), epsilon = FLOAT_EPSILON);
    assert_abs_diff_eq!(
        snapshot.left.rms_db,
        20.0 * (amp as f32 / std::f32::consts::SQRT_2).log10(),
        epsilon = DB_EPSILON
    );
    assert_abs_diff_eq!(snapshot.left.crest_db, 3.01, epsilon = DB_EPSILON);
    assert!(snapshot.left.peak_hold >= snapshot.left.peak - FLOAT_EPSILON);
    assert!(!snapshot.is_silent);
    assert_snapshot_bounds(&snapshot);
}

/// Identical channels: correlation 1, balance 0, width at its floor.
#[test]
fn test_identical_channels() {
    let engine = test_engine();
    let signal = generate_noise(4800, 0.5, 7);
    let snapshot = push_all(&engine, &dual_mono(&signal), TEST_SAMPLE_RATE);

    assert_abs_diff_eq!(snapshot.correlation, 1.0, epsilon = 1e-4);
    assert_eq!(snapshot.balance, 0.0);
    assert_eq!(snapshot.width_db, -30.0);
}

/// Inverted right channel: correlation -1, pure side.
#[test]
fn test_anti_phase() {
    let engine = test_engine();
    let left = generate_sine(440.0, 0.5, TEST_SAMPLE_RATE, 4800);
    let right: Vec<f32> = left.iter().map(|x| -x).collect();
    let snapshot = push_all(&engine, &interleave(&left, &right), TEST_SAMPLE_RATE);

    assert_abs_diff_eq!(snapshot.correlation, -1.0, epsilon = 1e-4);
    assert_eq!(snapshot.width_db, 30.0);
    assert_abs_diff_eq!(snapshot.balance, 0.0, epsilon = 1e-4);
}

/// Hard-panned signals push balance to the extremes.
#[test]
fn test_balance_extremes() {
    let engine = test_engine();
    let signal = generate_sine(440.0, 0.5, TEST_SAMPLE_RATE, 4800);
    let silence = generate_silence(4800);

    let right_only = push_all(&engine, &interleave(&silence, &signal), TEST_SAMPLE_RATE);
    assert_abs_diff_eq!(right_only.balance, 1.0, epsilon = 1e-6);
    assert_eq!(right_only.correlation, 0.0);

    let left_only = push_all(&engine, &interleave(&signal, &silence), TEST_SAMPLE_RATE);
    assert_abs_diff_eq!(left_only.balance, -1.0, epsilon = 1e-6);
}

/// Uncorrelated noise sits between mono and pure side.
#[test]
fn test_uncorrelated_noise_width() {
    let engine = test_engine();
    let left = generate_noise(48000, 0.5, 1);
    let right = generate_noise(48000, 0.5, 0x9E37_79B9_7F4A_7C15);
    let snapshot = push_all(&engine, &interleave(&left, &right), TEST_SAMPLE_RATE);

    assert!(snapshot.correlation.abs() < 0.1, "corr {}", snapshot.correlation);
    assert!(snapshot.width_db.abs() < 1.0, "width {}", snapshot.width_db);
}

/// A constant offset shows up in the DC estimate.
#[test]
fn test_dc_offset_tracks() {
    let engine = test_engine();
    let snapshot = push_all(
        &engine,
        &dual_mono(&generate_dc(0.25, 3 * TEST_SAMPLE_RATE as usize)),
        TEST_SAMPLE_RATE,
    );
    assert_abs_diff_eq!(snapshot.left.dc_offset, 0.25, epsilon = 0.002);
    assert_abs_diff_eq!(snapshot.right.dc_offset, 0.25, epsilon = 0.002);
}

/// Dominant frequency lands within one bin of the synthesized sine.
#[test]
fn test_dominant_frequency() {
    for &(freq, fft_size) in &[(1000.0, 1024), (440.0, 4096), (5000.0, 2048)] {
        let engine = test_engine_with_fft(fft_size);
        let signal = generate_sine(freq, 0.5, TEST_SAMPLE_RATE, fft_size * 3);
        let snapshot = push_all(&engine, &dual_mono(&signal), TEST_SAMPLE_RATE);

        let bin_hz = TEST_SAMPLE_RATE as f32 / fft_size as f32;
        assert!(
            (snapshot.spectrum.dominant_hz - freq as f32).abs() <= bin_hz,
            "{} Hz read as {} Hz (bin {} Hz)",
            freq,
            snapshot.spectrum.dominant_hz,
            bin_hz
        );
        // Hann leakage outside the dominant three bins caps SNR near 17 dB.
        assert!(snapshot.spectrum.snr_db > 10.0);
        assert!(snapshot.spectrum.enob_bits.is_finite());
    }
}

/// A bin-centred sine reads its RMS level in dBFS.
#[test]
fn test_spectrum_amplitude_calibration() {
    let fft_size = 1024;
    let bin = 32;
    let freq = bin as f64 * TEST_SAMPLE_RATE as f64 / fft_size as f64;
    let engine = test_engine_with_fft(fft_size);
    let signal = generate_sine(freq, 0.5, TEST_SAMPLE_RATE, fft_size * 2);
    let snapshot = push_all(&engine, &dual_mono(&signal), TEST_SAMPLE_RATE);

    let expected = 20.0 * (0.5f32 / std::f32::consts::SQRT_2).log10();
    assert_abs_diff_eq!(
        snapshot.spectrum.magnitudes_db[bin],
        expected,
        epsilon = 0.2
    );
    assert!(snapshot.spectrum.noise_floor_db < expected - 40.0);
}

/// Until the FFT buffer fills, the spectrum is the silent placeholder.
#[test]
fn test_spectrum_before_first_analysis() {
    let engine = test_engine_with_fft(4096);
    let signal = generate_sine(1000.0, 0.5, TEST_SAMPLE_RATE, 1024);
    let snapshot = push_all(&engine, &dual_mono(&signal), TEST_SAMPLE_RATE);

    assert_eq!(snapshot.spectrum.magnitudes_db.len(), 2049);
    assert!(snapshot.spectrum.magnitudes_db.iter().all(|&v| v == -120.0));
    assert!(snapshot.spectrum.snr_db.is_nan());
    assert!(snapshot.spectrum.enob_bits.is_nan());
}

/// Full-scale square wave: sample clips counted, true peak at or above 0 dBTP.
#[test]
fn test_square_wave_clips() {
    let engine = test_engine();
    let square = generate_square(1000.0, 1.0, TEST_SAMPLE_RATE, 4800);
    let snapshot = push_all(&engine, &dual_mono(&square), TEST_SAMPLE_RATE);

    assert_eq!(snapshot.sample_clips, 2 * 4800);
    assert!(snapshot.true_peak_clips >= 1);
    assert!(snapshot.max_true_peak_dbtp() >= -0.01);
    assert_eq!(snapshot.left.peak_db, 0.0);
}

/// Clip counters never decrease over a session.
#[test]
fn test_clip_counters_monotone() {
    let engine = test_engine();
    let loud = dual_mono(&generate_square(500.0, 1.0, TEST_SAMPLE_RATE, 480));
    let quiet = dual_mono(&generate_sine(500.0, 0.1, TEST_SAMPLE_RATE, 480));

    let mut last = (0u64, 0u64);
    for i in 0..20 {
        let chunk = if i % 3 == 0 { &loud } else { &quiet };
        let s = push_all(&engine, chunk, TEST_SAMPLE_RATE);
        assert!(s.sample_clips >= last.0 && s.true_peak_clips >= last.1);
        last = (s.sample_clips, s.true_peak_clips);
    }
    assert!(last.0 > 0);
}

/// Oscilloscope rings keep their length and put the newest sample first.
#[test]
fn test_scope_most_recent_first() {
    let engine = MeterEngine::builder()
        .scope_length(8)
        .scope_decimation(1)
        .build()
        .unwrap();
    let ramp: Vec<f32> = (0..16).map(|i| i as f32 / 100.0).collect();
    let snapshot = push_all(&engine, &dual_mono(&ramp), TEST_SAMPLE_RATE);

    assert_eq!(snapshot.scope_left.len(), 8);
    assert_abs_diff_eq!(snapshot.scope_left[0], 0.15, epsilon = FLOAT_EPSILON);
    assert_abs_diff_eq!(snapshot.scope_left[7], 0.08, epsilon = FLOAT_EPSILON);
    assert_eq!(snapshot.scope_left, snapshot.scope_right);
}

/// Peak hold decays once the signal drops away.
#[test]
fn test_peak_hold_decays_after_loud_burst() {
    let engine = test_engine();
    let loud = dual_mono(&generate_sine(1000.0, 0.9, TEST_SAMPLE_RATE, 4800));
    let first = push_all(&engine, &loud, TEST_SAMPLE_RATE);
    let held = first.left.peak_hold;

    std::thread::sleep(std::time::Duration::from_millis(200));
    let quiet = dual_mono(&generate_silence(480));
    let after = push_all(&engine, &quiet, TEST_SAMPLE_RATE);

    assert!(after.left.peak_hold < held);
    assert!(after.left.peak_hold > 0.0);
}

/// Loudness windows report -inf until they have enough audio.
#[test]
fn test_loudness_warmup() {
    let engine = test_engine();
    let chunk = dual_mono(&generate_sine(1000.0, 0.5, TEST_SAMPLE_RATE, 2400));

    // 50 ms: below the 100 ms minimum.
    let s = push_all(&engine, &chunk, TEST_SAMPLE_RATE);
    assert_eq!(s.loudness.momentary_lufs, f64::NEG_INFINITY);
    assert_eq!(s.loudness.short_term_lufs, f64::NEG_INFINITY);
    assert_eq!(s.loudness.integrated_lufs, f64::NEG_INFINITY);
    assert!(s.loudness.psr_db.is_nan());
    assert!(s.loudness.plr_db.is_nan());

    // 150 ms: Momentary and Short-term available, no 400 ms block yet.
    push_all(&engine, &chunk, TEST_SAMPLE_RATE);
    let s = push_all(&engine, &chunk, TEST_SAMPLE_RATE);
    assert!(s.loudness.momentary_lufs.is_finite());
    assert!(s.loudness.short_term_lufs.is_finite());
    assert_eq!(s.loudness.integrated_lufs, f64::NEG_INFINITY);
}

/// 1 kHz sine at -20 dBFS RMS integrates to -20 LUFS.
#[test]
fn test_integrated_calibration() {
    let engine = test_engine();
    let signal = generate_sine_rms_db(1000.0, -20.0, TEST_SAMPLE_RATE, 10 * TEST_SAMPLE_RATE as usize);
    let snapshots = push_chunked(&engine, &dual_mono(&signal), 4800, TEST_SAMPLE_RATE);
    let last = snapshots.last().unwrap();

    assert_abs_diff_eq!(
        last.loudness.integrated_lufs,
        -20.0,
        epsilon = LOUDNESS_TOLERANCE_LU
    );
    assert_abs_diff_eq!(
        last.loudness.short_term_lufs,
        -20.0,
        epsilon = LOUDNESS_TOLERANCE_LU
    );
    assert_abs_diff_eq!(
        last.loudness.momentary_lufs,
        -20.0,
        epsilon = LOUDNESS_TOLERANCE_LU
    );
}

/// Audio below the absolute gate never produces an Integrated value.
#[test]
fn test_absolute_gate() {
    let engine = test_engine();
    let signal = generate_sine_rms_db(1000.0, -80.0, TEST_SAMPLE_RATE, 2 * TEST_SAMPLE_RATE as usize);
    let snapshots = push_chunked(&engine, &dual_mono(&signal), 4800, TEST_SAMPLE_RATE);
    let last = snapshots.last().unwrap();

    assert!(last.loudness.momentary_lufs.is_finite());
    assert_eq!(last.loudness.integrated_lufs, f64::NEG_INFINITY);
}

/// PSR and PLR of a steady sine: about 3 dB, PLR never below PSR.
#[test]
fn test_psr_plr_sine() {
    let engine = test_engine();
    let signal = generate_sine(1000.0, 0.5, TEST_SAMPLE_RATE, 4 * TEST_SAMPLE_RATE as usize);
    let snapshots = push_chunked(&engine, &dual_mono(&signal), 4800, TEST_SAMPLE_RATE);
    let last = snapshots.last().unwrap();

    let psr = last.loudness.psr_db;
    let plr = last.loudness.plr_db;
    assert!((2.0..4.5).contains(&psr), "psr {}", psr);
    assert!(plr >= psr - 0.05, "plr {} psr {}", plr, psr);
}

/// LRA stays 0 with fewer than five Short-term values.
#[test]
fn test_lra_needs_five_values() {
    let engine = test_engine();
    let chunk = dual_mono(&generate_sine(1000.0, 0.5, TEST_SAMPLE_RATE, 4800));

    // Four 100 ms chunks: at most four recorded values.
    for _ in 0..4 {
        let s = push_all(&engine, &chunk, TEST_SAMPLE_RATE);
        assert_eq!(s.loudness.range_lu, 0.0);
    }
}

/// Alternating loud and quiet sections give a positive range.
#[test]
fn test_lra_dynamic_programme() {
    let engine = test_engine();
    let loud = dual_mono(&generate_sine_rms_db(1000.0, -14.0, TEST_SAMPLE_RATE, 4800));
    let quiet = dual_mono(&generate_sine_rms_db(1000.0, -30.0, TEST_SAMPLE_RATE, 4800));

    let mut last = None;
    for section in 0..6 {
        let chunk = if section % 2 == 0 { &loud } else { &quiet };
        // 5 s per section.
        for _ in 0..50 {
            last = Some(push_all(&engine, chunk, TEST_SAMPLE_RATE));
        }
    }
    let range = last.unwrap().loudness.range_lu;
    assert!(range > 5.0, "range {}", range);
}

/// Resetting loudness restarts Integrated but keeps the session.
#[test]
fn test_reset_loudness_keeps_session() {
    let engine = test_engine();
    let chunk = dual_mono(&generate_sine(1000.0, 0.5, TEST_SAMPLE_RATE, 4800));
    for _ in 0..10 {
        push_all(&engine, &chunk, TEST_SAMPLE_RATE);
    }
    engine.metering().reset_loudness();

    let s = push_all(&engine, &chunk, TEST_SAMPLE_RATE);
    assert_eq!(s.sequence, 11);
    assert_eq!(s.loudness.integrated_lufs, f64::NEG_INFINITY);
    assert!(s.loudness.short_term_lufs.is_finite());
}

/// Non-finite input never reaches the snapshot.
#[test]
fn test_non_finite_input_sanitized() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
    let engine = test_engine();
    let mut chunk = dual_mono(&generate_sine(1000.0, 0.5, TEST_SAMPLE_RATE, 4800));
    chunk[100] = f32::NAN;
    chunk[501] = f32::NEG_INFINITY;
    chunk[2000] = f32::INFINITY;
    let s = push_all(&engine, &chunk, TEST_SAMPLE_RATE);

    assert_snapshot_bounds(&s);
    assert!(s.left.rms.is_finite() && s.right.rms.is_finite());
    assert!(s.loudness.momentary_lufs.is_finite());
    assert!(s.spectrum.magnitudes_db.iter().all(|v| v.is_finite()));
}

/// Basic levels mirror the full snapshot.
#[test]
fn test_basic_levels_projection() {
    let engine = test_engine();
    let left = generate_sine(1000.0, 0.5, TEST_SAMPLE_RATE, 2048);
    let right = generate_sine(1000.0, 0.25, TEST_SAMPLE_RATE, 2048);
    let snapshot = push_all(&engine, &interleave(&left, &right), TEST_SAMPLE_RATE);
    let basic = engine.basic_levels().unwrap();

    assert_eq!(basic.rms_left, snapshot.left.rms);
    assert_eq!(basic.rms_right, snapshot.right.rms);
    assert_eq!(basic.peak_hold_left, snapshot.left.peak_hold);
    assert_eq!(basic.peak_hold_right, snapshot.right.peak_hold);
    assert_eq!(basic.spectrum_db, snapshot.spectrum.magnitudes_db);
    assert_eq!(
        engine.levels(),
        (
            snapshot.left.rms,
            snapshot.right.rms,
            snapshot.left.peak_hold,
            snapshot.right.peak_hold
        )
    );
}
