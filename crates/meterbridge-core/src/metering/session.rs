//! Session state and the shared per-chunk pipeline.

use std::time::Instant;

use meterbridge_analysis::loudness::{plr_db, psr_db};
use meterbridge_analysis::{
    LoudnessMeter, LoudnessReading, SpectrumAccumulator, SpectrumAnalyzer, SpectrumMetrics,
    StereoAccumulator,
};

use super::frame::{sanitize, stereo_pair, ChannelState};
use super::snapshot::{AudioMetricsSnapshot, LoudnessMetrics};
use crate::config::validate_sample_rate;
use crate::{Error, MeterConfig, Result};

/// Check a chunk's shape and return the number of interleaved values it uses.
pub(crate) fn validate_chunk(len: usize, frames: usize, channels: usize) -> Result<usize> {
    if channels == 0 {
        return Err(Error::InvalidChannelCount(channels));
    }
    let expected = frames.checked_mul(channels).ok_or(Error::BufferTooShort {
        expected: usize::MAX,
        actual: len,
    })?;
    if len < expected {
        return Err(Error::BufferTooShort {
            expected,
            actual: len,
        });
    }
    Ok(expected)
}

/// All mutable state of one metering session.
///
/// Created for a fixed sample rate and mutated by every chunk. Sessions are
/// independent values; the manager wraps one in a mutex, tests can drive
/// several side by side.
#[derive(Debug)]
pub struct MeteringSession {
    config: MeterConfig,
    sample_rate: u32,
    left: ChannelState,
    right: ChannelState,
    stereo: StereoAccumulator,
    spectrum_input: SpectrumAccumulator,
    analyzer: SpectrumAnalyzer,
    spectrum: SpectrumMetrics,
    loudness: LoudnessMeter,
    true_peak_clips: u64,
    sample_clips: u64,
    sequence: u64,
    stream_time: f64,
    last_update: Option<Instant>,
}

impl MeteringSession {
    pub fn new(sample_rate: u32, config: MeterConfig) -> Result<Self> {
        validate_sample_rate(sample_rate)?;
        config.validate()?;

        Ok(Self {
            left: ChannelState::new(sample_rate, &config),
            right: ChannelState::new(sample_rate, &config),
            stereo: StereoAccumulator::new(),
            spectrum_input: SpectrumAccumulator::new(config.fft_size),
            analyzer: SpectrumAnalyzer::new(config.fft_size),
            spectrum: SpectrumMetrics::silent(config.fft_size),
            loudness: LoudnessMeter::with_history(config.lra_history_secs),
            true_peak_clips: 0,
            sample_clips: 0,
            sequence: 0,
            stream_time: 0.0,
            last_update: None,
            sample_rate,
            config,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn config(&self) -> &MeterConfig {
        &self.config
    }

    /// Chunks processed so far.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Audio seconds processed so far.
    pub fn stream_time(&self) -> f64 {
        self.stream_time
    }

    pub fn loudness(&self) -> LoudnessReading {
        self.loudness.reading()
    }

    /// Restart Integrated loudness and LRA without touching anything else.
    pub fn reset_loudness(&mut self) {
        self.loudness.reset_integration();
    }

    /// Process one interleaved chunk, timing peak-hold decay by the wall clock.
    pub fn process_chunk(
        &mut self,
        samples: &[f32],
        frames: usize,
        channels: usize,
    ) -> Result<Option<AudioMetricsSnapshot>> {
        let now = Instant::now();
        let elapsed = self
            .last_update
            .map(|last| now.saturating_duration_since(last).as_secs_f32())
            .unwrap_or(0.0);

        let snapshot = self.process_chunk_with_elapsed(samples, frames, channels, elapsed)?;
        if snapshot.is_some() {
            self.last_update = Some(now);
        }
        Ok(snapshot)
    }

    /// Process one interleaved chunk with an explicit peak-hold time step.
    ///
    /// Input is validated before any state changes. A chunk of zero frames
    /// is a no-op and yields `None`.
    pub fn process_chunk_with_elapsed(
        &mut self,
        samples: &[f32],
        frames: usize,
        channels: usize,
        elapsed_secs: f32,
    ) -> Result<Option<AudioMetricsSnapshot>> {
        let expected = validate_chunk(samples.len(), frames, channels)?;
        if frames == 0 {
            return Ok(None);
        }

        let mut replaced = 0usize;
        for frame in samples[..expected].chunks_exact(channels) {
            let (l, r) = stereo_pair(frame);
            let l = sanitize(l, &mut replaced);
            let r = sanitize(r, &mut replaced);
            self.process_frame(l, r);
        }
        if replaced > 0 {
            tracing::debug!(
                "Replaced {} non-finite samples in a {}-frame chunk",
                replaced,
                frames
            );
        }

        Ok(Some(self.finish_chunk(frames, elapsed_secs)))
    }

    #[inline]
    fn process_frame(&mut self, l: f32, r: f32) {
        self.stereo.push(l, r);
        self.left.push(l);
        self.right.push(r);

        if self.spectrum_input.push(0.5 * (l + r)) {
            self.spectrum = self
                .analyzer
                .analyze(self.spectrum_input.windowed(), self.sample_rate);
            self.spectrum_input.clear();
        }
    }

    fn finish_chunk(&mut self, frames: usize, elapsed_secs: f32) -> AudioMetricsSnapshot {
        let stats = self.stereo.finish();

        let max_rms = stats.max_rms();
        let is_silent = max_rms <= 0.0 || 20.0 * max_rms.log10() < self.config.silence_threshold_db;

        if self.left.true_peak().max(self.right.true_peak()) >= 1.0 {
            self.true_peak_clips += 1;
        }
        self.sample_clips += stats.clipped_samples;

        let left = self.left.finish_block(stats.left, elapsed_secs, is_silent);
        let right = self.right.finish_block(stats.right, elapsed_secs, is_silent);

        // K-weighted mean square, averaged over both channels.
        let k_sum = self.left.take_k_sum_sq() + self.right.take_k_sum_sq();
        let mean_square = 0.5 * k_sum / frames as f64;
        let duration = frames as f64 / self.sample_rate as f64;
        let reading = self.loudness.push(mean_square, duration);

        let max_dbtp = left.true_peak_dbtp.max(right.true_peak_dbtp) as f64;
        let loudness = LoudnessMetrics::from_reading(
            reading,
            psr_db(stats.max_peak(), reading.short_term_lufs),
            plr_db(max_dbtp, reading.short_term_lufs),
        );

        self.sequence += 1;
        self.stream_time += duration;

        AudioMetricsSnapshot {
            sample_rate: self.sample_rate,
            fft_size: self.analyzer.fft_size(),
            frames,
            sequence: self.sequence,
            stream_time_secs: self.stream_time,
            left,
            right,
            correlation: stats.correlation,
            balance: stats.balance,
            width_db: stats.width_db,
            spectrum: self.spectrum.clone(),
            scope_left: self.left.scope(),
            scope_right: self.right.scope(),
            is_silent,
            true_peak_clips: self.true_peak_clips,
            sample_clips: self.sample_clips,
            loudness,
        }
    }
}
