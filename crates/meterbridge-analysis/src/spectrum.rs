//! FFT Spectrum Analysis
//!
//! Hann-windowed magnitude spectrum of the Mid signal with derived
//! features: dominant frequency (sub-bin refined), spectral centroid,
//! 95 % roll-off, percentile noise floor, SNR and ENOB.
//!
//! ## Amplitude scaling
//!
//! Bin magnitudes are divided by the coherent gain of the window (`Σw` for
//! DC/Nyquist, `Σw/2` for interior bins) and interior bins are further
//! divided by √2, so a full-scale sine centred on a bin reads about -3 dBFS
//! (its RMS level).

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::{percentile, DB_FLOOR, ENERGY_EPSILON};

/// Default FFT size for analysis
pub const DEFAULT_FFT_SIZE: usize = 1024;

pub const MIN_FFT_SIZE: usize = 64;
pub const MAX_FFT_SIZE: usize = 65536;

/// Cumulative energy fraction for the roll-off frequency.
const ROLLOFF_FRACTION: f64 = 0.95;

/// Percentile of bin levels taken as the noise floor.
const NOISE_FLOOR_PERCENTILE: f64 = 10.0;

/// Check that `size` is a power of two within the supported range.
pub fn is_valid_fft_size(size: usize) -> bool {
    size.is_power_of_two() && (MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&size)
}

/// Symmetric Hann window.
pub fn hann_window(size: usize) -> Vec<f32> {
    if size < 2 {
        return vec![1.0; size];
    }
    (0..size)
        .map(|i| {
            let angle = 2.0 * core::f64::consts::PI * i as f64 / (size - 1) as f64;
            (0.5 * (1.0 - angle.cos())) as f32
        })
        .collect()
}

/// Spectrum analysis results
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct SpectrumMetrics {
    /// Per-bin level in dBFS, DC..=Nyquist, each in [-120, 0]
    pub magnitudes_db: Vec<f32>,
    /// Strongest bin above DC, parabolically refined
    pub dominant_hz: f32,
    /// Energy-weighted mean frequency
    pub centroid_hz: f32,
    /// Lowest frequency holding 95 % of the energy below it
    pub rolloff_hz: f32,
    /// 10th percentile of bin levels outside DC, Nyquist and the dominant peak
    pub noise_floor_db: f32,
    /// Dominant peak energy over the remaining energy; NaN if either is zero
    pub snr_db: f32,
    /// `(SNR - 1.76) / 6.02`; NaN with SNR
    pub enob_bits: f32,
}

impl SpectrumMetrics {
    /// The reading reported before any analysis has completed.
    pub fn silent(fft_size: usize) -> Self {
        Self {
            magnitudes_db: vec![DB_FLOOR; fft_size / 2 + 1],
            dominant_hz: 0.0,
            centroid_hz: 0.0,
            rolloff_hz: 0.0,
            noise_floor_db: DB_FLOOR,
            snr_db: f32::NAN,
            enob_bits: f32::NAN,
        }
    }

    pub fn bin_count(&self) -> usize {
        self.magnitudes_db.len()
    }
}

/// Fixed-size FFT analyzer
pub struct SpectrumAnalyzer {
    fft_size: usize,
    fft: Arc<dyn Fft<f32>>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    /// Σw of the analysis window
    window_sum: f64,
    amplitudes: Vec<f64>,
}

impl std::fmt::Debug for SpectrumAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectrumAnalyzer")
            .field("fft_size", &self.fft_size)
            .finish()
    }
}

impl SpectrumAnalyzer {
    /// Create an analyzer. Sizes outside 64..=65536 are clamped and rounded
    /// up to the next power of two; see [`is_valid_fft_size`].
    pub fn new(fft_size: usize) -> Self {
        let fft_size = fft_size
            .clamp(MIN_FFT_SIZE, MAX_FFT_SIZE)
            .next_power_of_two();
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let scratch_len = fft.get_inplace_scratch_len();
        let window_sum = hann_window(fft_size).iter().map(|&w| w as f64).sum();

        Self {
            fft_size,
            fft,
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
            window_sum,
            amplitudes: vec![0.0; fft_size / 2 + 1],
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn bin_count(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Analyze one buffer of already-windowed samples.
    ///
    /// Short input is zero-padded; extra samples are ignored.
    pub fn analyze(&mut self, windowed: &[f32], sample_rate: u32) -> SpectrumMetrics {
        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let x = windowed.get(i).copied().unwrap_or(0.0);
            *slot = Complex::new(if x.is_finite() { x } else { 0.0 }, 0.0);
        }
        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        let n = self.fft_size;
        let nyquist = n / 2;
        let edge_gain = self.window_sum.max(ENERGY_EPSILON);
        let interior_gain =
            (self.window_sum * 0.5).max(ENERGY_EPSILON) * core::f64::consts::SQRT_2;

        let mut magnitudes_db = Vec::with_capacity(nyquist + 1);
        for k in 0..=nyquist {
            let c = self.buffer[k];
            let mag = ((c.re as f64).powi(2) + (c.im as f64).powi(2)).sqrt();
            let gain = if k == 0 || k == nyquist {
                edge_gain
            } else {
                interior_gain
            };
            let amp = mag / gain;
            self.amplitudes[k] = amp;
            magnitudes_db.push(amplitude_db(amp));
        }

        let bin_hz = sample_rate as f64 / n as f64;
        let total_energy: f64 = self.amplitudes.iter().map(|a| a * a).sum();
        if total_energy <= ENERGY_EPSILON {
            return SpectrumMetrics {
                magnitudes_db,
                ..SpectrumMetrics::silent(n)
            };
        }

        let dominant = self.dominant_bin();
        let delta = refine_peak(&self.amplitudes, dominant);
        let dominant_hz = ((dominant as f64 + delta) * bin_hz) as f32;

        let centroid_hz = self
            .amplitudes
            .iter()
            .enumerate()
            .map(|(k, a)| k as f64 * bin_hz * a * a)
            .sum::<f64>()
            / total_energy;

        let rolloff_hz = self.rolloff_bin(total_energy) as f64 * bin_hz;

        let near_peak = |k: usize| k.abs_diff(dominant) <= 1;

        let mut floor_bins: Vec<f64> = (1..nyquist)
            .filter(|&k| !near_peak(k))
            .map(|k| magnitudes_db[k] as f64)
            .collect();
        floor_bins.sort_by(|a, b| a.total_cmp(b));
        let noise_floor_db = if floor_bins.is_empty() {
            DB_FLOOR
        } else {
            percentile(&floor_bins, NOISE_FLOOR_PERCENTILE) as f32
        };

        let mut signal = 0.0;
        let mut noise = 0.0;
        for (k, a) in self.amplitudes.iter().enumerate().skip(1) {
            if near_peak(k) {
                signal += a * a;
            } else {
                noise += a * a;
            }
        }
        let (snr_db, enob_bits) = if signal > 0.0 && noise > 0.0 {
            let snr = 10.0 * (signal / noise).log10();
            (snr as f32, ((snr - 1.76) / 6.02) as f32)
        } else {
            (f32::NAN, f32::NAN)
        };

        SpectrumMetrics {
            magnitudes_db,
            dominant_hz,
            centroid_hz: centroid_hz as f32,
            rolloff_hz: rolloff_hz as f32,
            noise_floor_db,
            snr_db,
            enob_bits,
        }
    }

    fn dominant_bin(&self) -> usize {
        let mut best = 1;
        for k in 2..self.amplitudes.len() {
            if self.amplitudes[k] > self.amplitudes[best] {
                best = k;
            }
        }
        best
    }

    fn rolloff_bin(&self, total_energy: f64) -> usize {
        let target = total_energy * ROLLOFF_FRACTION;
        let mut cumulative = 0.0;
        for (k, a) in self.amplitudes.iter().enumerate() {
            cumulative += a * a;
            if cumulative >= target {
                return k;
            }
        }
        self.amplitudes.len() - 1
    }
}

/// Sub-bin offset of a peak from its linear neighbours, clamped to ±0.5.
fn refine_peak(amplitudes: &[f64], k: usize) -> f64 {
    if k == 0 || k + 1 >= amplitudes.len() {
        return 0.0;
    }
    let (a, b, c) = (amplitudes[k - 1], amplitudes[k], amplitudes[k + 1]);
    let denom = a - 2.0 * b + c;
    if denom.abs() <= ENERGY_EPSILON {
        return 0.0;
    }
    (0.5 * (a - c) / denom).clamp(-0.5, 0.5)
}

fn amplitude_db(amplitude: f64) -> f32 {
    if amplitude <= 0.0 || !amplitude.is_finite() {
        return DB_FLOOR;
    }
    ((20.0 * amplitude.log10()) as f32).clamp(DB_FLOOR, 0.0)
}

/// Collects Hann-windowed samples until a full FFT frame is available.
#[derive(Debug, Clone)]
pub struct SpectrumAccumulator {
    window: Vec<f32>,
    buffer: Vec<f32>,
}

impl SpectrumAccumulator {
    pub fn new(fft_size: usize) -> Self {
        Self {
            window: hann_window(fft_size),
            buffer: Vec::with_capacity(fft_size),
        }
    }

    /// Window and store one sample. Returns true once the frame is full.
    #[inline]
    pub fn push(&mut self, sample: f32) -> bool {
        if let Some(&w) = self.window.get(self.buffer.len()) {
            self.buffer.push(sample * w);
        }
        self.is_full()
    }

    pub fn is_full(&self) -> bool {
        self.buffer.len() >= self.window.len()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn windowed(&self) -> &[f32] {
        &self.buffer
    }

    /// Start a new frame.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
