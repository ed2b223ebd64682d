//! Decimated oscilloscope ring buffer.

/// Default ring length in samples.
pub const DEFAULT_SCOPE_LENGTH: usize = 1024;

/// Default decimation: keep every 4th frame.
pub const DEFAULT_SCOPE_DECIMATION: usize = 4;

/// Fixed-length ring that keeps every `decimation`-th sample.
///
/// The decimation counter persists across pushes, so chunk boundaries do not
/// shift which samples are kept.
#[derive(Debug, Clone)]
pub struct ScopeRing {
    buffer: Vec<f32>,
    write_pos: usize,
    filled: usize,
    decimation: usize,
    counter: usize,
}

impl Default for ScopeRing {
    fn default() -> Self {
        Self::new(DEFAULT_SCOPE_LENGTH, DEFAULT_SCOPE_DECIMATION)
    }
}

impl ScopeRing {
    /// Zero lengths and decimations are raised to 1.
    pub fn new(length: usize, decimation: usize) -> Self {
        Self {
            buffer: vec![0.0; length.max(1)],
            write_pos: 0,
            filled: 0,
            decimation: decimation.max(1),
            counter: 0,
        }
    }

    /// Offer one sample; it is stored only on decimation boundaries.
    #[inline]
    pub fn push(&mut self, sample: f32) {
        let keep = self.counter == 0;
        self.counter += 1;
        if self.counter >= self.decimation {
            self.counter = 0;
        }
        if !keep {
            return;
        }

        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
        if self.filled < self.buffer.len() {
            self.filled += 1;
        }
    }

    /// Ring contents, most recent first. Always `len()` long; slots not yet
    /// written read as 0.
    pub fn snapshot(&self) -> Vec<f32> {
        let len = self.buffer.len();
        (1..=len)
            .map(|back| self.buffer[(self.write_pos + len - back) % len])
            .collect()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// Number of slots written so far, capped at the ring length.
    pub fn filled(&self) -> usize {
        self.filled
    }

    pub fn decimation(&self) -> usize {
        self.decimation
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
        self.filled = 0;
        self.counter = 0;
    }
}
