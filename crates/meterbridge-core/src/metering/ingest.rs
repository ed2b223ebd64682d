//! Raw PCM decoding for capture byte buffers.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Interleaved sample encodings accepted by `push_pcm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleFormat {
    /// Unsigned 8-bit, 128 = silence
    U8,
    I16Le,
    /// Packed 3-byte little-endian
    I24Le,
    I32Le,
    F32Le,
}

impl SampleFormat {
    pub const fn bytes_per_sample(self) -> usize {
        match self {
            SampleFormat::U8 => 1,
            SampleFormat::I16Le => 2,
            SampleFormat::I24Le => 3,
            SampleFormat::I32Le | SampleFormat::F32Le => 4,
        }
    }

    #[inline]
    fn decode(self, b: &[u8]) -> f32 {
        match self {
            SampleFormat::U8 => (b[0] as f32 - 128.0) / 128.0,
            SampleFormat::I16Le => i16::from_le_bytes([b[0], b[1]]) as f32 / 32_768.0,
            SampleFormat::I24Le => {
                // Place the 24 bits in the top of an i32 so the shift sign-extends.
                let v = i32::from_le_bytes([0, b[0], b[1], b[2]]) >> 8;
                v as f32 / 8_388_608.0
            }
            SampleFormat::I32Le => {
                (i32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64 / 2_147_483_648.0) as f32
            }
            SampleFormat::F32Le => f32::from_le_bytes([b[0], b[1], b[2], b[3]]),
        }
    }
}

/// Decode `frames * channels` interleaved samples from `bytes` into `out`.
///
/// `out` is cleared first. Trailing bytes beyond the requested frames are
/// ignored.
pub fn decode_pcm_into(
    bytes: &[u8],
    format: SampleFormat,
    frames: usize,
    channels: usize,
    out: &mut Vec<f32>,
) -> Result<()> {
    if channels == 0 {
        return Err(Error::InvalidChannelCount(channels));
    }
    let samples = frames.saturating_mul(channels);
    let expected = samples.saturating_mul(format.bytes_per_sample());
    if bytes.len() < expected {
        return Err(Error::BufferTooShort {
            expected,
            actual: bytes.len(),
        });
    }

    out.clear();
    out.reserve(samples);
    out.extend(
        bytes[..expected]
            .chunks_exact(format.bytes_per_sample())
            .map(|b| format.decode(b)),
    );
    Ok(())
}

/// Allocating form of [`decode_pcm_into`].
pub fn decode_pcm(
    bytes: &[u8],
    format: SampleFormat,
    frames: usize,
    channels: usize,
) -> Result<Vec<f32>> {
    let mut out = Vec::new();
    decode_pcm_into(bytes, format, frames, channels, &mut out)?;
    Ok(out)
}
