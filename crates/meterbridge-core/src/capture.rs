//! CPAL capture adapter.
//!
//! Opens an input stream (or a loopback stream on an output device, where the
//! host supports it) and forwards every callback buffer to
//! [`MeteringManager::push_audio`]. No metering happens here.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};

use crate::compat::Arc;
use crate::metering::MeteringManager;
use crate::{Error, Result};

/// Which device to capture from.
#[derive(Debug, Clone, Default)]
pub struct CaptureConfig {
    /// Index into [`list_capture_devices`]; `None` picks the host default.
    pub device_index: Option<usize>,
    /// Capture what an output device is playing instead of an input.
    pub loopback: bool,
}

/// Wrapper to hold a `cpal::Stream` in a `Send` context.
///
/// `cpal::Stream` is `!Send` due to platform internals. The stream is only
/// stored and dropped, never used from another thread.
struct StreamHandle(#[allow(dead_code)] cpal::Stream);

// SAFETY: the wrapped stream is never accessed after construction; it is
// only kept alive and dropped together with the owning `CaptureStream`.
unsafe impl Send for StreamHandle {}

/// A running capture feeding a [`MeteringManager`].
///
/// Capture stops when this value is dropped.
pub struct CaptureStream {
    sample_rate: u32,
    channels: usize,
    device_name: String,
    _stream: StreamHandle,
}

impl CaptureStream {
    pub fn open(manager: Arc<MeteringManager>, config: CaptureConfig) -> Result<Self> {
        let device = get_device(config.device_index, config.loopback)?;
        let device_name = device.name()?;
        let supported = if config.loopback {
            device.default_output_config()?
        } else {
            device.default_input_config()?
        };

        let sample_format = supported.sample_format();
        let stream_config: cpal::StreamConfig = supported.into();
        let sample_rate = stream_config.sample_rate.0;
        let channels = stream_config.channels as usize;

        manager.start(sample_rate)?;

        let stream = match sample_format {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, manager)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, manager)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, manager)?,
            cpal::SampleFormat::I32 => build_stream::<i32>(&device, &stream_config, manager)?,
            cpal::SampleFormat::U8 => build_stream::<u8>(&device, &stream_config, manager)?,
            format => {
                return Err(Error::InvalidConfig(format!(
                    "Unsupported sample format: {:?}",
                    format
                )));
            }
        };
        stream.play()?;

        tracing::info!(
            "Capturing from {}{} at {} Hz, {} channels",
            device_name,
            if config.loopback { " (loopback)" } else { "" },
            sample_rate,
            channels
        );

        Ok(Self {
            sample_rate,
            channels,
            device_name,
            _stream: StreamHandle(stream),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

fn get_device(index: Option<usize>, loopback: bool) -> Result<cpal::Device> {
    let host = cpal::default_host();

    if let Some(idx) = index {
        let devices: Vec<_> = if loopback {
            host.output_devices()?.collect()
        } else {
            host.input_devices()?.collect()
        };

        let device_count = devices.len();
        devices.into_iter().nth(idx).ok_or_else(|| {
            Error::InvalidDevice(format!(
                "Device index {} out of range (available: {})",
                idx, device_count
            ))
        })
    } else if loopback {
        host.default_output_device()
            .ok_or_else(|| Error::InvalidDevice("No output device available".to_string()))
    } else {
        host.default_input_device()
            .ok_or_else(|| Error::InvalidDevice("No input device available".to_string()))
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    manager: Arc<MeteringManager>,
) -> Result<cpal::Stream>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = config.channels as usize;
    let sample_rate = config.sample_rate.0;
    let mut buffer: Vec<f32> = Vec::new();

    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            buffer.clear();
            buffer.extend(data.iter().map(|&s| s.to_sample::<f32>()));
            let frames = buffer.len() / channels.max(1);
            // Rejections are already logged by the manager.
            let _ = manager.push_audio(&buffer, frames, sample_rate, channels);
        },
        |err| tracing::error!("Capture stream error: {}", err),
        None,
    )?;

    Ok(stream)
}

/// List capture-capable devices as "index: name".
///
/// With `loopback` the output devices are listed instead of the inputs.
pub fn list_capture_devices(loopback: bool) -> Result<Vec<String>> {
    let host = cpal::default_host();
    let devices: Box<dyn Iterator<Item = cpal::Device>> = if loopback {
        Box::new(host.output_devices()?)
    } else {
        Box::new(host.input_devices()?)
    };
    devices
        .enumerate()
        .map(|(idx, device)| Ok(format!("{}: {}", idx, device.name()?)))
        .collect()
}
