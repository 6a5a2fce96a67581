use super::{AudioBuffer, AudioError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc, Mutex,
};
use tracing::{error, info, warn};

/// An open input stream feeding samples into a shared buffer.
///
/// Dropping the capture releases the device, so each guess attempt opens a
/// fresh one and the microphone is never held between turns.
pub struct AudioCapture {
    _stream: cpal::Stream,
    buffer: Arc<Mutex<AudioBuffer>>,
    level: Arc<AtomicU32>,
}

impl AudioCapture {
    pub fn open(preferred_device: Option<&str>) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device =
            pick_input_device(&host, preferred_device).ok_or(AudioError::NoInputDevice)?;
        info!("input device: {}", device_display_name(&device));

        let config = device
            .default_input_config()
            .map_err(|e| AudioError::DeviceConfig(e.to_string()))?;

        let buffer = Arc::new(Mutex::new(AudioBuffer::new(
            config.sample_rate(),
            config.channels(),
        )));
        let level = Arc::new(AtomicU32::new(0.0f32.to_bits()));

        let buffer_clone = buffer.clone();
        let level_clone = level.clone();
        let err_fn = |err| error!("an error occurred on stream: {}", err);

        let stream = match config.sample_format() {
            cpal::SampleFormat::I16 => device.build_input_stream(
                &config.into(),
                move |data: &[i16], _: &_| write_input_data(data, &buffer_clone, &level_clone),
                err_fn,
                None,
            ),
            cpal::SampleFormat::F32 => device.build_input_stream(
                &config.into(),
                move |data: &[f32], _: &_| write_input_data_f32(data, &buffer_clone, &level_clone),
                err_fn,
                None,
            ),
            other => return Err(AudioError::UnsupportedFormat(format!("{other:?}"))),
        }
        .map_err(|e| AudioError::StreamBuild(e.to_string()))?;

        stream.play().map_err(|e| AudioError::StreamStart(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            buffer,
            level,
        })
    }

    /// Latest RMS level written by the stream callback.
    pub fn level(&self) -> f32 {
        f32::from_bits(self.level.load(Ordering::Relaxed))
    }

    /// Discards everything captured so far. Used once calibration is done so
    /// the ambient-noise window does not end up in the utterance.
    pub fn reset(&self) -> Result<(), AudioError> {
        let mut guard = self.buffer.lock().map_err(|_| AudioError::BufferPoisoned)?;
        guard.clear();
        Ok(())
    }

    /// Takes the captured samples out of the shared buffer.
    pub fn take(&self) -> Result<AudioBuffer, AudioError> {
        let mut guard = self.buffer.lock().map_err(|_| AudioError::BufferPoisoned)?;
        let out = guard.clone();
        guard.clear();
        Ok(out)
    }
}

fn pick_input_device(host: &cpal::Host, preferred_name: Option<&str>) -> Option<cpal::Device> {
    if let Some(name) = preferred_name {
        if let Ok(mut devices) = host.input_devices() {
            if let Some(device) = devices.find(|d| device_display_name(d) == name) {
                return Some(device);
            }
        }
        warn!(
            "preferred input device '{}' not found, falling back to default",
            name
        );
    }
    host.default_input_device()
}

fn device_display_name(device: &cpal::Device) -> String {
    device
        .name()
        .or_else(|_| device.description().map(|d| d.name().to_string()))
        .unwrap_or_else(|_| "Unknown input".to_string())
}

fn write_input_data(input: &[i16], buffer: &Arc<Mutex<AudioBuffer>>, level: &Arc<AtomicU32>) {
    if let Ok(mut guard) = buffer.lock() {
        guard.append(input);
    }
    level.store(rms_i16(input).to_bits(), Ordering::Relaxed);
}

fn write_input_data_f32(input: &[f32], buffer: &Arc<Mutex<AudioBuffer>>, level: &Arc<AtomicU32>) {
    level.store(rms_f32(input).to_bits(), Ordering::Relaxed);

    let samples: Vec<i16> = input
        .iter()
        .map(|&x| (x * i16::MAX as f32) as i16)
        .collect();
    if let Ok(mut guard) = buffer.lock() {
        guard.append(&samples);
    }
}

fn rms_i16(input: &[i16]) -> f32 {
    if input.is_empty() {
        return 0.0;
    }
    let sum: f32 = input
        .iter()
        .map(|&s| {
            let v = s as f32 / i16::MAX as f32;
            v * v
        })
        .sum();
    (sum / input.len() as f32).sqrt()
}

fn rms_f32(input: &[f32]) -> f32 {
    if input.is_empty() {
        return 0.0;
    }
    let sum: f32 = input.iter().map(|&s| s * s).sum();
    (sum / input.len() as f32).sqrt()
}
