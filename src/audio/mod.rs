pub mod buffer;
pub mod capture;
pub mod gate;

pub use buffer::AudioBuffer;

use capture::AudioCapture;
use gate::{EnergyGate, GatePoll};
use std::time::Duration;
use thiserror::Error;

/// Polling cadence for the capture level.
const FRAME: Duration = Duration::from_millis(30);
/// Ambient-noise calibration window, about one second.
const CALIBRATION_FRAMES: usize = 32;

/// Capture-device failures. These are fatal: the game loop never catches
/// them, they propagate up and end the process.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no input device available")]
    NoInputDevice,
    #[error("failed to read input device config: {0}")]
    DeviceConfig(String),
    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),
    #[error("failed to build input stream: {0}")]
    StreamBuild(String),
    #[error("failed to start input stream: {0}")]
    StreamStart(String),
    #[error("audio buffer lock poisoned")]
    BufferPoisoned,
    #[error("capture task failed: {0}")]
    CaptureTask(String),
}

/// Handle on the input device. Each [`Microphone::capture_utterance`] call
/// opens the device, records a single utterance and releases it again.
#[derive(Debug, Clone)]
pub struct Microphone {
    preferred_device: Option<String>,
}

impl Microphone {
    pub fn new(preferred_device: Option<String>) -> Self {
        Self {
            preferred_device: preferred_device
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        }
    }

    /// Calibrates against ambient noise, then records one utterance.
    ///
    /// Blocks for the calibration window plus the utterance (bounded by the
    /// gate's listening window). Returns `None` when nothing rose above the
    /// ambient floor before the window closed.
    pub fn capture_utterance(&self) -> Result<Option<AudioBuffer>, AudioError> {
        let capture = AudioCapture::open(self.preferred_device.as_deref())?;

        let mut ambient = Vec::with_capacity(CALIBRATION_FRAMES);
        for _ in 0..CALIBRATION_FRAMES {
            std::thread::sleep(FRAME);
            ambient.push(capture.level());
        }
        let mut gate = EnergyGate::from_ambient(&ambient);
        capture.reset()?;

        loop {
            std::thread::sleep(FRAME);
            if gate.update(capture.level()) == GatePoll::Closed {
                break;
            }
        }

        if !gate.heard_speech() {
            return Ok(None);
        }

        let utterance = capture.take()?;
        tracing::debug!("captured {:.1}s utterance", utterance.duration_secs());
        Ok(Some(utterance))
        // capture drops here, releasing the device
    }
}
