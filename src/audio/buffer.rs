use serde::{Deserialize, Serialize};

/// Raw PCM captured from the input stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioBuffer {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioBuffer {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            samples: Vec::new(),
            sample_rate,
            channels,
        }
    }

    /// Length of the recording in seconds.
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        let channels = self.channels.max(1) as f32;
        self.samples.len() as f32 / (self.sample_rate as f32 * channels)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn append(&mut self, data: &[i16]) {
        self.samples.extend_from_slice(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_counts_frames_not_samples() {
        let mut buffer = AudioBuffer::new(16000, 2);
        buffer.append(&vec![0i16; 32000]);
        // 32000 interleaved stereo samples at 16 kHz = 1 second
        assert!((buffer.duration_secs() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn zero_sample_rate_has_zero_duration() {
        let mut buffer = AudioBuffer::new(0, 1);
        buffer.append(&[1, 2, 3]);
        assert_eq!(buffer.duration_secs(), 0.0);
    }

    #[test]
    fn clear_empties_the_buffer() {
        let mut buffer = AudioBuffer::new(16000, 1);
        buffer.append(&[5; 100]);
        assert!(!buffer.is_empty());
        buffer.clear();
        assert!(buffer.is_empty());
    }
}
