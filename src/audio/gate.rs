//! Energy-gate utterance endpointing.
//!
//! The gate is calibrated from a short window of ambient noise, then fed one
//! RMS level per polling frame. It opens when the level holds above the
//! speech threshold, and closes after enough trailing silence, after the
//! utterance cap, or when no speech arrives at all.

/// Frames the level must hold above threshold before the gate opens.
const ONSET_FRAMES: usize = 2;
/// Frames of silence after the gate opened that end the utterance (~1.2 s at
/// the 30 ms polling cadence).
const CLOSE_SILENCE_FRAMES: usize = 40;
/// Frames to wait for speech onset before giving up (~6 s).
const MAX_WAIT_FRAMES: usize = 200;
/// Hard cap on a single utterance (~8 s).
const MAX_UTTERANCE_FRAMES: usize = 266;

/// Speech must rise this factor above the ambient floor.
const THRESHOLD_OVER_AMBIENT: f32 = 2.5;
/// Lower bound on the threshold so a dead-quiet room does not trigger on
/// electrical noise.
const MIN_THRESHOLD: f32 = 0.015;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePoll {
    /// Still waiting for speech to start.
    Waiting,
    /// An utterance is in progress.
    Open,
    /// The listening window is over; stop capturing.
    Closed,
}

#[derive(Debug)]
pub struct EnergyGate {
    threshold: f32,
    frames: usize,
    run_above: usize,
    run_below: usize,
    open: bool,
    heard: bool,
}

impl EnergyGate {
    /// Calibrates the speech threshold from ambient-noise level samples.
    pub fn from_ambient(levels: &[f32]) -> Self {
        let floor = if levels.is_empty() {
            0.0
        } else {
            levels.iter().sum::<f32>() / levels.len() as f32
        };
        let threshold = (floor * THRESHOLD_OVER_AMBIENT).max(MIN_THRESHOLD);
        tracing::debug!(
            "ambient floor {:.4}, speech threshold {:.4}",
            floor,
            threshold
        );

        Self {
            threshold,
            frames: 0,
            run_above: 0,
            run_below: 0,
            open: false,
            heard: false,
        }
    }

    /// Feeds one polling frame's RMS level into the gate.
    pub fn update(&mut self, rms: f32) -> GatePoll {
        self.frames += 1;
        if rms > self.threshold {
            self.run_above += 1;
            self.run_below = 0;
        } else {
            self.run_below += 1;
            self.run_above = 0;
        }

        if !self.open {
            if self.run_above >= ONSET_FRAMES {
                self.open = true;
                self.heard = true;
                return GatePoll::Open;
            }
            if self.frames >= MAX_WAIT_FRAMES {
                return GatePoll::Closed;
            }
            return GatePoll::Waiting;
        }

        if self.run_below >= CLOSE_SILENCE_FRAMES || self.frames >= MAX_UTTERANCE_FRAMES {
            return GatePoll::Closed;
        }
        GatePoll::Open
    }

    /// Whether any speech rose above the ambient floor.
    pub fn heard_speech(&self) -> bool {
        self.heard
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}
