// src/stt/types.rs
// Recognition result and error definitions

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transcription produced by a recognition backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Transcribed text, cleaned and non-empty
    pub text: String,
    /// Language the service was asked to transcribe
    pub language: Option<String>,
    /// Audio duration in seconds
    pub duration_secs: f32,
    /// Backend name
    pub provider: String,
}

/// Recognition failures.
#[derive(Debug, Error)]
pub enum SttError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timeout")]
    Timeout,

    #[error("authentication failed")]
    Auth,

    #[error("rate limit exceeded")]
    RateLimit,

    #[error("no intelligible speech in audio")]
    NoSpeech,

    #[error("invalid audio")]
    InvalidAudio,

    #[error("provider error: {0}")]
    Provider(String),
}

impl SttError {
    /// True when the service itself could not be reached or refused the
    /// request, as opposed to the audio simply having nothing to match.
    pub fn is_unreachable(&self) -> bool {
        !matches!(self, SttError::NoSpeech | SttError::InvalidAudio)
    }
}
