// src/stt/mod.rs
// Speech recognition capability

mod types;
mod whisper_api;

pub use types::{SttError, Transcript};
pub use whisper_api::WhisperApi;

use crate::audio::AudioBuffer;
use async_trait::async_trait;

/// Unified recognition capability: audio in, transcript out.
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Transcribe a captured utterance to text
    async fn recognize(&self, audio: &AudioBuffer) -> Result<Transcript, SttError>;

    /// Get backend name
    fn name(&self) -> &str;
}
