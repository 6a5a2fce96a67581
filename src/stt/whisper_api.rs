// src/stt/whisper_api.rs
// HTTP recognition backend (OpenAI-compatible transcription endpoint)

use super::{Recognizer, SttError, Transcript};
use crate::audio::AudioBuffer;
use crate::config::RecognizerConfig;
use async_trait::async_trait;
use regex::Regex;
use reqwest::multipart;
use std::sync::OnceLock;
use std::time::Duration;

const TIMEOUT_SECS: u64 = 10;
const RESPONSE_FORMAT: &str = "text";

pub struct WhisperApi {
    endpoint: String,
    api_key: String,
    model: String,
    language: String,
    client: reqwest::Client,
}

impl WhisperApi {
    pub fn new(config: &RecognizerConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        tracing::info!("recognition backend: {}", config.endpoint);

        Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            language: config.language.clone(),
            client,
        }
    }

    /// Convert AudioBuffer to WAV bytes
    fn to_wav_bytes(audio: &AudioBuffer) -> Result<Vec<u8>, SttError> {
        let sample_rate = audio.sample_rate;
        let channels = audio.channels;
        let samples = &audio.samples;

        if samples.is_empty() {
            return Err(SttError::InvalidAudio);
        }

        let mut wav = Vec::new();

        // RIFF header
        wav.extend_from_slice(b"RIFF");
        let file_size = (36 + samples.len() * 2) as u32;
        wav.extend_from_slice(&file_size.to_le_bytes());
        wav.extend_from_slice(b"WAVE");

        // fmt chunk
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        wav.extend_from_slice(&1u16.to_le_bytes()); // PCM format
        wav.extend_from_slice(&channels.to_le_bytes());
        wav.extend_from_slice(&sample_rate.to_le_bytes());
        let byte_rate = sample_rate * channels as u32 * 2;
        wav.extend_from_slice(&byte_rate.to_le_bytes());
        wav.extend_from_slice(&(channels * 2).to_le_bytes()); // block align
        wav.extend_from_slice(&16u16.to_le_bytes()); // bits per sample

        // data chunk
        wav.extend_from_slice(b"data");
        let data_size = (samples.len() * 2) as u32;
        wav.extend_from_slice(&data_size.to_le_bytes());

        // PCM samples (i16)
        for &sample in samples {
            wav.extend_from_slice(&sample.to_le_bytes());
        }

        Ok(wav)
    }

    /// Strips timestamp markers and surrounding punctuation so a one-word
    /// answer compares cleanly against the word list.
    fn clean_transcript(text: &str) -> String {
        static TS_RE: OnceLock<Regex> = OnceLock::new();
        let re = TS_RE.get_or_init(|| {
            Regex::new(r"\[\d{2}:\d{2}.*?\]|\(\d{2}:\d{2}\)").expect("valid timestamp regex")
        });
        let stripped = re.replace_all(text, "");
        let joined = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
        joined
            .trim_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
            .to_string()
    }
}

#[async_trait]
impl Recognizer for WhisperApi {
    async fn recognize(&self, audio: &AudioBuffer) -> Result<Transcript, SttError> {
        let duration_secs = audio.duration_secs();
        tracing::info!("submitting {:.1}s of audio for recognition", duration_secs);

        let wav_bytes = Self::to_wav_bytes(audio)?;

        let file_part = multipart::Part::bytes(wav_bytes)
            .file_name("utterance.wav")
            .mime_str("audio/wav")
            .map_err(|e| SttError::Provider(e.to_string()))?;

        let form = multipart::Form::new()
            .text("model", self.model.clone())
            .text("response_format", RESPONSE_FORMAT)
            .text("language", self.language.clone())
            .part("file", file_part);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await;

        match response {
            Ok(resp) => {
                let status = resp.status();

                if status.is_success() {
                    let raw_text = resp
                        .text()
                        .await
                        .map_err(|e| SttError::Provider(e.to_string()))?;
                    let cleaned = Self::clean_transcript(&raw_text);

                    if cleaned.is_empty() {
                        return Err(SttError::NoSpeech);
                    }

                    Ok(Transcript {
                        text: cleaned,
                        language: Some(self.language.clone()),
                        duration_secs,
                        provider: "whisper-api".to_string(),
                    })
                } else if status.as_u16() == 401 {
                    Err(SttError::Auth)
                } else if status.as_u16() == 429 {
                    Err(SttError::RateLimit)
                } else {
                    let error_text = resp.text().await.unwrap_or_default();
                    Err(SttError::Provider(format!(
                        "HTTP {}: {}",
                        status, error_text
                    )))
                }
            }
            Err(e) => {
                if e.is_timeout() {
                    Err(SttError::Timeout)
                } else {
                    Err(SttError::Network(e.to_string()))
                }
            }
        }
    }

    fn name(&self) -> &str {
        "whisper-api"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_header_is_well_formed() {
        let mut audio = AudioBuffer::new(16000, 1);
        audio.append(&[0i16; 1600]);

        let wav = WhisperApi::to_wav_bytes(&audio).unwrap();

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(&wav[36..40], b"data");
        // data chunk size = samples * 2 bytes
        assert_eq!(u32::from_le_bytes(wav[40..44].try_into().unwrap()), 3200);
        assert_eq!(wav.len(), 44 + 3200);
    }

    #[test]
    fn empty_audio_is_rejected() {
        let audio = AudioBuffer::new(16000, 1);
        assert!(matches!(
            WhisperApi::to_wav_bytes(&audio),
            Err(SttError::InvalidAudio)
        ));
    }

    #[test]
    fn cleaning_strips_timestamps_and_punctuation() {
        assert_eq!(WhisperApi::clean_transcript("[00:01.000] Apple."), "Apple");
        assert_eq!(WhisperApi::clean_transcript("  banana!  "), "banana");
        assert_eq!(
            WhisperApi::clean_transcript("(00:02) mango  lemon"),
            "mango lemon"
        );
        assert_eq!(WhisperApi::clean_transcript(" . "), "");
    }
}
