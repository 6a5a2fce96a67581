use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use thiserror::Error;

/// Optional JSON file overriding the built-in game configuration.
pub const CONFIG_PATH_VAR: &str = "VOICE_GUESS_CONFIG";
/// Preferred input device name, matched against cpal device names.
pub const INPUT_DEVICE_VAR: &str = "VOICE_GUESS_INPUT_DEVICE";

const DEFAULT_WORDS: [&str; 6] = ["apple", "banana", "grape", "orange", "mango", "lemon"];
const DEFAULT_GUESS_LIMIT: usize = 3;
const DEFAULT_PROMPT_LIMIT: usize = 5;
const DEFAULT_START_DELAY_SECS: u64 = 3;

pub const DEFAULT_STT_URL: &str = "https://api.groq.com/openai/v1/audio/transcriptions";
const DEFAULT_STT_MODEL: &str = "whisper-large-v3";
const DEFAULT_STT_LANGUAGE: &str = "en";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("word list must not be empty")]
    EmptyWordList,

    #[error("word list entries must not be empty")]
    BlankWord,

    #[error("guess limit must be positive")]
    ZeroGuessLimit,

    #[error("prompt limit must be positive")]
    ZeroPromptLimit,
}

/// Immutable game configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Candidate secret words
    pub words: Vec<String>,
    /// Guesses per game
    pub guess_limit: usize,
    /// Speaking attempts per guess
    pub prompt_limit: usize,
    /// Pause between the instructions and the first prompt
    pub start_delay_secs: u64,
    /// Preferred input device, system default when unset
    pub input_device_name: Option<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            words: DEFAULT_WORDS.iter().map(|w| w.to_string()).collect(),
            guess_limit: DEFAULT_GUESS_LIMIT,
            prompt_limit: DEFAULT_PROMPT_LIMIT,
            start_delay_secs: DEFAULT_START_DELAY_SECS,
            input_device_name: None,
        }
    }
}

impl GameConfig {
    /// Built-in configuration, optionally overridden by the JSON file named
    /// in `VOICE_GUESS_CONFIG`.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };

        if let Ok(name) = env::var(INPUT_DEVICE_VAR) {
            let name = name.trim().to_string();
            if !name.is_empty() {
                config.input_device_name = Some(name);
            }
        }

        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.words.is_empty() {
            return Err(ConfigError::EmptyWordList);
        }
        if self.words.iter().any(|w| w.trim().is_empty()) {
            return Err(ConfigError::BlankWord);
        }
        if self.guess_limit == 0 {
            return Err(ConfigError::ZeroGuessLimit);
        }
        if self.prompt_limit == 0 {
            return Err(ConfigError::ZeroPromptLimit);
        }
        Ok(())
    }
}

/// Recognition service settings, read from the environment.
#[derive(Debug, Clone)]
pub struct RecognizerConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub language: String,
}

impl RecognizerConfig {
    /// A missing key is not fatal here: requests will be rejected by the
    /// service and surface as an API failure, which ends the game.
    pub fn from_env() -> Self {
        let endpoint =
            env::var("STT_API_URL").unwrap_or_else(|_| DEFAULT_STT_URL.to_string());
        let api_key = env::var("STT_API_KEY").unwrap_or_default();
        let model = env::var("STT_MODEL").unwrap_or_else(|_| DEFAULT_STT_MODEL.to_string());
        let language =
            env::var("STT_LANGUAGE").unwrap_or_else(|_| DEFAULT_STT_LANGUAGE.to_string());

        if api_key.is_empty() {
            tracing::warn!("STT_API_KEY not set; recognition requests will fail");
        }

        Self {
            endpoint,
            api_key,
            model,
            language,
        }
    }
}
