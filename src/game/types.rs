// src/game/types.rs
// Game-facing result and state types

use crate::stt::SttError;
use serde::Serialize;

/// Normalized outcome of one capture-and-recognize cycle.
///
/// Exactly one variant holds: a transcription and an error never coexist.
#[derive(Debug)]
pub enum Attempt {
    /// The service understood the utterance.
    Recognized(String),
    /// The service was reached but could not match any words.
    Unintelligible,
    /// The service could not be reached, or refused the request.
    ServiceDown(SttError),
}

/// Terminal result of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Won { guesses_used: usize },
    Lost,
    Aborted,
}

/// Turn-tracking state, created at game start and mutated only by the
/// controller.
#[derive(Debug, Clone)]
pub struct GameState {
    /// The word the player is trying to say
    pub secret: String,
    /// Current guess index
    pub guess: usize,
    /// Current speaking attempt within the guess
    pub prompt: usize,
    /// Set once the game reaches a terminal state
    pub outcome: Option<Outcome>,
}

impl GameState {
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            guess: 0,
            prompt: 0,
            outcome: None,
        }
    }
}
