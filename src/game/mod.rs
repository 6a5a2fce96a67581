// src/game/mod.rs
// Turn loop: guesses, re-prompts, win/loss/abort

mod types;

pub use types::{Attempt, GameState, Outcome};

use crate::audio::{AudioError, Microphone};
use crate::config::GameConfig;
use crate::stt::{Recognizer, SttError};
use async_trait::async_trait;
use rand::seq::IndexedRandom;
use tracing::{debug, info, warn};

/// One capture-and-recognize cycle.
///
/// Expected recognition failures come back as [`Attempt`] data; only
/// capture-device faults escape as errors, and those are fatal.
#[async_trait]
pub trait TranscriptionSource {
    async fn attempt(&mut self) -> Result<Attempt, AudioError>;
}

/// Production source: microphone capture fed into the recognition service.
pub struct MicSource {
    mic: Microphone,
    recognizer: Box<dyn Recognizer>,
}

impl MicSource {
    pub fn new(mic: Microphone, recognizer: Box<dyn Recognizer>) -> Self {
        Self { mic, recognizer }
    }
}

#[async_trait]
impl TranscriptionSource for MicSource {
    async fn attempt(&mut self) -> Result<Attempt, AudioError> {
        let mic = self.mic.clone();
        let captured = tokio::task::spawn_blocking(move || mic.capture_utterance())
            .await
            .map_err(|e| AudioError::CaptureTask(e.to_string()))??;

        let Some(audio) = captured else {
            debug!("nothing rose above the ambient floor");
            return Ok(Attempt::Unintelligible);
        };

        match self.recognizer.recognize(&audio).await {
            Ok(transcript) => {
                info!(
                    "{} heard {:?} ({:.1}s)",
                    self.recognizer.name(),
                    transcript.text,
                    transcript.duration_secs
                );
                Ok(Attempt::Recognized(transcript.text))
            }
            Err(err) if err.is_unreachable() => {
                warn!("recognition service unavailable: {}", err);
                Ok(Attempt::ServiceDown(err))
            }
            Err(err) => {
                debug!("speech not recognized: {}", err);
                Ok(Attempt::Unintelligible)
            }
        }
    }
}

/// The game controller. Owns the secret word and the guess/prompt counters,
/// and drives a [`TranscriptionSource`] until the game ends.
pub struct Game {
    config: GameConfig,
    state: GameState,
}

impl Game {
    /// Picks the secret uniformly at random from the configured word list.
    pub fn new(config: GameConfig) -> Self {
        let secret = {
            let mut rng = rand::rng();
            config
                .words
                .choose(&mut rng)
                .cloned()
                .expect("config validation rejects an empty word list")
        };
        Self::with_secret(config, secret)
    }

    /// Fixes the secret instead of drawing one.
    pub fn with_secret(config: GameConfig, secret: String) -> Self {
        Self {
            state: GameState::new(secret),
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn instructions(&self) -> String {
        format!(
            "I'm thinking of one of these words:\n{}\nYou have {} tries to guess which one.",
            self.config.words.join(", "),
            self.config.guess_limit
        )
    }

    /// Plays the game to a terminal outcome.
    ///
    /// Each guess allows up to `prompt_limit` speaking attempts to obtain a
    /// transcription. A service failure ends the whole game, not just the
    /// current guess.
    pub async fn play<S: TranscriptionSource>(
        &mut self,
        source: &mut S,
    ) -> Result<Outcome, AudioError> {
        for guess in 0..self.config.guess_limit {
            self.state.guess = guess;

            let mut heard: Option<String> = None;
            let mut service_error: Option<SttError> = None;

            for prompt in 0..self.config.prompt_limit {
                self.state.prompt = prompt;
                println!("Guess {}. Speak!", guess + 1);

                match source.attempt().await? {
                    Attempt::Recognized(text) => {
                        heard = Some(text);
                        break;
                    }
                    Attempt::ServiceDown(err) => {
                        service_error = Some(err);
                        break;
                    }
                    Attempt::Unintelligible => {
                        println!("I didn't catch that. What did you say?\n");
                    }
                }
            }

            if let Some(err) = service_error {
                warn!("stopping the game: {}", err);
                println!("ERROR: API unavailable");
                return Ok(self.finish(Outcome::Aborted));
            }

            // Exhausting the prompt limit leaves an empty transcription; it
            // is evaluated like any other guess and can never match.
            let transcription = heard.unwrap_or_default();
            if !transcription.is_empty() {
                println!("You said: {}", transcription);
            }

            if transcription.to_lowercase() == self.state.secret.to_lowercase() {
                println!("Correct! You win!");
                return Ok(self.finish(Outcome::Won {
                    guesses_used: guess + 1,
                }));
            }
            if guess + 1 < self.config.guess_limit {
                println!("Incorrect. Try again.\n");
            }
        }

        println!(
            "Sorry, you lose!\nI was thinking of '{}'.",
            self.state.secret
        );
        Ok(self.finish(Outcome::Lost))
    }

    fn finish(&mut self, outcome: Outcome) -> Outcome {
        self.state.outcome = Some(outcome.clone());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct Scripted {
        queue: VecDeque<Attempt>,
        served: usize,
    }

    impl Scripted {
        fn new(attempts: Vec<Attempt>) -> Self {
            Self {
                queue: attempts.into(),
                served: 0,
            }
        }
    }

    #[async_trait]
    impl TranscriptionSource for Scripted {
        async fn attempt(&mut self) -> Result<Attempt, AudioError> {
            self.served += 1;
            Ok(self.queue.pop_front().expect("script exhausted"))
        }
    }

    fn config(words: &[&str], guess_limit: usize, prompt_limit: usize) -> GameConfig {
        GameConfig {
            words: words.iter().map(|w| w.to_string()).collect(),
            guess_limit,
            prompt_limit,
            start_delay_secs: 0,
            input_device_name: None,
        }
    }

    fn recognized(text: &str) -> Attempt {
        Attempt::Recognized(text.to_string())
    }

    #[tokio::test]
    async fn matching_ignores_case() {
        let mut game = Game::with_secret(config(&["apple", "banana"], 1, 5), "apple".into());
        let mut source = Scripted::new(vec![recognized("Apple")]);

        let outcome = game.play(&mut source).await.unwrap();
        assert_eq!(outcome, Outcome::Won { guesses_used: 1 });
    }

    #[tokio::test]
    async fn reprompts_then_evaluates_within_one_guess() {
        let mut game = Game::with_secret(config(&["grape"], 1, 5), "grape".into());
        let mut script = vec![
            Attempt::Unintelligible,
            Attempt::Unintelligible,
            Attempt::Unintelligible,
            Attempt::Unintelligible,
        ];
        script.push(recognized("grape"));
        let mut source = Scripted::new(script);

        let outcome = game.play(&mut source).await.unwrap();
        assert_eq!(outcome, Outcome::Won { guesses_used: 1 });
        assert_eq!(source.served, 5);
    }

    #[tokio::test]
    async fn wrong_guesses_exhaust_to_a_loss() {
        let mut game = Game::with_secret(config(&["mango"], 3, 5), "mango".into());
        let mut source = Scripted::new(vec![
            recognized("apple"),
            recognized("banana"),
            recognized("lemon"),
        ]);

        let outcome = game.play(&mut source).await.unwrap();
        assert_eq!(outcome, Outcome::Lost);
        // the loss message reports the secret word
        assert_eq!(game.state().secret, "mango");
        assert_eq!(game.state().outcome, Some(Outcome::Lost));
    }

    #[tokio::test]
    async fn service_error_aborts_with_no_further_attempts() {
        let mut game = Game::with_secret(config(&["mango"], 3, 5), "mango".into());
        // entries after the failure must never be consumed
        let mut source = Scripted::new(vec![
            Attempt::ServiceDown(SttError::Timeout),
            recognized("mango"),
            recognized("mango"),
        ]);

        let outcome = game.play(&mut source).await.unwrap();
        assert_eq!(outcome, Outcome::Aborted);
        assert_eq!(source.served, 1);
    }

    #[tokio::test]
    async fn service_error_mid_guess_also_aborts() {
        let mut game = Game::with_secret(config(&["mango"], 2, 5), "mango".into());
        let mut source = Scripted::new(vec![
            recognized("lemon"),
            Attempt::Unintelligible,
            Attempt::ServiceDown(SttError::Network("connection refused".into())),
            recognized("mango"),
        ]);

        let outcome = game.play(&mut source).await.unwrap();
        assert_eq!(outcome, Outcome::Aborted);
        assert_eq!(source.served, 3);
    }

    #[tokio::test]
    async fn unintelligible_attempts_never_spend_guesses() {
        let mut game = Game::with_secret(config(&["mango"], 2, 5), "mango".into());
        let mut source = Scripted::new(vec![
            // guess 1: four failed prompts, then a wrong word
            Attempt::Unintelligible,
            Attempt::Unintelligible,
            Attempt::Unintelligible,
            Attempt::Unintelligible,
            recognized("lemon"),
            // guess 2: straight to the right word
            recognized("mango"),
        ]);

        let outcome = game.play(&mut source).await.unwrap();
        assert_eq!(outcome, Outcome::Won { guesses_used: 2 });
    }

    #[tokio::test]
    async fn second_guess_can_still_win() {
        let mut game = Game::with_secret(config(&["mango", "lemon"], 2, 5), "mango".into());
        let mut source = Scripted::new(vec![recognized("lemon"), recognized("mango")]);

        let outcome = game.play(&mut source).await.unwrap();
        assert_eq!(outcome, Outcome::Won { guesses_used: 2 });
    }

    #[tokio::test]
    async fn prompt_exhaustion_spends_the_guess() {
        // guess 1 burns all prompts without a transcription; the empty
        // transcription cannot match, and guess 2 proceeds normally
        let mut game = Game::with_secret(config(&["grape"], 2, 3), "grape".into());
        let mut source = Scripted::new(vec![
            Attempt::Unintelligible,
            Attempt::Unintelligible,
            Attempt::Unintelligible,
            recognized("grape"),
        ]);

        let outcome = game.play(&mut source).await.unwrap();
        assert_eq!(outcome, Outcome::Won { guesses_used: 2 });
        assert_eq!(source.served, 4);
    }

    #[tokio::test]
    async fn prompt_exhaustion_on_the_last_guess_loses() {
        let mut game = Game::with_secret(config(&["grape"], 1, 3), "grape".into());
        let mut source = Scripted::new(vec![
            Attempt::Unintelligible,
            Attempt::Unintelligible,
            Attempt::Unintelligible,
        ]);

        let outcome = game.play(&mut source).await.unwrap();
        assert_eq!(outcome, Outcome::Lost);
        assert_eq!(source.served, 3);
    }

    #[tokio::test]
    async fn random_secret_comes_from_the_word_list() {
        let config = config(&["apple", "banana", "grape"], 3, 5);
        for _ in 0..20 {
            let game = Game::new(config.clone());
            assert!(config.words.contains(&game.state().secret));
        }
    }

    #[test]
    fn instructions_list_words_and_tries() {
        let game = Game::with_secret(config(&["apple", "banana"], 3, 5), "apple".into());
        let text = game.instructions();
        assert!(text.contains("apple, banana"));
        assert!(text.contains("3 tries"));
    }
}
