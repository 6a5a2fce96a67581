pub mod audio;
pub mod config;
pub mod game;
pub mod stt;

pub use config::{ConfigError, GameConfig, RecognizerConfig};
pub use game::{Attempt, Game, GameState, MicSource, Outcome, TranscriptionSource};

use audio::Microphone;
use std::time::Duration;
use stt::WhisperApi;
use tokio::time::sleep;

/// Runs one game: prints the instructions, waits the configured delay, then
/// hands control to the game loop with the microphone-backed source.
pub async fn run(config: GameConfig) -> Result<Outcome, audio::AudioError> {
    let recognizer = WhisperApi::new(&RecognizerConfig::from_env());
    let mic = Microphone::new(config.input_device_name.clone());
    let mut source = MicSource::new(mic, Box::new(recognizer));

    let mut game = Game::new(config);

    println!("{}", game.instructions());
    sleep(Duration::from_secs(game.config().start_delay_secs)).await;

    game.play(&mut source).await
}
