use anyhow::Result;
use tracing_subscriber::EnvFilter;
use voice_guess::GameConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Game lines go to stdout; keep diagnostics quiet unless RUST_LOG says
    // otherwise.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let config = GameConfig::load()?;
    let outcome = voice_guess::run(config).await?;
    tracing::info!(?outcome, "game over");

    Ok(())
}
