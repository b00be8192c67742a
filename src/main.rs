use anyhow::{Context, Result};
use clap::Parser;
use song_lingo::catalog::Catalog;
use song_lingo::explain::{OpenAiConfig, OpenAiExplainer};
use song_lingo::server;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "song-lingo")]
#[command(about = "Song Lingo web server", long_about = None)]
struct Cli {
    /// Path to the song fixture file
    #[arg(short, long, env = "SONGS_PATH", default_value = "songs.json")]
    songs: PathBuf,

    /// Directory with the stylesheet and scripts
    #[arg(long, env = "STATIC_DIR", default_value = "static")]
    static_dir: PathBuf,

    /// Address to bind
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "5000")]
    port: u16,

    /// API key for phrase explanations
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Completion model used for explanations
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4o-mini")]
    model: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Secrets usually live in a local .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .with_target(true)
        .with_line_number(true)
        .init();

    let cli = Cli::parse();

    tracing::info!("Starting Song Lingo");

    let catalog = Catalog::load(&cli.songs)
        .with_context(|| format!("Failed to load songs from {}", cli.songs.display()))?;
    if catalog.is_empty() {
        tracing::warn!("Song catalog is empty");
    }

    let explainer = OpenAiExplainer::new(OpenAiConfig {
        api_key: cli.openai_api_key,
        model: cli.model,
        ..OpenAiConfig::default()
    })?;

    if !cli.static_dir.is_dir() {
        tracing::warn!("Static directory not found: {}", cli.static_dir.display());
    }

    let app = server::create_router(Arc::new(catalog), Arc::new(explainer), &cli.static_dir)?;
    let addr = format!("{}:{}", cli.host, cli.port);

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Routes:");
    tracing::info!("  GET       /                        - Welcome page");
    tracing::info!("  GET|POST  /choose-language         - Pick a language");
    tracing::info!("  GET|POST  /choose-song/:language   - Pick a song, show lyrics");
    tracing::info!("  POST      /explain                 - Explain a phrase");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_every_flag_has_env_fallback() {
        let command = Cli::command();
        command.clone().debug_assert();

        for arg in command.get_arguments() {
            if matches!(arg.get_id().as_str(), "help" | "version") {
                continue;
            }
            assert!(arg.get_env().is_some(), "--{} has no env fallback", arg.get_id());
        }
    }
}
