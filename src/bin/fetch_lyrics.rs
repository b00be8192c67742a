use anyhow::{Context, Result};
use clap::Parser;
use song_lingo::fixture;
use song_lingo::lyrics::genius::GeniusProvider;
use song_lingo::lyrics::{FetchJob, FetchOptions, LyricsFetcher};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "fetch-lyrics")]
#[command(about = "Fetch song lyrics from Genius into a Song Lingo fixture", long_about = None)]
struct Cli {
    /// JSON file with the songs to fetch (defaults to the built-in list)
    #[arg(short, long, env = "FETCH_JOBS")]
    jobs: Option<PathBuf>,

    /// Only fetch the songs with these ids
    #[arg(long = "only", value_name = "ID", env = "FETCH_ONLY", value_delimiter = ',')]
    only: Vec<String>,

    /// Fixture file to write
    #[arg(short, long, env = "FETCH_OUTPUT", default_value = "songs.json")]
    output: PathBuf,

    /// Merge into an existing output file instead of overwriting it
    #[arg(long, env = "FETCH_MERGE")]
    merge: bool,

    /// Also look for English translations
    #[arg(long, env = "FETCH_TRANSLATE")]
    translate: bool,

    /// Attempts per song on network errors
    #[arg(long, env = "FETCH_RETRIES", default_value = "3")]
    retries: u32,

    /// Seconds to wait before retrying a song
    #[arg(long, env = "FETCH_RETRY_DELAY", default_value = "5")]
    retry_delay: u64,

    /// Seconds to wait between songs
    #[arg(long, env = "FETCH_JOB_DELAY", default_value = "2")]
    job_delay: u64,

    /// Request timeout in seconds
    #[arg(long, env = "FETCH_TIMEOUT", default_value = "15")]
    timeout: u64,

    /// Genius API access token
    #[arg(long, env = "GENIUS_API_TOKEN", hide_env_values = true)]
    genius_token: Option<String>,
}

/// The songs the app ships with
fn default_jobs() -> Vec<FetchJob> {
    vec![
        FetchJob::new("1", "Spanish", "Ricky Martin, Residente, Bad Bunny", "Cántalo"),
        FetchJob::new("2", "Spanish", "Marc Anthony", "Vivir Mi Vida"),
        FetchJob::new("3", "Spanish", "Don Omar, Zion & Lennox", "Te Quiero Pa’ Mí"),
        FetchJob::new("4", "French", "Joe Dassin", "Les Champs-Élysées"),
        FetchJob::new("5", "French", "Stromae", "Papaoutai"),
        FetchJob::new("6", "French", "Zaz", "Je Veux"),
        FetchJob::new("7", "Arabic", "Rachid Taha", "Ya Rayah"),
        FetchJob::new("8", "Arabic", "Hamid Al Shaeri", "Ouda"),
        FetchJob::new("9", "Arabic", "Nancy Ajram", "Ya Tabtab"),
    ]
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();

    let Some(token) = cli.genius_token.filter(|t| !t.trim().is_empty()) else {
        anyhow::bail!("Please set GENIUS_API_TOKEN in the environment or a .env file");
    };

    let mut jobs = match &cli.jobs {
        Some(path) => fixture::load_jobs(path).context("Failed to load fetch jobs")?,
        None => default_jobs(),
    };
    if !cli.only.is_empty() {
        jobs.retain(|job| cli.only.contains(&job.id));
        if jobs.is_empty() {
            anyhow::bail!("No songs match ids {:?}", cli.only);
        }
    }

    tracing::info!("Fetching {} songs", jobs.len());

    let provider = GeniusProvider::new(token, Duration::from_secs(cli.timeout))
        .context("Failed to create Genius client")?;
    let fetcher = LyricsFetcher::new(
        provider,
        FetchOptions {
            max_attempts: cli.retries,
            retry_delay: Duration::from_secs(cli.retry_delay),
            job_delay: Duration::from_secs(cli.job_delay),
            translate: cli.translate,
        },
    );

    let report = fetcher.run(&jobs).await;

    let songs = if cli.merge && cli.output.exists() {
        let existing = fixture::load_songs(&cli.output).context("Failed to load existing fixture")?;
        tracing::info!("Merging into {} existing songs", existing.len());
        fixture::merge_songs(existing, report.songs)
    } else {
        report.songs
    };

    fixture::save_songs(&cli.output, &songs)?;

    tracing::info!("Fetch complete!");
    tracing::info!("  Not found: {}", report.not_found);
    tracing::info!("  Failed: {}", report.failed);
    tracing::info!("  Translated: {}", report.translated);
    tracing::info!("  Stored {} songs in {}", songs.len(), cli.output.display());

    Ok(())
}
