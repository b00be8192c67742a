//! Lyrics fetching pipeline
//!
//! This module defines the provider seam used to search an external lyrics
//! service and the batch fetcher that turns fetch jobs into song records,
//! retrying transient network failures and looking up English translations.

use super::cleaner::clean_lyrics;
use crate::catalog::Song;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Title suffixes tried, in order, when looking for an English translation
pub const TRANSLATION_SUFFIXES: &[&str] = &[
    "(English)",
    "[English]",
    "English",
    "- English",
    "(Translation)",
    "[Translation]",
    "Translation",
    "- Translation",
];

/// Search query for finding lyrics online
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricsQuery {
    /// Track title (required)
    pub title: String,
    /// Artist name (optional but recommended for better matching)
    pub artist: Option<String>,
}

impl LyricsQuery {
    /// Create a new lyrics query with just title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: None,
        }
    }

    /// Set the artist name
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }
}

/// Lyrics returned by a provider for the best matching song
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LyricsResponse {
    /// Title as known by the provider
    pub title: String,
    /// Primary artist as known by the provider
    pub artist: String,
    /// Raw lyrics text, before cleaning
    pub content: String,
    /// Source provider name
    pub source: String,
    /// Lyrics page URL (if available)
    pub url: Option<String>,
}

/// Errors raised by a lyrics provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Timeouts and connection failures; worth retrying
    #[error("Network error: {0}")]
    Transient(String),

    /// Anything else the provider reports; retrying will not help
    #[error("Provider error: {0}")]
    Provider(String),
}

impl ProviderError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Transient(_))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            ProviderError::Transient(err.to_string())
        } else {
            ProviderError::Provider(err.to_string())
        }
    }
}

/// Main trait for lyrics providers
///
/// Implement this trait to plug a new lyrics source into the fetcher.
#[async_trait]
pub trait LyricsProvider: Send + Sync {
    /// Returns the unique name of this provider (e.g., "genius")
    fn name(&self) -> &str;

    /// Search for a song and return the lyrics of the best match, if any
    async fn search_song(
        &self,
        query: &LyricsQuery,
    ) -> Result<Option<LyricsResponse>, ProviderError>;
}

/// One song to fetch lyrics for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchJob {
    pub id: String,
    pub language: String,
    pub artist: String,
    #[serde(rename = "song")]
    pub title: String,
    /// Carried through to the song record unchanged
    #[serde(
        rename = "youtube_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub media_reference: Option<String>,
}

impl FetchJob {
    pub fn new(
        id: impl Into<String>,
        language: impl Into<String>,
        artist: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            language: language.into(),
            artist: artist.into(),
            title: title.into(),
            media_reference: None,
        }
    }

    fn query(&self) -> LyricsQuery {
        LyricsQuery::new(&self.title).with_artist(&self.artist)
    }

    /// Title variants that may name an English translation of this song
    pub fn translation_titles(&self) -> Vec<String> {
        TRANSLATION_SUFFIXES
            .iter()
            .map(|suffix| format!("{} {}", self.title, suffix))
            .collect()
    }
}

/// Retry and pacing settings for a fetch run
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Total attempts per job for transient network errors
    pub max_attempts: u32,
    /// Pause between attempts of the same job
    pub retry_delay: Duration,
    /// Pause between jobs, to respect provider rate limits
    pub job_delay: Duration,
    /// Whether to look for English translations
    pub translate: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_secs(5),
            job_delay: Duration::from_secs(2),
            translate: false,
        }
    }
}

/// What happened to a single job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Fetched(Song),
    NotFound,
    Failed(String),
}

/// Result of a fetch run
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Songs fetched successfully, in job order
    pub songs: Vec<Song>,
    pub not_found: usize,
    pub failed: usize,
    /// How many fetched songs also got an English translation
    pub translated: usize,
}

impl FetchReport {
    fn record(&mut self, outcome: JobOutcome) {
        match outcome {
            JobOutcome::Fetched(song) => {
                if song.lyrics_translated.is_some() {
                    self.translated += 1;
                }
                self.songs.push(song);
            }
            JobOutcome::NotFound => self.not_found += 1,
            JobOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Runs fetch jobs sequentially against one provider
pub struct LyricsFetcher<P> {
    provider: P,
    options: FetchOptions,
}

impl<P: LyricsProvider> LyricsFetcher<P> {
    pub fn new(provider: P, options: FetchOptions) -> Self {
        Self { provider, options }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Fetch every job in order, pausing between jobs
    pub async fn run(&self, jobs: &[FetchJob]) -> FetchReport {
        let mut report = FetchReport::default();

        for (index, job) in jobs.iter().enumerate() {
            let outcome = self.fetch_job(job).await;
            report.record(outcome);

            if index + 1 < jobs.len() && !self.options.job_delay.is_zero() {
                tokio::time::sleep(self.options.job_delay).await;
            }
        }

        tracing::info!(
            "Fetch run finished: {} fetched, {} translated, {} not found, {} failed",
            report.songs.len(),
            report.translated,
            report.not_found,
            report.failed
        );
        report
    }

    /// Fetch the original lyrics of a job and, if enabled, its translation
    pub async fn fetch_job(&self, job: &FetchJob) -> JobOutcome {
        tracing::info!("Fetching lyrics for '{}' by {}...", job.title, job.artist);

        let response = match self.search_with_retry(&job.query()).await {
            Ok(response) => response,
            Err(e) if e.is_transient() => {
                tracing::error!(
                    "Failed to fetch lyrics for '{}' after {} attempts: {}",
                    job.title,
                    self.max_attempts(),
                    e
                );
                return JobOutcome::Failed(e.to_string());
            }
            Err(e) => {
                tracing::error!("Unexpected error fetching '{}': {}", job.title, e);
                return JobOutcome::Failed(e.to_string());
            }
        };

        let Some(lyrics) = response.map(|r| clean_lyrics(&r.content)).filter(|l| !l.is_empty())
        else {
            tracing::warn!("Lyrics not found for '{}' by {}", job.title, job.artist);
            return JobOutcome::NotFound;
        };
        tracing::info!("Successfully fetched lyrics for '{}'", job.title);

        let lyrics_translated = if self.options.translate {
            self.fetch_translation(job).await
        } else {
            None
        };

        JobOutcome::Fetched(Song {
            id: job.id.clone(),
            language: job.language.clone(),
            artist: job.artist.clone(),
            title: job.title.clone(),
            lyrics,
            lyrics_translated,
            media_reference: job.media_reference.clone(),
        })
    }

    /// Try each translation title variant once; the first non-empty result wins
    pub async fn fetch_translation(&self, job: &FetchJob) -> Option<String> {
        tracing::info!("Looking for English lyrics of '{}'...", job.title);

        for title in job.translation_titles() {
            let query = LyricsQuery::new(&title).with_artist(&job.artist);
            match self.provider.search_song(&query).await {
                Ok(Some(response)) => {
                    let lyrics = clean_lyrics(&response.content);
                    if !lyrics.is_empty() {
                        tracing::info!("Found English lyrics via '{}'", title);
                        return Some(lyrics);
                    }
                }
                Ok(None) => tracing::debug!("No match for '{}'", title),
                Err(e) => tracing::warn!("Error fetching '{}': {}", title, e),
            }
        }

        tracing::info!("English lyrics not found for '{}'", job.title);
        None
    }

    async fn search_with_retry(
        &self,
        query: &LyricsQuery,
    ) -> Result<Option<LyricsResponse>, ProviderError> {
        let max_attempts = self.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.provider.search_song(query).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    tracing::warn!(
                        "Attempt {} of {} via {} failed: {}; retrying",
                        attempt,
                        max_attempts,
                        self.provider.name(),
                        e
                    );
                    tokio::time::sleep(self.options.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn max_attempts(&self) -> u32 {
        self.options.max_attempts.max(1)
    }
}
