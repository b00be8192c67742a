//! Genius lyrics provider
//!
//! Searches the Genius API for a song, then scrapes the lyrics from the
//! song's web page (the API does not return lyrics text).
//! API Documentation: https://docs.genius.com

use super::fetcher::{LyricsProvider, LyricsQuery, LyricsResponse, ProviderError};
use async_trait::async_trait;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;

/// Titles matching this are track lists, credits and similar non-songs
static NON_SONG_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)track\s?list|album art(work)?|liner notes|booklet|credits|interview|skit|instrumental|setlist",
    )
    .expect("non-song pattern is valid")
});

/// Versions never wanted in the fixture
const EXCLUDED_TERMS: &[&str] = &["(remix)", "(live)"];

/// Genius splits the lyrics of a page over several of these containers
const LYRICS_CONTAINER: &str = "div[data-lyrics-container='true']";

/// Elements rendered on their own line
const BLOCK_ELEMENTS: &[&str] = &["div", "p", "li"];

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    response: SearchBody,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "type")]
    kind: String,
    result: serde_json::Value,
}

/// A song as returned by the Genius search endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct GeniusSong {
    pub id: u64,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub lyrics_state: Option<String>,
    pub primary_artist: GeniusArtist,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeniusArtist {
    pub name: String,
}

impl GeniusSong {
    /// Whether this result looks like actual song lyrics
    fn is_lyrics(&self) -> bool {
        let complete = self
            .lyrics_state
            .as_deref()
            .is_none_or(|state| state == "complete");
        let title = self.title.to_lowercase();

        complete
            && !NON_SONG_TITLE.is_match(&self.title)
            && !EXCLUDED_TERMS.iter().any(|term| title.contains(term))
    }
}

/// Genius API client
pub struct GeniusProvider {
    client: reqwest::Client,
    token: String,
    api_base: String,
}

impl GeniusProvider {
    const DEFAULT_API_BASE: &'static str = "https://api.genius.com";
    const USER_AGENT: &'static str = concat!("song-lingo/", env!("CARGO_PKG_VERSION"));

    /// Create a new client authenticated with an API access token
    pub fn new(token: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent(Self::USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            token: token.into(),
            api_base: Self::DEFAULT_API_BASE.to_string(),
        })
    }

    /// Search songs matching a free-text term
    pub async fn search(&self, term: &str) -> Result<Vec<GeniusSong>, ProviderError> {
        let url = format!("{}/search?q={}", self.api_base, urlencoding::encode(term));
        tracing::debug!("Genius search: {}", term);

        let envelope: SearchEnvelope = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let songs: Vec<GeniusSong> = envelope
            .response
            .hits
            .into_iter()
            .filter(|hit| hit.kind == "song")
            .filter_map(|hit| serde_json::from_value(hit.result).ok())
            .collect();

        tracing::debug!("Genius found {} songs for '{}'", songs.len(), term);
        Ok(songs)
    }

    /// Download a song page and extract its lyrics
    pub async fn fetch_lyrics(&self, song: &GeniusSong) -> Result<Option<String>, ProviderError> {
        tracing::debug!("Fetching Genius lyrics page: {}", song.url);

        let html = self
            .client
            .get(&song.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(extract_lyrics(&html))
    }
}

#[async_trait]
impl LyricsProvider for GeniusProvider {
    fn name(&self) -> &str {
        "genius"
    }

    async fn search_song(
        &self,
        query: &LyricsQuery,
    ) -> Result<Option<LyricsResponse>, ProviderError> {
        let term = match &query.artist {
            Some(artist) => format!("{} {}", query.title, artist),
            None => query.title.clone(),
        };

        let songs = self.search(&term).await?;
        let Some(song) = select_song(&songs, &query.title) else {
            tracing::debug!("No lyrics result for '{}'", term);
            return Ok(None);
        };

        let Some(content) = self.fetch_lyrics(song).await? else {
            tracing::warn!("Could not extract lyrics from {}", song.url);
            return Ok(None);
        };

        Ok(Some(LyricsResponse {
            title: song.title.clone(),
            artist: song.primary_artist.name.clone(),
            content,
            source: self.name().to_string(),
            url: Some(song.url.clone()),
        }))
    }
}

/// Pick the best search result: an exact title match if there is one,
/// otherwise the first result that is a real song.
pub fn select_song<'a>(songs: &'a [GeniusSong], title: &str) -> Option<&'a GeniusSong> {
    let wanted = normalize_title(title);
    let mut candidates = songs.iter().filter(|song| song.is_lyrics());

    let first = candidates.clone().next();
    candidates
        .find(|song| normalize_title(&song.title) == wanted)
        .or(first)
}

fn normalize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Extract plain-text lyrics from a Genius song page
pub fn extract_lyrics(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = match Selector::parse(LYRICS_CONTAINER) {
        Ok(selector) => selector,
        Err(e) => {
            tracing::error!("Invalid lyrics selector '{}': {:?}", LYRICS_CONTAINER, e);
            return None;
        }
    };

    let sections: Vec<String> = document
        .select(&selector)
        .map(|container| {
            let mut text = String::new();
            push_text(container, &mut text);
            text.trim().to_string()
        })
        .filter(|text| !text.is_empty())
        .collect();

    let lyrics = sections.join("\n");
    (!lyrics.is_empty()).then_some(lyrics)
}

/// Append the text below an element, turning `<br>` and block elements into line breaks
fn push_text(element: ElementRef<'_>, out: &mut String) {
    for node in element.children() {
        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(child) => {
                let Some(child_ref) = ElementRef::wrap(node) else {
                    continue;
                };
                match child.name() {
                    "br" => out.push('\n'),
                    name if BLOCK_ELEMENTS.contains(&name) => {
                        start_line(out);
                        push_text(child_ref, out);
                        start_line(out);
                    }
                    _ => push_text(child_ref, out),
                }
            }
            _ => {}
        }
    }
}

fn start_line(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}
