//! The song catalog served by the web app
//!
//! Loaded once from the fixture at startup and grouped by lowercase language.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use crate::fixture;

/// A song with its lyrics, as stored in the fixture file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub id: String,
    pub language: String,
    pub artist: String,
    #[serde(rename = "song")]
    pub title: String,
    pub lyrics: String,
    #[serde(
        rename = "lyrics_english",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub lyrics_translated: Option<String>,
    /// YouTube video id
    #[serde(
        rename = "youtube_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub media_reference: Option<String>,
}

impl Song {
    /// Treat empty optional fields as absent
    fn normalized(mut self) -> Self {
        self.lyrics_translated = self.lyrics_translated.filter(|s| !s.trim().is_empty());
        self.media_reference = self.media_reference.filter(|s| !s.trim().is_empty());
        self
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error(transparent)]
    Fixture(#[from] anyhow::Error),

    #[error("Song at position {0} has an empty id")]
    EmptyId(usize),

    #[error("Song '{0}' has an empty language")]
    EmptyLanguage(String),

    #[error("Duplicate song id: {0}")]
    DuplicateId(String),
}

/// Songs grouped by lowercase language name.
///
/// Built once at startup and shared read-only with the request handlers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Catalog {
    /// Language keys in order of first appearance
    languages: Vec<String>,
    songs_by_language: HashMap<String, Vec<Song>>,
}

impl Catalog {
    /// Load and group the songs of a fixture file
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let songs = fixture::load_songs(path)?;
        let catalog = Self::from_songs(songs)?;
        tracing::info!(
            "Loaded {} songs in {} languages from {}",
            catalog.len(),
            catalog.languages.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Group songs by language, rejecting records without identity
    pub fn from_songs(songs: Vec<Song>) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        let mut seen_ids = HashSet::new();

        for (index, song) in songs.into_iter().enumerate() {
            if song.id.trim().is_empty() {
                return Err(CatalogError::EmptyId(index));
            }
            let key = language_key(&song.language);
            if key.is_empty() {
                return Err(CatalogError::EmptyLanguage(song.id));
            }
            if !seen_ids.insert(song.id.clone()) {
                return Err(CatalogError::DuplicateId(song.id));
            }

            if !catalog.songs_by_language.contains_key(&key) {
                catalog.languages.push(key.clone());
            }
            catalog
                .songs_by_language
                .entry(key)
                .or_default()
                .push(song.normalized());
        }

        Ok(catalog)
    }

    /// Lowercase language keys, in fixture order
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.iter().map(String::as_str)
    }

    /// Songs for a language, matched case-insensitively
    pub fn songs_in(&self, language: &str) -> Option<&[Song]> {
        self.songs_by_language
            .get(&language_key(language))
            .map(Vec::as_slice)
    }

    pub fn contains_language(&self, language: &str) -> bool {
        self.songs_in(language).is_some()
    }

    /// Find a song by id within one language
    pub fn find_song(&self, language: &str, id: &str) -> Option<&Song> {
        self.songs_in(language)?.iter().find(|song| song.id == id)
    }

    /// Total number of songs
    pub fn len(&self) -> usize {
        self.songs_by_language.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

/// Normalize a language name into a catalog key
pub fn language_key(language: &str) -> String {
    language.trim().to_lowercase()
}
