//! In-memory lyrics provider

use super::fetcher::{LyricsProvider, LyricsQuery, LyricsResponse, ProviderError};
use async_trait::async_trait;
use std::collections::HashMap;

/// A lyrics provider backed by a fixed in-memory table
///
/// Titles and artists match case-insensitively. A query without an artist
/// matches the first entry with the same title. Useful for:
/// - Exercising the fetcher without network access
/// - Seeding a fixture from lyrics already at hand
pub struct StaticLyricsProvider {
    name: String,
    entries: Vec<(String, String)>,
    lyrics: HashMap<(String, String), String>,
}

impl StaticLyricsProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            lyrics: HashMap::new(),
        }
    }

    /// Add a lyrics entry to this provider
    pub fn add_lyrics(
        mut self,
        title: impl Into<String>,
        artist: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let key = (title.into().to_lowercase(), artist.into().to_lowercase());
        if !self.lyrics.contains_key(&key) {
            self.entries.push(key.clone());
        }
        self.lyrics.insert(key, content.into());
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&self, query: &LyricsQuery) -> Option<(&(String, String), &String)> {
        let title = query.title.to_lowercase();
        match &query.artist {
            Some(artist) => self.lyrics.get_key_value(&(title, artist.to_lowercase())),
            None => self
                .entries
                .iter()
                .find(|(t, _)| *t == title)
                .and_then(|key| self.lyrics.get_key_value(key)),
        }
    }
}

#[async_trait]
impl LyricsProvider for StaticLyricsProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search_song(
        &self,
        query: &LyricsQuery,
    ) -> Result<Option<LyricsResponse>, ProviderError> {
        Ok(self.lookup(query).map(|((title, artist), content)| LyricsResponse {
            title: title.clone(),
            artist: artist.clone(),
            content: content.clone(),
            source: self.name.clone(),
            url: None,
        }))
    }
}
