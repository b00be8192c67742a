//! Reading and writing the JSON song fixture
//!
//! The fixture is a JSON array of song records. It is produced by the
//! `fetch-lyrics` tool and read by the server at startup.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::Path;

use crate::catalog::Song;
use crate::lyrics::fetcher::FetchJob;

/// Read all song records from a fixture file
pub fn load_songs(path: &Path) -> Result<Vec<Song>> {
    read_json_array(path)
}

/// Read fetch jobs from a JSON file
pub fn load_jobs(path: &Path) -> Result<Vec<FetchJob>> {
    read_json_array(path)
}

fn read_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write song records as pretty-printed JSON (4-space indent, UTF-8 kept as-is)
pub fn save_songs(path: &Path, songs: &[Song]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let json = to_pretty_json(songs)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::debug!("Wrote {} songs to {}", songs.len(), path.display());
    Ok(())
}

fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .context("Failed to serialize songs")?;
    Ok(buf)
}

/// Merge freshly fetched songs into an existing list.
///
/// A fetched song replaces the existing record with the same id in place;
/// songs with new ids are appended in fetch order.
pub fn merge_songs(existing: Vec<Song>, fetched: Vec<Song>) -> Vec<Song> {
    let mut merged = existing;
    let mut positions: HashMap<String, usize> = merged
        .iter()
        .enumerate()
        .map(|(i, song)| (song.id.clone(), i))
        .collect();

    for song in fetched {
        match positions.get(&song.id) {
            Some(&index) => merged[index] = song,
            None => {
                positions.insert(song.id.clone(), merged.len());
                merged.push(song);
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: &str, lyrics: &str) -> Song {
        Song {
            id: id.to_string(),
            language: "Spanish".to_string(),
            artist: "Don Omar, Zion & Lennox".to_string(),
            title: "Te Quiero Pa’ Mí".to_string(),
            lyrics: lyrics.to_string(),
            lyrics_translated: None,
            media_reference: None,
        }
    }

    #[test]
    fn test_merge_replaces_in_place_and_appends() {
        let existing = vec![song("1", "a"), song("3", "old"), song("5", "c")];
        let fetched = vec![song("3", "new"), song("9", "z")];

        let merged = merge_songs(existing, fetched);
        let ids: Vec<_> = merged.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3", "5", "9"]);
        assert_eq!(merged[1].lyrics, "new");
    }

    #[test]
    fn test_merge_duplicate_fetched_ids_keep_last() {
        let merged = merge_songs(Vec::new(), vec![song("2", "first"), song("2", "second")]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].lyrics, "second");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("songs.json");

        let songs = vec![song("3", "Dímelo")];
        save_songs(&path, &songs).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n    {"));
        assert!(raw.contains("Pa’ Mí"));
        assert!(!raw.contains("lyrics_english"));

        assert_eq!(load_songs(&path).unwrap(), songs);
    }

    #[test]
    fn test_pretty_json_of_song_slice() {
        let songs = [song("1", "Voy a reír"), song("2", "Dímelo")];
        let json = String::from_utf8(to_pretty_json(&songs[..1]).unwrap()).unwrap();

        assert!(json.starts_with("[\n    {\n        \"id\": \"1\""));
        assert!(json.contains("Voy a reír"));
        assert!(!json.contains("Dímelo"));
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let err = load_songs(Path::new("/nonexistent/songs.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/songs.json"));
    }
}
