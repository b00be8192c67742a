//! Server-side HTML pages
//!
//! Pages are tera templates compiled into the binary. Templates ending in
//! `.html` are autoescaped, so fixture and user text is always escaped.

use anyhow::{Context as _, Result};
use serde::Serialize;
use tera::{Context, Tera};

use crate::catalog::Song;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("welcome.html", include_str!("../templates/welcome.html")),
    (
        "choose_language.html",
        include_str!("../templates/choose_language.html"),
    ),
    ("choose_song.html", include_str!("../templates/choose_song.html")),
    ("lyrics.html", include_str!("../templates/lyrics.html")),
];

/// Path of the song chooser for a language
pub fn choose_song_path(language: &str) -> String {
    format!("/choose-song/{}", urlencoding::encode(language))
}

#[derive(Serialize)]
struct SongItem<'a> {
    id: &'a str,
    title: &'a str,
    artist: &'a str,
}

/// The page renderer shared by the request handlers
pub struct Views {
    tera: Tera,
}

impl Views {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())
            .context("Failed to load page templates")?;
        Ok(Self { tera })
    }

    pub fn welcome_page(&self) -> Result<String> {
        self.render("welcome.html", &Context::new())
    }

    /// The language chooser; `languages` are catalog keys
    pub fn choose_language_page<'a>(
        &self,
        languages: impl IntoIterator<Item = &'a str>,
        error: Option<&str>,
    ) -> Result<String> {
        let languages: Vec<&str> = languages.into_iter().collect();

        let mut context = Context::new();
        context.insert("languages", &languages);
        context.insert("error", &error);
        self.render("choose_language.html", &context)
    }

    /// The song chooser for one language
    pub fn choose_song_page(
        &self,
        language: &str,
        songs: &[Song],
        error: Option<&str>,
    ) -> Result<String> {
        let items: Vec<SongItem> = songs
            .iter()
            .map(|song| SongItem {
                id: &song.id,
                title: &song.title,
                artist: &song.artist,
            })
            .collect();

        let mut context = language_context(language);
        context.insert("songs", &items);
        context.insert("error", &error);
        self.render("choose_song.html", &context)
    }

    /// Lyrics of one song, with the English version and video when available
    pub fn lyrics_page(&self, language: &str, song: &Song) -> Result<String> {
        let video_id = song
            .media_reference
            .as_deref()
            .map(|id| urlencoding::encode(id).into_owned());

        let mut context = language_context(language);
        context.insert("title", &song.title);
        context.insert("artist", &song.artist);
        context.insert("lyrics", &song.lyrics);
        context.insert("translation", &song.lyrics_translated);
        context.insert("video_id", &video_id);
        self.render("lyrics.html", &context)
    }

    fn render(&self, template: &str, context: &Context) -> Result<String> {
        self.tera
            .render(template, context)
            .with_context(|| format!("Failed to render {}", template))
    }
}

fn language_context(language: &str) -> Context {
    let mut context = Context::new();
    context.insert("language", language);
    context.insert("language_path", &urlencoding::encode(language));
    context
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song() -> Song {
        Song {
            id: "1".to_string(),
            language: "Spanish".to_string(),
            artist: "Ricky Martin, Residente, Bad Bunny".to_string(),
            title: "Cántalo".to_string(),
            lyrics: "Cántalo <fuerte>".to_string(),
            lyrics_translated: None,
            media_reference: Some("dQw4w9WgXcQ".to_string()),
        }
    }

    #[test]
    fn test_choose_song_path_encodes_language() {
        assert_eq!(choose_song_path("spanish"), "/choose-song/spanish");
        assert_eq!(
            choose_song_path("brazilian portuguese"),
            "/choose-song/brazilian%20portuguese"
        );
    }

    #[test]
    fn test_lyrics_page_escapes_and_embeds_video() {
        let views = Views::new().unwrap();
        let page = views.lyrics_page("spanish", &song()).unwrap();

        assert!(page.contains("Cántalo &lt;fuerte&gt;"));
        assert!(page.contains("https://www.youtube.com/embed/dQw4w9WgXcQ"));
        assert!(page.contains("No English translation available."));
        assert!(page.contains(r#"<h2>Spanish</h2>"#));
        assert!(page.contains(r#"href="/choose-song/spanish""#));
    }

    #[test]
    fn test_lyrics_page_with_translation_and_no_video() {
        let mut song = song();
        song.lyrics_translated = Some("Sing it".to_string());
        song.media_reference = None;

        let page = Views::new().unwrap().lyrics_page("spanish", &song).unwrap();
        assert!(page.contains(r#"id="translated-lyrics">Sing it</div>"#));
        assert!(!page.contains("No English translation available."));
        assert!(!page.contains("youtube.com"));
    }

    #[test]
    fn test_languages_are_capitalized() {
        let views = Views::new().unwrap();
        let page = views
            .choose_language_page(["spanish", "FRENCH", "élan"], None)
            .unwrap();

        assert!(page.contains(r#"<option value="spanish">Spanish</option>"#));
        assert!(page.contains(">French</option>"));
        assert!(page.contains(">Élan</option>"));
    }

    #[test]
    fn test_error_banner_only_when_present() {
        let views = Views::new().unwrap();
        let page = views.choose_language_page(["spanish"], None).unwrap();
        assert!(!page.contains("class=\"error\""));

        let page = views
            .choose_language_page(["spanish"], Some("Selected language is not available."))
            .unwrap();
        assert!(page.contains("Selected language is not available."));
        assert!(page.contains(">Spanish</option>"));
    }

    #[test]
    fn test_song_list_form_posts_to_language_path() {
        let views = Views::new().unwrap();
        let page = views
            .choose_song_page("brazilian portuguese", &[song()], None)
            .unwrap();

        assert!(page.contains(r#"action="/choose-song/brazilian%20portuguese""#));
        assert!(page.contains(r#"value="1""#));
        assert!(page.contains("Brazilian portuguese songs"));
    }
}
