use song_lingo::catalog::{Catalog, CatalogError};
use song_lingo::lyrics::clean_lyrics;
use song_lingo::lyrics::cleaner::BOILERPLATE_PHRASES;
use std::io::Write;
use tempfile::NamedTempFile;

const FIXTURE: &str = r#"[
    {
        "id": "1",
        "language": "Spanish",
        "artist": "Ricky Martin, Residente, Bad Bunny",
        "song": "Cántalo",
        "lyrics": "Cántalo, cántalo",
        "lyrics_english": "Sing it, sing it",
        "youtube_id": ""
    },
    {
        "id": "7",
        "language": "Arabic",
        "artist": "Rachid Taha",
        "song": "Ya Rayah",
        "lyrics": "Ya rayah"
    },
    {
        "id": "2",
        "language": "spanish",
        "artist": "Marc Anthony",
        "song": "Vivir Mi Vida",
        "lyrics": "Voy a reír"
    }
]"#;

fn fixture_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_groups_fixture() {
    let file = fixture_file(FIXTURE);
    let catalog = Catalog::load(file.path()).unwrap();

    assert_eq!(catalog.len(), 3);
    assert_eq!(catalog.languages().collect::<Vec<_>>(), vec!["spanish", "arabic"]);

    let first = catalog.find_song("Spanish", "1").unwrap();
    assert_eq!(first.lyrics_translated.as_deref(), Some("Sing it, sing it"));
    assert_eq!(first.media_reference, None);
}

#[test]
fn test_loading_twice_is_identical() {
    let file = fixture_file(FIXTURE);

    let first = Catalog::load(file.path()).unwrap();
    let second = Catalog::load(file.path()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_invalid_fixture_is_rejected() {
    let file = fixture_file(r#"[{"id": "1"}]"#);
    assert!(matches!(Catalog::load(file.path()), Err(CatalogError::Fixture(_))));

    let file = fixture_file(
        r#"[{"id": "1", "language": "", "artist": "a", "song": "s", "lyrics": "l"}]"#,
    );
    assert!(matches!(Catalog::load(file.path()), Err(CatalogError::EmptyLanguage(_))));
}

#[test]
fn test_cleaner_removes_every_bracketed_span() {
    let raw = "[Intro: Residente]\nCántalo (cántalo) fuerte [x2]\n(Oh-oh) Que suene [Coro] el tambor (eh)";
    let cleaned = clean_lyrics(raw);

    for annotation in ["Intro", "Residente", "x2", "Oh-oh", "Coro", "(", ")", "[", "]"] {
        assert!(!cleaned.contains(annotation), "{} left in {:?}", annotation, cleaned);
    }
    assert!(cleaned.contains("Cántalo  fuerte"));
}

#[test]
fn test_cleaner_drops_exactly_the_boilerplate_lines() {
    let keep = ["Vivir mi vida, la la la la", "Voy a reír, voy a bailar"];
    let mut raw = String::new();
    for phrase in BOILERPLATE_PHRASES {
        raw.push_str(&format!("prefix {} suffix\n", phrase));
    }
    for line in keep {
        raw.push_str(line);
        raw.push('\n');
    }

    assert_eq!(clean_lyrics(&raw), keep.join("\n"));
}
