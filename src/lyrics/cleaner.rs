//! Lyrics text cleanup
//!
//! Raw lyrics pages carry section headers (`[Chorus]`), performer notes
//! (`(x2)`) and page chrome ("Embed", "You might also like"). The cleaner
//! strips all of it so only singable lines remain.

use regex::Regex;
use std::sync::LazyLock;

/// Lines containing any of these phrases are page chrome, not lyrics.
pub const BOILERPLATE_PHRASES: &[&str] = &[
    "Contributors",
    "Translations",
    "You might also like",
    "Embed",
    "See ",
    "Get tickets",
    "English",
    "Deutsch",
    "1 Contributor",
    "1 Translation",
];

// Opening bracket up to the nearest closing bracket of either kind.
static BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\[(].*?[\])]").expect("bracket pattern is valid"));

/// Remove bracketed annotations and boilerplate lines from raw lyrics.
pub fn clean_lyrics(raw: &str) -> String {
    let stripped = BRACKETED.replace_all(raw, "");

    stripped
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !is_boilerplate(line))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Whether a line contains one of the known boilerplate phrases
pub fn is_boilerplate(line: &str) -> bool {
    BOILERPLATE_PHRASES
        .iter()
        .any(|phrase| line.contains(phrase))
}
