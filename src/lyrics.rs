pub mod cleaner;
pub mod fetcher;
pub mod genius;
pub mod providers;

pub use cleaner::clean_lyrics;
pub use fetcher::{FetchJob, FetchOptions, FetchReport, LyricsFetcher, LyricsProvider};
