//! Song Lingo - learn languages through song lyrics
//!
//! This library provides the song catalog served by the web app, the lyrics
//! fetching pipeline that builds its fixture file, and the phrase
//! explanation client.

pub mod catalog;
pub mod explain;
pub mod fixture;
pub mod lyrics;
pub mod server;
pub mod views;
