//! Configuration loader and schema types.
//!
//! This module exposes the settings that tune the playback session, discovery
//! workers, library scanning and playlist persistence, plus helpers to load
//! them from disk and the environment.

mod load;
mod schema;

pub use load::{default_config_path, default_playlist_path, resolve_config_path};
pub use schema::*;

#[cfg(test)]
mod tests;
