//! The ordered playlist, its selection cursor, and its on-disk form.

mod persist;
mod sequence;

pub use persist::{load_playlist, save_playlist};
pub use sequence::PlaylistSequence;

#[cfg(test)]
mod tests;
