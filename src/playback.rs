//! The playback session engine.
//!
//! `PlaybackSession` owns the playlist and all playback state and lives on
//! the controlling thread. It talks to a `MediaBackend`, consumes the
//! backend's `BackendEvent`s, drives a polling `ProgressTimer` and the
//! drag-seek protocol, and reports everything the user sees as `Signal`s.

mod backend;
mod progress;
mod session;
mod signal;

pub use backend::{
    BackendEvent, BackendState, EventRx, EventTx, LoadId, MediaBackend, event_channel,
};
pub use progress::{ProgressTimer, SeekGesture};
pub use session::{PlaybackSession, SessionOptions, SessionState};
pub use signal::Signal;
