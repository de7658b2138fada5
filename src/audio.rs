//! `MediaBackend` on top of rodio.
//!
//! A dedicated audio thread owns the output stream and the current `Sink`.
//! `RodioBackend` is the controlling thread's handle to it: commands go over
//! a channel, and the thread reports back through the session's bounded
//! event queue and a shared position snapshot.

mod player;
mod sink;
mod thread;
mod types;

pub use player::RodioBackend;

#[cfg(test)]
mod tests;
