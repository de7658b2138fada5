use crate::library::Track;

use super::session::SessionState;

/// Outbound notifications for whatever renders the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// Published position and duration; a duration of 0 is unknown.
    Progress { position_ns: u64, duration_ns: u64 },
    /// The track now loaded, or `None` once playback has reset.
    NowPlaying(Option<Track>),
    State(SessionState),
    Selection(Option<usize>),
    /// Known duration left in the playlist after the selection.
    Remaining(u64),
    /// A fatal backend error, meant for the user.
    Error(String),
}
