//! Plain-text rendering of session signals and the playlist.

use crate::config::LibrarySettings;
use crate::library::{Track, display_from_fields, format_clock, format_progress, format_remaining};
use crate::playback::{SessionState, Signal};
use crate::playlist::PlaylistSequence;

fn label(track: &Track, library: &LibrarySettings) -> String {
    display_from_fields(
        track,
        &library.display_fields,
        &library.display_separator,
    )
}

fn state_text(state: SessionState) -> &'static str {
    match state {
        SessionState::Stopped => "Stopped",
        SessionState::Loading => "Loading",
        SessionState::Playing => "Playing",
        SessionState::Paused => "Paused",
        SessionState::ErrorRecovery => "Recovering",
    }
}

/// Keep only the latest progress and remaining-time signals from a batch;
/// everything else is kept in order.
pub fn coalesce(signals: Vec<Signal>) -> Vec<Signal> {
    let last_progress = signals
        .iter()
        .rposition(|s| matches!(s, Signal::Progress { .. }));
    let last_remaining = signals
        .iter()
        .rposition(|s| matches!(s, Signal::Remaining(_)));

    signals
        .into_iter()
        .enumerate()
        .filter(|(i, s)| match s {
            Signal::Progress { .. } => Some(*i) == last_progress,
            Signal::Remaining(_) => Some(*i) == last_remaining,
            _ => true,
        })
        .map(|(_, s)| s)
        .collect()
}

/// One status line for `signal`, or `None` when it has nothing to show.
pub fn signal_line(
    signal: &Signal,
    playlist: &PlaylistSequence,
    library: &LibrarySettings,
) -> Option<String> {
    match signal {
        Signal::Progress {
            position_ns,
            duration_ns,
        } => Some(format!("[{}]", format_progress(*position_ns, *duration_ns))),
        Signal::NowPlaying(Some(track)) => {
            let art = if track.artwork().is_some() { " [art]" } else { "" };
            Some(format!("Song: {}{art}", label(track, library)))
        }
        Signal::NowPlaying(None) => None,
        Signal::State(state) => Some(state_text(*state).to_string()),
        Signal::Selection(Some(index)) => {
            let track = playlist.get(*index)?;
            Some(format!("> {}. {}", index + 1, label(track, library)))
        }
        Signal::Selection(None) => None,
        Signal::Remaining(ns) => {
            let text = format_remaining(*ns);
            (!text.is_empty()).then_some(text)
        }
        Signal::Error(message) => Some(format!("error: {message}")),
    }
}

/// The playlist as numbered rows. `>` marks the selection and `*` the
/// loaded track.
pub fn playlist_lines(
    playlist: &PlaylistSequence,
    current_uri: Option<&str>,
    library: &LibrarySettings,
) -> Vec<String> {
    if playlist.is_empty() {
        return vec!["(playlist is empty)".to_string()];
    }
    let selected = playlist.selected_index();
    let mut lines: Vec<String> = playlist
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let cursor = if selected == Some(i) { '>' } else { ' ' };
            let playing = if current_uri == Some(track.uri()) { '*' } else { ' ' };
            format!(
                "{cursor}{playing}{:>3}. {} [{}]",
                i + 1,
                label(track, library),
                format_clock(track.duration_ns())
            )
        })
        .collect();

    let parts: Vec<String> = [
        Some(format!("{} tracks", playlist.len())),
        Some(format_remaining(playlist.total_remaining_duration())).filter(|s| !s.is_empty()),
    ]
    .into_iter()
    .flatten()
    .collect();
    lines.push(parts.join(" • "));
    lines
}
