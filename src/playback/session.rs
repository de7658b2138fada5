use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::config::PlaybackSettings;
use crate::library::{NANOS_PER_SEC, Track};
use crate::playlist::PlaylistSequence;

use super::backend::{BackendEvent, BackendState, LoadId, MediaBackend};
use super::progress::{ProgressTimer, SeekGesture};
use super::signal::Signal;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
    Stopped,
    /// A URI was handed to the backend; playback not confirmed yet.
    Loading,
    Playing,
    Paused,
    /// Transient: a fatal error is being cleaned up. Always ends in `Stopped`.
    ErrorRecovery,
}

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub tick_interval: Duration,
    /// Delay before polling resumes after a seek.
    pub seek_settle: Duration,
    /// "Previous" restarts the current track past this position.
    pub restart_threshold: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            seek_settle: Duration::from_millis(100),
            restart_threshold: Duration::from_secs(3),
        }
    }
}

impl From<&PlaybackSettings> for SessionOptions {
    fn from(s: &PlaybackSettings) -> Self {
        Self {
            tick_interval: Duration::from_millis(s.tick_interval_ms),
            seek_settle: Duration::from_millis(s.seek_settle_ms),
            restart_threshold: Duration::from_millis(s.restart_threshold_ms),
        }
    }
}

/// One playback session: the playlist, the backend, and everything known
/// about what is playing.
///
/// The now-playing track is remembered by URI only and looked up in the
/// playlist on demand. Any change that removes the last entry with that URI
/// also resets the session, so the reference never dangles.
pub struct PlaybackSession<B> {
    backend: B,
    playlist: PlaylistSequence,
    state: SessionState,
    current_uri: Option<String>,
    /// Id of the most recent `load`; events tagged otherwise are stale.
    load_id: LoadId,
    position_ns: u64,
    duration_ns: u64,
    seek: SeekGesture,
    timer: ProgressTimer,
    options: SessionOptions,
    signals: Sender<Signal>,
}

impl<B: MediaBackend> PlaybackSession<B> {
    pub fn new(
        backend: B,
        playlist: PlaylistSequence,
        options: SessionOptions,
        signals: Sender<Signal>,
    ) -> Self {
        Self {
            backend,
            playlist,
            state: SessionState::Stopped,
            current_uri: None,
            load_id: 0,
            position_ns: 0,
            duration_ns: 0,
            seek: SeekGesture::default(),
            timer: ProgressTimer::new(options.tick_interval),
            options,
            signals,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn position_ns(&self) -> u64 {
        self.position_ns
    }

    pub fn duration_ns(&self) -> u64 {
        self.duration_ns
    }

    #[cfg(test)]
    pub fn is_seeking(&self) -> bool {
        self.seek.is_active()
    }

    #[cfg(test)]
    pub fn was_playing_before_seek(&self) -> bool {
        self.seek.was_playing()
    }

    pub fn playlist(&self) -> &PlaylistSequence {
        &self.playlist
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[cfg(test)]
    pub fn timer_running(&self) -> bool {
        self.timer.is_running()
    }

    /// When the controlling loop should call `tick` next.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.next_deadline()
    }

    pub fn current_uri(&self) -> Option<&str> {
        self.current_uri.as_deref()
    }

    /// The playlist entry for the loaded URI, if it is still there.
    #[cfg(test)]
    pub fn current_track(&self) -> Option<&Track> {
        let uri = self.current_uri.as_deref()?;
        self.playlist
            .position_of_uri(uri)
            .and_then(|i| self.playlist.get(i))
    }

    fn emit(&self, signal: Signal) {
        // A closed receiver only means nobody is rendering.
        let _ = self.signals.send(signal);
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "session state");
            self.state = state;
            self.emit(Signal::State(state));
        }
    }

    fn publish_progress(&self, position_ns: u64) {
        self.emit(Signal::Progress {
            position_ns,
            duration_ns: self.duration_ns,
        });
    }

    fn publish_selection(&self) {
        self.emit(Signal::Selection(self.playlist.selected_index()));
        self.emit(Signal::Remaining(self.playlist.total_remaining_duration()));
    }

    fn start_timer(&mut self) {
        if self.timer.start(Instant::now()) {
            debug!(
                interval_ms = self.timer.interval().as_millis() as u64,
                "progress timer started"
            );
        }
    }

    fn reset_playback(&mut self) {
        self.timer.stop();
        self.current_uri = None;
        self.position_ns = 0;
        self.duration_ns = 0;
    }

    /// Reset to `Stopped` after the backend has been told to stop.
    fn settle_stopped(&mut self) {
        if let Err(e) = self.backend.stop() {
            warn!(error = %e, "backend refused to stop");
        }
        self.reset_playback();
        self.set_state(SessionState::Stopped);
        self.emit(Signal::NowPlaying(None));
        self.publish_progress(0);
    }

    fn fail(&mut self, message: &str) {
        error!(uri = ?self.current_uri, message, "playback failed");
        self.set_state(SessionState::ErrorRecovery);
        self.settle_stopped();
        self.emit(Signal::Error(message.to_string()));
    }

    /// Hand `track` to the backend and start it. Any previous track is
    /// replaced; the session waits in `Loading` until the backend confirms.
    pub fn load_and_play(&mut self, track: &Track) {
        info!(uri = track.uri(), title = track.title(), "loading");
        self.timer.stop();
        self.current_uri = Some(track.uri().to_string());
        self.position_ns = 0;
        self.duration_ns = 0;
        self.set_state(SessionState::Loading);
        self.emit(Signal::NowPlaying(Some(track.clone())));
        self.publish_progress(0);

        self.load_id = self.load_id.wrapping_add(1);
        let started = self
            .backend
            .load(track.uri(), self.load_id)
            .and_then(|()| self.backend.play());
        if let Err(e) = started {
            self.fail(&e.to_string());
        }
    }

    pub fn toggle_play_pause(&mut self) {
        match self.state {
            SessionState::Playing => match self.backend.pause() {
                Ok(()) => {
                    self.timer.stop();
                    self.set_state(SessionState::Paused);
                }
                Err(e) => self.fail(&e.to_string()),
            },
            SessionState::Paused => match self.backend.play() {
                Ok(()) => {
                    self.set_state(SessionState::Playing);
                    self.start_timer();
                }
                Err(e) => self.fail(&e.to_string()),
            },
            SessionState::Stopped | SessionState::Loading | SessionState::ErrorRecovery => {
                debug!(state = ?self.state, "play/pause ignored");
            }
        }
    }

    pub fn stop(&mut self) {
        if self.state != SessionState::Stopped || self.current_uri.is_some() {
            info!("stopping playback");
        }
        self.settle_stopped();
    }

    /// Apply one backend event. Must run on the controlling thread.
    pub fn handle_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::StateChanged { old, new } => {
                debug!(?old, ?new, "backend state changed");
                match (new, self.state) {
                    (BackendState::Playing, SessionState::Loading | SessionState::Paused) => {
                        self.set_state(SessionState::Playing);
                        self.start_timer();
                    }
                    (BackendState::Playing, SessionState::Playing) => self.start_timer(),
                    (BackendState::Paused, SessionState::Playing) => {
                        self.timer.stop();
                        self.set_state(SessionState::Paused);
                    }
                    _ => {}
                }
            }
            BackendEvent::DurationChanged => self.refresh_duration(),
            BackendEvent::Error { load, message } => {
                if self.is_current_load(load) {
                    self.fail(&message);
                } else {
                    debug!(load, error = %message, "dropping error for a replaced stream");
                }
            }
            BackendEvent::EndOfStream { load } => {
                if self.is_current_load(load) {
                    self.on_end_of_stream();
                } else {
                    debug!(load, current = self.load_id, "dropping stale end of stream");
                }
            }
        }
    }

    /// True when `load` is the stream the session is still holding. After a
    /// stop nothing is held, so late events from the old stream are ignored.
    fn is_current_load(&self, load: LoadId) -> bool {
        load == self.load_id && self.current_uri.is_some()
    }

    /// Id handed to the backend with the most recent load.
    #[cfg(test)]
    pub fn load_id(&self) -> LoadId {
        self.load_id
    }

    fn refresh_duration(&mut self) {
        let Some(duration) = self.backend.query_duration().filter(|d| *d > 0) else {
            return;
        };
        if duration != self.duration_ns {
            debug!(duration_ns = duration, "duration known");
            self.duration_ns = duration;
            if !self.seek.is_active() {
                self.publish_progress(self.position_ns);
            }
        }
    }

    fn on_end_of_stream(&mut self) {
        info!(uri = ?self.current_uri, "end of stream");
        self.settle_stopped();

        let Some(index) = self.playlist.select_next() else {
            debug!("end of playlist");
            return;
        };
        self.publish_selection();
        if let Some(next) = self.playlist.get(index).cloned() {
            self.load_and_play(&next);
        }
    }

    /// Move the selection forward. Never starts playback on its own.
    pub fn next(&mut self) {
        if self.playlist.select_next().is_some() {
            self.publish_selection();
        }
    }

    /// Restart the current track when it is past the restart threshold,
    /// otherwise move the selection back one entry.
    pub fn previous(&mut self) {
        if matches!(self.state, SessionState::Playing | SessionState::Paused) {
            let position = self.backend.query_position().unwrap_or(self.position_ns);
            let threshold =
                u64::try_from(self.options.restart_threshold.as_nanos()).unwrap_or(u64::MAX);
            if position > threshold {
                match self.backend.seek(0, false) {
                    Ok(()) => {
                        debug!(from_ns = position, "restarting current track");
                        self.position_ns = 0;
                        self.publish_progress(0);
                    }
                    Err(e) => warn!(error = %e, "restart seek failed"),
                }
                return;
            }
        }
        if self.playlist.select_previous().is_some() {
            self.publish_selection();
        }
    }

    /// Poll the backend clock if the progress timer is due.
    pub fn poll_timer(&mut self, now: Instant) {
        if self.timer.is_due(now) {
            self.tick(now);
        }
    }

    /// One progress tick.
    ///
    /// While a seek drag is active the tick only keeps the timer alive, so the
    /// drag label is not overwritten. Outside `Playing` the timer stops.
    pub fn tick(&mut self, now: Instant) {
        if !self.timer.is_running() {
            return;
        }
        if self.seek.is_active() {
            self.timer.rearm(now);
            return;
        }
        if self.state != SessionState::Playing {
            debug!(state = ?self.state, "progress timer stopped");
            self.timer.stop();
            return;
        }

        if let Some(position) = self.backend.query_position() {
            self.position_ns = position;
        }
        if self.duration_ns == 0 {
            if let Some(duration) = self.backend.query_duration().filter(|d| *d > 0) {
                self.duration_ns = duration;
            }
        }
        self.publish_progress(self.position_ns);
        self.timer.rearm(now);
    }

    pub fn begin_seek(&mut self) {
        let was_playing = self.state == SessionState::Playing;
        self.seek.begin(was_playing, self.position_ns);
        self.timer.stop();
        debug!(was_playing, "seek drag started");
    }

    /// Track the drag. `start_x + offset_x` is the pointer position on a seek
    /// control `width` wide. Publishes the live target; the backend is not
    /// touched until `end_seek`.
    pub fn update_seek(&mut self, start_x: f64, offset_x: f64, width: f64) -> Option<u64> {
        let target = self.seek.update(start_x, offset_x, width, self.duration_ns)?;
        self.publish_progress(target);
        Some(target)
    }

    /// Commit the drag with a flush + key-unit seek, then resume polling
    /// after a short settle delay.
    pub fn end_seek(&mut self) {
        let Some(target) = self.seek.end() else {
            return;
        };
        let now = Instant::now();

        if self.duration_ns == 0 {
            debug!("duration unknown; seek dropped");
            if self.state == SessionState::Playing {
                self.start_timer();
            }
            return;
        }

        match self.backend.seek(target, false) {
            Ok(()) => debug!(target_ns = target, "seek issued"),
            Err(e) => warn!(target_ns = target, error = %e, "seek failed"),
        }
        self.position_ns = target;
        self.publish_progress(target);

        debug!(
            was_playing = self.seek.was_playing(),
            delay_ms = self.options.seek_settle.as_millis() as u64,
            "progress timer restarts after seek"
        );
        self.timer.restart_after(now, self.options.seek_settle);
    }

    /// Seek straight to `position_ns` as a one-step drag.
    pub fn seek_to(&mut self, position_ns: u64) {
        self.begin_seek();
        self.seek.set_target(position_ns, self.duration_ns);
        self.end_seek();
    }

    /// Drag from the start of a 0..100 seek bar to `percent`, as a pointer
    /// would. Nothing is issued while the duration is unknown.
    pub fn seek_to_percent(&mut self, percent: u8) {
        self.begin_seek();
        self.update_seek(0.0, f64::from(percent.min(100)), 100.0);
        self.end_seek();
    }

    /// Seek to a whole number of seconds.
    pub fn seek_to_secs(&mut self, secs: u64) {
        self.seek_to(secs.saturating_mul(NANOS_PER_SEC));
    }

    pub fn select(&mut self, index: usize) -> bool {
        let ok = self.playlist.select(index);
        if ok {
            self.publish_selection();
        }
        ok
    }

    /// Select `index` and play it.
    pub fn activate(&mut self, index: usize) -> bool {
        if !self.select(index) {
            return false;
        }
        match self.playlist.get(index).cloned() {
            Some(track) => {
                self.load_and_play(&track);
                true
            }
            None => false,
        }
    }

    /// Play the selected entry, or the first one when nothing is selected.
    pub fn play_selected(&mut self) -> bool {
        let index = self.playlist.selected_index().unwrap_or(0);
        self.activate(index)
    }

    pub fn append(&mut self, track: Track) -> usize {
        let index = self.playlist.append(track);
        self.emit(Signal::Remaining(self.playlist.total_remaining_duration()));
        index
    }

    /// Remove an entry. Removing the last copy of the loaded track stops
    /// playback.
    pub fn remove(&mut self, index: usize) -> Option<Track> {
        let removed = self.playlist.remove_at(index)?;
        let was_current = self.current_uri.as_deref() == Some(removed.uri());
        if was_current && !self.playlist.contains_uri(removed.uri()) {
            info!(uri = removed.uri(), "now-playing track removed");
            self.stop();
        }
        self.publish_selection();
        Some(removed)
    }

    /// Swap in a whole new playlist, stopping playback first.
    pub fn replace_playlist(&mut self, tracks: Vec<Track>) {
        self.stop();
        self.playlist.replace(tracks);
        self.publish_selection();
    }
}
