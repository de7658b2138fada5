use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::config::Settings;
use crate::dispatch::{Dispatch, DispatchTx};
use crate::importer::{CatalogImporter, spawn_import};
use crate::library::{DiscoveryRequest, spawn_folder_scan};
use crate::metadata::Resolver;
use crate::playback::{EventRx, MediaBackend, PlaybackSession, SessionState, Signal};
use crate::playlist::{load_playlist, save_playlist};

use super::commands::{Command, HELP};
use super::status;

/// Upper bound on how long the loop sleeps without checking backend events.
const IDLE_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Owns the session on the controlling thread and applies everything that
/// arrives from the backend, the workers and the input thread.
pub struct Controller<B> {
    session: PlaybackSession<B>,
    settings: Settings,
    resolver: Arc<Resolver>,
    importer: Option<Arc<dyn CatalogImporter>>,
    dispatch_tx: DispatchTx,
}

impl<B: MediaBackend> Controller<B> {
    pub fn new(
        session: PlaybackSession<B>,
        settings: Settings,
        resolver: Arc<Resolver>,
        importer: Option<Arc<dyn CatalogImporter>>,
        dispatch_tx: DispatchTx,
    ) -> Self {
        Self {
            session,
            settings,
            resolver,
            importer,
            dispatch_tx,
        }
    }

    pub fn session(&self) -> &PlaybackSession<B> {
        &self.session
    }

    /// Queue a folder scan or a single resolution for `target`. Results
    /// arrive later as dispatches.
    pub fn add(&self, target: &str) {
        let path = Path::new(target);
        if !target.contains("://") && path.is_dir() {
            spawn_folder_scan(
                path.to_path_buf(),
                self.settings.library.clone(),
                Arc::clone(&self.resolver),
                self.dispatch_tx.clone(),
            );
        } else {
            debug!(target, "queued for discovery");
            self.resolver
                .resolve_async(DiscoveryRequest::from_uri(target), self.dispatch_tx.clone());
        }
    }

    pub fn apply(&mut self, msg: Dispatch) -> Flow {
        match msg {
            Dispatch::Append(track) => {
                let index = self.session.append(track);
                debug!(index, "appended");
            }
            Dispatch::DiscoveryFailed { uri, error } => {
                println!("could not add {uri}: {error}");
            }
            Dispatch::ScanFinished(summary) => {
                println!(
                    "added {} of {} files from {}",
                    summary.added,
                    summary.found,
                    summary.root.display()
                );
            }
            Dispatch::ImportFinished(summary) => {
                info!(
                    album = %summary.album_id,
                    added = summary.added,
                    skipped = summary.skipped,
                    "catalog import finished"
                );
                println!("imported {} tracks", summary.added);
            }
            Dispatch::ImportFailed { album, error } => {
                println!("could not import {album}: {error}");
            }
            Dispatch::Command(cmd) => return self.execute(cmd),
        }
        Flow::Continue
    }

    fn execute(&mut self, cmd: Command) -> Flow {
        match cmd {
            Command::Add(target) => self.add(&target),
            Command::Import(album_id) => match &self.importer {
                Some(importer) => {
                    spawn_import(Arc::clone(importer), album_id, self.dispatch_tx.clone());
                }
                None => println!("no catalog importer configured"),
            },
            Command::Play(Some(index)) => {
                if !self.session.activate(index) {
                    println!("no entry {}", index + 1);
                }
            }
            Command::Play(None) => self.resume_or_start(),
            Command::Toggle => match self.session.state() {
                SessionState::Stopped => self.resume_or_start(),
                _ => self.session.toggle_play_pause(),
            },
            Command::Next => self.session.next(),
            Command::Prev => self.session.previous(),
            Command::Seek(secs) => {
                if self.session.current_uri().is_some() {
                    self.session.seek_to_secs(secs);
                } else {
                    println!("nothing is playing");
                }
            }
            Command::SeekPercent(percent) => {
                if self.session.current_uri().is_some() {
                    self.session.seek_to_percent(percent);
                } else {
                    println!("nothing is playing");
                }
            }
            Command::Select(index) => {
                if !self.session.select(index) {
                    println!("no entry {}", index + 1);
                }
            }
            Command::Remove(index) => match self.session.remove(index) {
                Some(track) => println!("removed {}", track.title()),
                None => println!("no entry {}", index + 1),
            },
            Command::List => {
                let lines = status::playlist_lines(
                    self.session.playlist(),
                    self.session.current_uri(),
                    &self.settings.library,
                );
                for line in lines {
                    println!("{line}");
                }
            }
            Command::Open(path) => match load_playlist(&path) {
                Ok(tracks) => {
                    info!(path = %path.display(), tracks = tracks.len(), "playlist opened");
                    self.session.replace_playlist(tracks);
                }
                Err(e) => {
                    warn!(error = %e, "open failed");
                    println!("could not open {}: {e}", path.display());
                }
            },
            Command::Save(path) => {
                let path = path.or_else(|| self.settings.playlist_path());
                match path {
                    Some(path) => {
                        if let Err(e) = save_playlist(&path, self.session.playlist().iter()) {
                            error!(error = %e, "save failed");
                            println!("could not save {}: {e}", path.display());
                        }
                    }
                    None => println!("no playlist file configured; give a path"),
                }
            }
            Command::Stop => self.session.stop(),
            Command::Help => println!("{HELP}"),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    fn resume_or_start(&mut self) {
        match self.session.state() {
            SessionState::Paused => self.session.toggle_play_pause(),
            SessionState::Stopped => {
                if !self.session.play_selected() {
                    println!("playlist is empty");
                }
            }
            SessionState::Playing | SessionState::Loading | SessionState::ErrorRecovery => {}
        }
    }

    fn render(&self, signals: &Receiver<Signal>) {
        let batch = status::coalesce(signals.try_iter().collect());
        for signal in &batch {
            if let Some(line) =
                status::signal_line(signal, self.session.playlist(), &self.settings.library)
            {
                println!("{line}");
            }
        }
    }

    /// Stop playback and save the playlist if autosave is on.
    pub fn shutdown(&mut self) {
        self.session.stop();
        if !self.settings.playlist.autosave {
            return;
        }
        match self.settings.playlist_path() {
            Some(path) => {
                if let Err(e) = save_playlist(&path, self.session.playlist().iter()) {
                    error!(error = %e, "failed to save playlist on exit");
                }
            }
            None => warn!("no playlist path available; playlist not saved"),
        }
    }

    /// Run until a `Quit` command arrives or every dispatch sender is gone.
    pub fn run(
        mut self,
        events: EventRx,
        dispatch: Receiver<Dispatch>,
        signals: Receiver<Signal>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        loop {
            while let Ok(event) = events.try_recv() {
                self.session.handle_event(event);
            }
            self.session.poll_timer(Instant::now());
            self.render(&signals);

            let wait = self
                .session
                .next_deadline()
                .map(|d| d.saturating_duration_since(Instant::now()).min(IDLE_POLL))
                .unwrap_or(IDLE_POLL);

            let flow = match dispatch.recv_timeout(wait) {
                Ok(msg) => {
                    let mut flow = self.apply(msg);
                    while flow == Flow::Continue {
                        match dispatch.try_recv() {
                            Ok(msg) => flow = self.apply(msg),
                            Err(_) => break,
                        }
                    }
                    flow
                }
                Err(RecvTimeoutError::Timeout) => Flow::Continue,
                Err(RecvTimeoutError::Disconnected) => Flow::Quit,
            };
            if flow == Flow::Quit {
                break;
            }
        }

        info!("shutting down");
        self.shutdown();
        self.render(&signals);
        Ok(())
    }
}
