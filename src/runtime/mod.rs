use std::env;
use std::sync::{Arc, mpsc};

use tracing::{info, warn};

use crate::audio::RodioBackend;
use crate::library::FetchOptions;
use crate::metadata::Resolver;
use crate::playback::{PlaybackSession, SessionOptions, event_channel};

mod commands;
mod event_loop;
mod settings;
mod startup;
mod status;

pub use commands::Command;


pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_problem) = settings::load_settings();
    startup::init_tracing(&settings.logging);
    if let Some(problem) = config_problem {
        warn!("{problem}");
    }

    let (event_tx, event_rx) = event_channel(settings.playback.event_queue_capacity);
    let backend = RodioBackend::new(event_tx, FetchOptions::from(&settings.discovery))?;

    let (signal_tx, signal_rx) = mpsc::channel();
    let session = PlaybackSession::new(
        backend,
        startup::initial_playlist(&settings),
        SessionOptions::from(&settings.playback),
        signal_tx,
    );

    let (dispatch_tx, dispatch_rx) = mpsc::channel();
    let resolver = Arc::new(Resolver::from_settings(&settings.discovery));
    // No catalog scraper ships with the player; `import` reports that.
    let controller =
        event_loop::Controller::new(session, settings, resolver, None, dispatch_tx.clone());

    for target in env::args().skip(1) {
        controller.add(&target);
    }
    info!(
        tracks = controller.session().playlist().len(),
        "ready; type 'help' for commands"
    );
    commands::spawn_input_thread(dispatch_tx);

    controller.run(event_rx, dispatch_rx, signal_rx)
}
