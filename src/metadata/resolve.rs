use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::config::DiscoverySettings;
use crate::dispatch::Dispatch;
use crate::error::ProbeError;
use crate::library::{DiscoveryRequest, Track};

use super::merge::merge;
use super::probe::TimedProber;
use super::tags::{LoftyTagReader, TagReader, TagReport};

/// Runs the tag reader and the prober for one request and merges them.
pub struct Resolver {
    tags: Arc<dyn TagReader>,
    prober: TimedProber,
}

impl Resolver {
    pub fn new(tags: Arc<dyn TagReader>, prober: TimedProber) -> Self {
        Self { tags, prober }
    }

    pub fn from_settings(settings: &DiscoverySettings) -> Self {
        Self::new(
            Arc::new(LoftyTagReader),
            TimedProber::from_settings(settings),
        )
    }

    /// Resolve fully on the calling thread. A prober failure means no track.
    pub fn resolve(&self, request: &DiscoveryRequest) -> Result<Track, ProbeError> {
        let probed = self.prober.probe(&request.uri)?;
        let tags = request
            .path
            .as_deref()
            .map(|p| self.tags.read(p))
            .unwrap_or_else(TagReport::default);

        let track = merge(&request.uri, tags, probed);
        debug!(
            uri = track.uri(),
            title = track.title(),
            artist = track.artist(),
            duration_ns = track.duration_ns(),
            artwork = track.artwork().is_some(),
            "resolved"
        );
        Ok(track)
    }

    /// Resolve on a worker thread and dispatch the outcome to the
    /// controlling thread. Concurrent requests complete in any order.
    pub fn resolve_async(
        self: &Arc<Self>,
        request: DiscoveryRequest,
        tx: Sender<Dispatch>,
    ) -> JoinHandle<()> {
        let resolver = Arc::clone(self);
        thread::spawn(move || {
            let msg = match resolver.resolve(&request) {
                Ok(track) => Dispatch::Append(track),
                Err(error) => {
                    warn!(uri = %request.uri, %error, "discovery failed");
                    Dispatch::DiscoveryFailed {
                        uri: request.uri,
                        error,
                    }
                }
            };
            let _ = tx.send(msg);
        })
    }
}
