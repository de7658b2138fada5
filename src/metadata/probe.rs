//! Container probing: tags and duration read from the media container of
//! any URI, local or remote.

use std::io;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use lofty::error::{ErrorKind, LoftyError};
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::Tag;
use tracing::debug;

use crate::config::DiscoverySettings;
use crate::error::{ProbeError, ProbeErrorKind, SourceError};
use crate::library::{FetchOptions, MediaSource};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeReport {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub duration_ns: Option<u64>,
}

pub trait Prober: Send + Sync {
    fn probe(&self, uri: &str) -> Result<ProbeReport, ProbeError>;
}

/// Prober that reads the container through `lofty`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyProber {
    fetch: FetchOptions,
}

impl LoftyProber {
    pub fn new(fetch: FetchOptions) -> Self {
        Self { fetch }
    }
}

fn source_error(e: SourceError) -> ProbeError {
    let kind = match &e {
        SourceError::Unsupported(_) => ProbeErrorKind::InvalidUri,
        SourceError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound => {
            ProbeErrorKind::InvalidUri
        }
        _ => ProbeErrorKind::Other,
    };
    ProbeError::new(kind, e.to_string())
}

fn lofty_error(e: LoftyError) -> ProbeError {
    let kind = if matches!(e.kind(), ErrorKind::UnknownFormat) {
        ProbeErrorKind::MissingCodec
    } else {
        ProbeErrorKind::Other
    };
    ProbeError::new(kind, e.to_string())
}

fn first_non_empty(tags: &[Tag], get: impl Fn(&Tag) -> Option<String>) -> Option<String> {
    tags.iter()
        .filter_map(get)
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

impl Prober for LoftyProber {
    fn probe(&self, uri: &str) -> Result<ProbeReport, ProbeError> {
        let source = MediaSource::open(uri, self.fetch).map_err(source_error)?;
        let tagged = Probe::new(source)
            .guess_file_type()
            .map_err(|e| ProbeError::new(ProbeErrorKind::Other, e.to_string()))?
            .read()
            .map_err(lofty_error)?;

        Ok(ProbeReport {
            title: first_non_empty(tagged.tags(), |t| t.title().map(|v| v.into_owned())),
            artist: first_non_empty(tagged.tags(), |t| t.artist().map(|v| v.into_owned())),
            duration_ns: u64::try_from(tagged.properties().duration().as_nanos()).ok(),
        })
    }
}

/// Counting semaphore over probe workers.
struct Slots {
    used: Mutex<usize>,
    freed: Condvar,
}

impl Slots {
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.used.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Wait up to `timeout` for a free slot.
    fn acquire(self: &Arc<Self>, max: usize, timeout: Duration) -> Option<InFlight> {
        let used = self.lock();
        let (mut used, waited) = self
            .freed
            .wait_timeout_while(used, timeout, |used| *used >= max)
            .unwrap_or_else(|e| e.into_inner());
        if waited.timed_out() && *used >= max {
            return None;
        }
        *used += 1;
        Some(InFlight(Arc::clone(self)))
    }
}

struct InFlight(Arc<Slots>);

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut used = self.0.lock();
        *used = used.saturating_sub(1);
        drop(used);
        self.0.freed.notify_one();
    }
}

/// Runs each probe on its own worker thread with a fixed timeout.
///
/// At most `max_in_flight` workers run at once; further requests queue for
/// a free slot for up to one timeout and fail with `Busy` only if none frees
/// up. A probe that outlives its timeout keeps its slot until its thread
/// actually returns.
#[derive(Clone)]
pub struct TimedProber {
    inner: Arc<dyn Prober>,
    timeout: Duration,
    max_in_flight: usize,
    slots: Arc<Slots>,
}

impl TimedProber {
    pub fn new(inner: Arc<dyn Prober>, timeout: Duration, max_in_flight: usize) -> Self {
        Self {
            inner,
            timeout,
            max_in_flight: max_in_flight.max(1),
            slots: Arc::new(Slots {
                used: Mutex::new(0),
                freed: Condvar::new(),
            }),
        }
    }

    pub fn from_settings(settings: &DiscoverySettings) -> Self {
        let fetch = FetchOptions::from(settings);
        Self::new(
            Arc::new(LoftyProber::new(fetch)),
            fetch.timeout,
            settings.max_in_flight,
        )
    }

    #[cfg(test)]
    pub fn in_flight(&self) -> usize {
        *self.slots.lock()
    }

    pub fn probe(&self, uri: &str) -> Result<ProbeReport, ProbeError> {
        let Some(guard) = self.slots.acquire(self.max_in_flight, self.timeout) else {
            debug!(uri, max_in_flight = self.max_in_flight, "no probe slot freed up");
            return Err(ProbeError::new(
                ProbeErrorKind::Busy,
                format!(
                    "{} probes still in flight after {}ms",
                    self.max_in_flight,
                    self.timeout.as_millis()
                ),
            ));
        };

        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let owned_uri = uri.to_string();
        thread::spawn(move || {
            let _guard = guard;
            let _ = tx.send(inner.probe(&owned_uri));
        });

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                debug!(uri, timeout_ms = self.timeout.as_millis() as u64, "probe timed out");
                Err(ProbeError::new(
                    ProbeErrorKind::Timeout,
                    format!("no answer within {}ms", self.timeout.as_millis()),
                ))
            }
            Err(RecvTimeoutError::Disconnected) => Err(ProbeError::new(
                ProbeErrorKind::Other,
                "probe worker exited without a result",
            )),
        }
    }
}
