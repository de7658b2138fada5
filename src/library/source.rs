//! Opening a URI as a seekable byte source.
//!
//! Both the rodio backend and the container prober read media through
//! `MediaSource`: local files are streamed from disk, remote streams are
//! fetched into memory up to a size cap.

use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;
use std::time::Duration;

use tracing::warn;

use crate::config::DiscoverySettings;
use crate::error::SourceError;

use super::uri::{is_remote, uri_to_path};

#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub limit_bytes: u64,
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            limit_bytes: 64 * 1024 * 1024,
            timeout: Duration::from_secs(10),
        }
    }
}

impl From<&DiscoverySettings> for FetchOptions {
    fn from(settings: &DiscoverySettings) -> Self {
        Self {
            limit_bytes: settings.remote_fetch_limit_bytes,
            timeout: Duration::from_millis(settings.probe_timeout_ms),
        }
    }
}

pub enum MediaSource {
    File(BufReader<File>),
    Memory(Cursor<Vec<u8>>),
}

impl MediaSource {
    /// Open `uri`. Accepts `file://` URIs, `http(s)://` URIs and bare paths.
    pub fn open(uri: &str, opts: FetchOptions) -> Result<Self, SourceError> {
        if is_remote(uri) {
            return fetch(uri, opts).map(|bytes| MediaSource::Memory(Cursor::new(bytes)));
        }

        let path = if uri.contains("://") {
            uri_to_path(uri).ok_or_else(|| SourceError::Unsupported(uri.to_string()))?
        } else {
            Path::new(uri).to_path_buf()
        };

        let file = File::open(&path).map_err(|source| SourceError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(MediaSource::File(BufReader::new(file)))
    }
}

fn fetch(uri: &str, opts: FetchOptions) -> Result<Vec<u8>, SourceError> {
    let agent = ureq::AgentBuilder::new().timeout(opts.timeout).build();
    let response = agent.get(uri).call().map_err(|e| SourceError::Fetch {
        uri: uri.to_string(),
        message: e.to_string(),
    })?;

    read_capped(response.into_reader(), uri, opts.limit_bytes).map_err(|e| SourceError::Fetch {
        uri: uri.to_string(),
        message: e.to_string(),
    })
}

/// Read at most `limit_bytes`. A body that fills the cap is assumed to have
/// been cut short and is logged.
pub(crate) fn read_capped(
    reader: impl Read,
    uri: &str,
    limit_bytes: u64,
) -> io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    reader.take(limit_bytes).read_to_end(&mut bytes)?;
    if bytes.len() as u64 == limit_bytes {
        warn!(
            uri,
            limit_bytes,
            "remote stream hit the fetch cap; playback will end early"
        );
    }
    Ok(bytes)
}

impl Read for MediaSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            MediaSource::File(r) => r.read(buf),
            MediaSource::Memory(r) => r.read(buf),
        }
    }
}

impl Seek for MediaSource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            MediaSource::File(r) => r.seek(pos),
            MediaSource::Memory(r) => r.seek(pos),
        }
    }
}
