//! Error types shared across the player.
//!
//! Each seam gets its own enum so callers can decide what is fatal. Only
//! backend errors ever reach the user; everything else is logged and the
//! affected track or file is skipped.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("unsupported uri: {0}")]
    Unsupported(String),
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("fetching {uri} failed: {message}")]
    Fetch { uri: String, message: String },
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("no audio output device: {0}")]
    NoDevice(String),
    #[error("unsupported uri: {0}")]
    UnsupportedUri(String),
    #[error("failed to open {uri}: {message}")]
    Open { uri: String, message: String },
    #[error("failed to decode {uri}: {message}")]
    Decode { uri: String, message: String },
    #[error("seek rejected: {0}")]
    Seek(String),
    #[error("nothing is loaded")]
    NotLoaded,
    #[error("audio thread is gone")]
    Disconnected,
}

/// Why the container prober gave up on a URI.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProbeErrorKind {
    InvalidUri,
    MissingCodec,
    Timeout,
    Busy,
    Other,
}

impl fmt::Display for ProbeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProbeErrorKind::InvalidUri => "invalid uri",
            ProbeErrorKind::MissingCodec => "missing codec",
            ProbeErrorKind::Timeout => "timeout",
            ProbeErrorKind::Busy => "busy",
            ProbeErrorKind::Other => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct ProbeError {
    pub kind: ProbeErrorKind,
    pub message: String,
}

impl ProbeError {
    pub fn new(kind: ProbeErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("playlist file {} does not exist", path.display())]
    Missing { path: PathBuf },
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed playlist json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("playlist root is not a list")]
    NotAList,
}

#[derive(Debug, Clone, Error)]
pub enum ImportError {
    #[error("catalog import failed for {album}: {message}")]
    Listing { album: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("{0} needs an argument")]
    MissingArgument(&'static str),
    #[error("not a number: {0}")]
    InvalidNumber(String),
    #[error("positions start at 1")]
    ZeroIndex,
}
