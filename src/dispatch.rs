//! Messages handed to the controlling thread.
//!
//! Worker threads never touch the playlist; they send one of these and the
//! controlling loop applies it. A single sender's messages arrive in the
//! order they were sent.

use std::sync::mpsc::Sender;

use crate::error::{ImportError, ProbeError};
use crate::importer::ImportSummary;
use crate::library::{ScanSummary, Track};
use crate::runtime::Command;

#[derive(Debug)]
pub enum Dispatch {
    /// A resolved track to append to the playlist.
    Append(Track),
    /// Resolution failed; nothing is appended.
    DiscoveryFailed { uri: String, error: ProbeError },
    ScanFinished(ScanSummary),
    ImportFinished(ImportSummary),
    /// The catalog could not list the album; nothing was appended.
    ImportFailed { album: String, error: ImportError },
    /// A user command read off the input thread.
    Command(Command),
}

pub type DispatchTx = Sender<Dispatch>;
