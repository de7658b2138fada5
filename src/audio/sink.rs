//! Opening a URI as a rodio source and wrapping it in a paused `Sink`.

use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use crate::error::{BackendError, SourceError};
use crate::library::{FetchOptions, MediaSource};

pub(super) fn open_decoder(
    uri: &str,
    fetch: FetchOptions,
) -> Result<Decoder<MediaSource>, BackendError> {
    let source = MediaSource::open(uri, fetch).map_err(|e| match e {
        SourceError::Unsupported(u) => BackendError::UnsupportedUri(u),
        other => BackendError::Open {
            uri: uri.to_string(),
            message: other.to_string(),
        },
    })?;

    Decoder::new(source).map_err(|e| BackendError::Decode {
        uri: uri.to_string(),
        message: e.to_string(),
    })
}

/// Create a paused `Sink` for `uri`, along with the container's duration
/// when it is known.
pub(super) fn create_sink(
    stream: &OutputStream,
    uri: &str,
    fetch: FetchOptions,
) -> Result<(Sink, Option<Duration>), BackendError> {
    let decoder = open_decoder(uri, fetch)?;
    let duration = decoder.total_duration().filter(|d| !d.is_zero());

    let sink = Sink::connect_new(stream.mixer());
    sink.pause();
    sink.append(decoder);
    Ok((sink, duration))
}
