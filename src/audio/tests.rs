use super::sink::open_decoder;
use crate::error::BackendError;
use crate::library::{FetchOptions, path_to_uri};
use crate::test_support::write_wav;
use rodio::Source;
use std::time::Duration;

#[test]
fn open_decoder_reads_local_wav_and_reports_duration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone one.wav");
    write_wav(&path, 2);

    let decoder = open_decoder(&path_to_uri(&path), FetchOptions::default()).unwrap();
    assert_eq!(decoder.total_duration(), Some(Duration::from_secs(2)));
}

#[test]
fn open_decoder_accepts_bare_paths() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain.wav");
    write_wav(&path, 1);

    assert!(open_decoder(path.to_str().unwrap(), FetchOptions::default()).is_ok());
}

#[test]
fn open_decoder_maps_failures() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("missing.wav");
    assert!(matches!(
        open_decoder(&path_to_uri(&missing), FetchOptions::default()),
        Err(BackendError::Open { .. })
    ));

    let garbage = dir.path().join("garbage.wav");
    std::fs::write(&garbage, b"definitely not audio").unwrap();
    assert!(matches!(
        open_decoder(&path_to_uri(&garbage), FetchOptions::default()),
        Err(BackendError::Decode { .. })
    ));

    assert!(matches!(
        open_decoder("ftp://example.com/a.mp3", FetchOptions::default()),
        Err(BackendError::UnsupportedUri(_))
    ));
}
