use super::*;
use crate::dispatch::Dispatch;
use crate::error::{ProbeError, ProbeErrorKind};
use crate::library::{DiscoveryRequest, FetchOptions, NANOS_PER_SEC, path_to_uri};
use crate::test_support::write_wav;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

struct FixedTags(TagReport);

impl TagReader for FixedTags {
    fn read(&self, _path: &Path) -> TagReport {
        self.0.clone()
    }
}

struct FixedProbe(Result<ProbeReport, ProbeErrorKind>);

impl Prober for FixedProbe {
    fn probe(&self, _uri: &str) -> Result<ProbeReport, ProbeError> {
        self.0
            .clone()
            .map_err(|kind| ProbeError::new(kind, "fixed"))
    }
}

struct SlowProbe(Duration);

impl Prober for SlowProbe {
    fn probe(&self, _uri: &str) -> Result<ProbeReport, ProbeError> {
        thread::sleep(self.0);
        Ok(ProbeReport::default())
    }
}

/// Tracks how many probes overlap.
#[derive(Default)]
struct CountingProbe {
    running: AtomicUsize,
    peak: AtomicUsize,
}

impl Prober for CountingProbe {
    fn probe(&self, _uri: &str) -> Result<ProbeReport, ProbeError> {
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(30));
        self.running.fetch_sub(1, Ordering::SeqCst);
        Ok(ProbeReport::default())
    }
}

fn timed(prober: impl Prober + 'static) -> TimedProber {
    TimedProber::new(Arc::new(prober), Duration::from_secs(5), 4)
}

fn frame(description: Option<&str>, data: &[u8]) -> ArtFrame {
    ArtFrame {
        description: description.map(str::to_string),
        data: data.to_vec(),
    }
}

#[test]
fn merge_prefers_tag_title_and_probed_duration() {
    let tags = TagReport {
        title: Some("A".into()),
        ..TagReport::default()
    };
    let probed = ProbeReport {
        title: Some("B".into()),
        artist: None,
        duration_ns: Some(120 * NANOS_PER_SEC),
    };

    let t = merge("file:///x/song.mp3", tags, probed);
    assert_eq!(t.title(), "A");
    assert_eq!(t.duration_ns(), 120 * NANOS_PER_SEC);
    assert_eq!(t.artist(), "Unknown Artist");
}

#[test]
fn merge_falls_back_through_prober_and_uri() {
    let probed = ProbeReport {
        title: None,
        artist: Some("Prober Artist".into()),
        duration_ns: None,
    };
    let t = merge(
        "https://cdn.example/Some%20Track.ogg?x=1",
        TagReport {
            title: Some("  ".into()),
            duration_ns: Some(0),
            ..TagReport::default()
        },
        probed,
    );
    assert_eq!(t.title(), "Some Track");
    assert_eq!(t.artist(), "Prober Artist");
    assert_eq!(t.duration_ns(), 0);

    let t = merge("", TagReport::default(), ProbeReport::default());
    assert_eq!(t.title(), "Unknown Title");
}

#[test]
fn merge_prefers_positive_tag_duration_and_keeps_tag_artwork() {
    let tags = TagReport {
        duration_ns: Some(30 * NANOS_PER_SEC),
        artwork: Some(vec![1, 2, 3]),
        ..TagReport::default()
    };
    let probed = ProbeReport {
        duration_ns: Some(31 * NANOS_PER_SEC),
        ..ProbeReport::default()
    };
    let t = merge("file:///a.flac", tags, probed);
    assert_eq!(t.duration_ns(), 30 * NANOS_PER_SEC);
    assert_eq!(t.artwork(), Some(&[1u8, 2, 3][..]));
}

#[test]
fn artwork_checks_framed_then_atoms_then_block_pictures() {
    let arts = vec![
        EmbeddedArt::BlockPicture(vec![frame(None, b"block")]),
        EmbeddedArt::AtomList(vec![frame(None, b"atom")]),
        EmbeddedArt::Framed(vec![frame(None, b"")]),
    ];
    assert_eq!(first_artwork(arts), Some(b"atom".to_vec()));

    let arts = vec![
        EmbeddedArt::BlockPicture(vec![frame(None, b"block")]),
        EmbeddedArt::Framed(vec![frame(None, b"apic")]),
    ];
    assert_eq!(first_artwork(arts), Some(b"apic".to_vec()));

    assert_eq!(first_artwork(Vec::new()), None);
}

#[test]
fn framed_artwork_prefers_the_undescribed_frame() {
    let art = EmbeddedArt::Framed(vec![
        frame(Some("back"), b"back"),
        frame(Some(""), b"front"),
    ]);
    assert_eq!(art.first_artwork(), Some(b"front".to_vec()));

    let art = EmbeddedArt::Framed(vec![frame(Some("back"), b"back")]);
    assert_eq!(art.first_artwork(), Some(b"back".to_vec()));
}

#[test]
fn prober_failure_produces_no_track() {
    let resolver = Resolver::new(
        Arc::new(FixedTags(TagReport::default())),
        timed(FixedProbe(Err(ProbeErrorKind::Timeout))),
    );
    let request = DiscoveryRequest::from_uri("https://radio.example/live.mp3");
    let err = resolver.resolve(&request).unwrap_err();
    assert_eq!(err.kind, ProbeErrorKind::Timeout);
}

#[test]
fn resolve_async_dispatches_failure_without_track() {
    let resolver = Arc::new(Resolver::new(
        Arc::new(FixedTags(TagReport::default())),
        timed(FixedProbe(Err(ProbeErrorKind::MissingCodec))),
    ));
    let (tx, rx) = mpsc::channel();
    resolver
        .resolve_async(DiscoveryRequest::from_uri("https://a/b.xyz"), tx)
        .join()
        .unwrap();

    let messages: Vec<Dispatch> = rx.try_iter().collect();
    assert_eq!(messages.len(), 1);
    assert!(matches!(
        &messages[0],
        Dispatch::DiscoveryFailed { uri, error }
            if uri == "https://a/b.xyz" && error.kind == ProbeErrorKind::MissingCodec
    ));
}

#[test]
fn resolve_async_dispatches_merged_track() {
    let tags = TagReport {
        title: Some("Tagged".into()),
        artwork: Some(vec![9, 9]),
        ..TagReport::default()
    };
    let probed = ProbeReport {
        artist: Some("Probed".into()),
        duration_ns: Some(5 * NANOS_PER_SEC),
        ..ProbeReport::default()
    };
    let resolver = Arc::new(Resolver::new(
        Arc::new(FixedTags(tags)),
        timed(FixedProbe(Ok(probed))),
    ));
    let (tx, rx) = mpsc::channel();
    resolver
        .resolve_async(DiscoveryRequest::from_uri("/music/a.flac"), tx)
        .join()
        .unwrap();

    let Ok(Dispatch::Append(track)) = rx.try_recv() else {
        panic!("expected an appended track");
    };
    assert_eq!(track.title(), "Tagged");
    assert_eq!(track.artist(), "Probed");
    assert_eq!(track.duration_ns(), 5 * NANOS_PER_SEC);
    assert_eq!(track.artwork(), Some(&[9u8, 9][..]));
}

#[test]
fn remote_requests_skip_the_tag_reader() {
    struct PanickingTags;
    impl TagReader for PanickingTags {
        fn read(&self, path: &Path) -> TagReport {
            panic!("tag reader called for {}", path.display());
        }
    }

    let resolver = Resolver::new(
        Arc::new(PanickingTags),
        timed(FixedProbe(Ok(ProbeReport::default()))),
    );
    let track = resolver
        .resolve(&DiscoveryRequest::from_uri("https://a/stream.mp3"))
        .unwrap();
    assert_eq!(track.title(), "stream");
}

#[test]
fn timed_prober_times_out_slow_probes() {
    let prober = TimedProber::new(
        Arc::new(SlowProbe(Duration::from_millis(500))),
        Duration::from_millis(20),
        4,
    );
    let err = prober.probe("https://slow/a.mp3").unwrap_err();
    assert_eq!(err.kind, ProbeErrorKind::Timeout);
}

#[test]
fn timed_prober_reports_busy_when_saturated() {
    let prober = TimedProber::new(
        Arc::new(SlowProbe(Duration::from_millis(500))),
        Duration::from_millis(20),
        1,
    );
    assert_eq!(
        prober.probe("https://slow/1.mp3").unwrap_err().kind,
        ProbeErrorKind::Timeout
    );
    // The timed-out worker is still running and holds the only slot.
    assert_eq!(prober.in_flight(), 1);
    assert_eq!(
        prober.probe("https://slow/2.mp3").unwrap_err().kind,
        ProbeErrorKind::Busy
    );
    assert_eq!(prober.in_flight(), 1);
}

#[test]
fn lofty_prober_reads_wav_duration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.wav");
    write_wav(&path, 2);

    let report = LoftyProber::default()
        .probe(&path_to_uri(&path))
        .unwrap();
    assert_eq!(report.duration_ns, Some(2 * NANOS_PER_SEC));
    assert_eq!(report.title, None);
}

#[test]
fn lofty_prober_classifies_failures() {
    let dir = tempfile::tempdir().unwrap();
    let prober = LoftyProber::new(FetchOptions::default());

    let missing = dir.path().join("missing.wav");
    assert_eq!(
        prober.probe(&path_to_uri(&missing)).unwrap_err().kind,
        ProbeErrorKind::InvalidUri
    );
    assert_eq!(
        prober.probe("gopher://old/a.mp3").unwrap_err().kind,
        ProbeErrorKind::InvalidUri
    );

    let garbage = dir.path().join("garbage.mp3");
    std::fs::write(&garbage, b"just some text").unwrap();
    assert_eq!(
        prober.probe(&path_to_uri(&garbage)).unwrap_err().kind,
        ProbeErrorKind::MissingCodec
    );
}

#[test]
fn lofty_tag_reader_is_lenient() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.wav");
    write_wav(&path, 1);

    let report = LoftyTagReader.read(&path);
    assert_eq!(report.duration_ns, Some(NANOS_PER_SEC));
    assert_eq!(report.title, None);
    assert_eq!(report.artwork, None);

    assert_eq!(
        LoftyTagReader.read(&dir.path().join("missing.wav")),
        TagReport::default()
    );
}

#[test]
fn requests_beyond_the_in_flight_cap_wait_for_a_slot() {
    let counting = Arc::new(CountingProbe::default());
    let prober = TimedProber::new(counting.clone(), Duration::from_secs(5), 2);
    let resolver = Arc::new(Resolver::new(
        Arc::new(FixedTags(TagReport::default())),
        prober,
    ));

    let (tx, rx) = mpsc::channel();
    let workers: Vec<_> = (0..12)
        .map(|i| {
            resolver.resolve_async(
                DiscoveryRequest::from_uri(&format!("https://radio.example/{i}.mp3")),
                tx.clone(),
            )
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let messages: Vec<Dispatch> = rx.try_iter().collect();
    assert_eq!(messages.len(), 12);
    assert!(messages.iter().all(|m| matches!(m, Dispatch::Append(_))));
    assert!(counting.peak.load(Ordering::SeqCst) <= 2);
}
