use super::*;
use crate::error::PersistError;
use crate::library::{NANOS_PER_SEC, Track};

fn t(name: &str, secs: u64) -> Track {
    Track::new(
        format!("file:///music/{name}.flac"),
        Some(name.to_string()),
        Some("Artist".to_string()),
        secs * NANOS_PER_SEC,
    )
}

fn seq(names: &[(&str, u64)]) -> PlaylistSequence {
    PlaylistSequence::from_tracks(names.iter().map(|(n, s)| t(n, *s)).collect())
}

#[test]
fn remaining_duration_counts_tracks_after_selection() {
    let mut p = seq(&[("t1", 60), ("t2", 120)]);
    assert_eq!(p.total_remaining_duration(), 180 * NANOS_PER_SEC);

    assert!(p.select(0));
    assert_eq!(p.total_remaining_duration(), 120 * NANOS_PER_SEC);

    p.select(1);
    assert_eq!(p.total_remaining_duration(), 0);
}

#[test]
fn remaining_duration_treats_unknown_as_zero() {
    let p = seq(&[("a", 0), ("b", 30), ("c", 0)]);
    assert_eq!(p.total_remaining_duration(), 30 * NANOS_PER_SEC);
}

#[test]
fn removing_selected_clears_selection() {
    for selected in 0..3 {
        let mut p = seq(&[("a", 1), ("b", 2), ("c", 3)]);
        p.select(selected);
        assert!(p.remove_at(selected).is_some());
        assert_eq!(p.selected_index(), None);
    }
}

#[test]
fn removing_before_selection_keeps_the_same_track_selected() {
    let mut p = seq(&[("a", 1), ("b", 2), ("c", 3)]);
    p.select(2);
    p.remove_at(0);
    assert_eq!(p.selected_index(), Some(1));
    assert_eq!(p.get(1).unwrap().title(), "c");

    p.remove_at(1);
    assert_eq!(p.selected_index(), None);
    assert_eq!(p.len(), 1);
}

#[test]
fn removing_after_selection_or_out_of_range_leaves_selection() {
    let mut p = seq(&[("a", 1), ("b", 2)]);
    p.select(0);
    assert!(p.remove_at(5).is_none());
    p.remove_at(1);
    assert_eq!(p.selected_index(), Some(0));
}

#[test]
fn select_rejects_out_of_range() {
    let mut p = seq(&[("a", 1)]);
    assert!(!p.select(1));
    assert_eq!(p.selected_index(), None);
}

#[test]
fn next_and_previous_clamp_without_wrapping() {
    let mut p = seq(&[("a", 1), ("b", 2), ("c", 3)]);
    assert_eq!(p.previous_index(), None);
    assert_eq!(p.next_index(), Some(0));

    assert_eq!(p.select_next(), Some(0));
    assert_eq!(p.select_next(), Some(1));
    assert_eq!(p.select_next(), Some(2));
    assert_eq!(p.select_next(), None);
    assert_eq!(p.selected_index(), Some(2));

    assert_eq!(p.select_previous(), Some(1));
    assert_eq!(p.select_previous(), Some(0));
    assert_eq!(p.select_previous(), None);
    assert_eq!(p.selected_index(), Some(0));
}

#[test]
fn next_on_empty_playlist_is_none() {
    let mut p = PlaylistSequence::new();
    assert_eq!(p.select_next(), None);
    assert_eq!(p.selected_index(), None);
}

#[test]
fn duplicates_are_allowed_and_found_by_uri() {
    let mut p = PlaylistSequence::new();
    p.append(t("a", 1));
    let second = p.append(t("a", 1));
    assert_eq!(second, 1);
    assert_eq!(p.position_of_uri("file:///music/a.flac"), Some(0));
    assert!(!p.contains_uri("file:///music/z.flac"));
}

#[test]
fn replace_clears_selection() {
    let mut p = seq(&[("a", 1), ("b", 2)]);
    p.select(1);
    p.replace(vec![t("z", 9)]);
    assert_eq!(p.selected_index(), None);
    assert_eq!(p.len(), 1);
}

#[test]
fn save_and_load_preserves_every_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("playlist.json");

    let tracks = vec![
        t("one", 61),
        Track::new("https://radio.example/stream", None, None, 0),
        t("three", 200).with_artwork(Some(vec![0x89, b'P', b'N', b'G', 0, 1, 2, 255])),
    ];
    save_playlist(&path, &tracks).unwrap();

    let loaded = load_playlist(&path).unwrap();
    assert_eq!(loaded, tracks);
    assert_eq!(
        loaded[2].artwork().unwrap(),
        &[0x89, b'P', b'N', b'G', 0, 1, 2, 255]
    );
}

#[test]
fn saved_records_omit_missing_artwork() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("p.json");
    save_playlist(&path, &[t("one", 1)]).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let record = &json[0];
    assert_eq!(record["duration_ns"], 1_000_000_000u64);
    assert!(record.get("album_art_b64").is_none());
}

#[test]
fn load_skips_invalid_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("p.json");
    std::fs::write(
        &path,
        r#"[
  "not a record",
  {"uri": "file:///a.mp3", "title": "A", "artist": "X", "duration_ns": -5},
  {"title": "no uri"},
  {"uri": "file:///b.mp3", "duration_ns": 2.5, "album_art_b64": "%%%"},
  42
]"#,
    )
    .unwrap();

    let loaded = load_playlist(&path).unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].title(), "A");
    assert_eq!(loaded[0].duration_ns(), 0);
    assert_eq!(loaded[1].title(), "Unknown Title");
    assert_eq!(loaded[1].duration_ns(), 0);
    assert!(loaded[1].artwork().is_none());
}

#[test]
fn load_rejects_non_list_and_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("p.json");
    std::fs::write(&path, r#"{"uri": "file:///a.mp3"}"#).unwrap();
    assert!(matches!(load_playlist(&path), Err(PersistError::NotAList)));

    std::fs::write(&path, "not json").unwrap();
    assert!(matches!(load_playlist(&path), Err(PersistError::Json(_))));

    let missing = dir.path().join("absent.json");
    assert!(matches!(
        load_playlist(&missing),
        Err(PersistError::Missing { .. })
    ));
}
