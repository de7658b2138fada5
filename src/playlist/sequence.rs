use crate::library::Track;

/// Tracks in playback order plus at most one selected index.
///
/// The selection always points at an existing entry. Removing the selected
/// entry clears it; removing an earlier entry shifts it down so it keeps
/// pointing at the same track.
#[derive(Debug, Default, Clone)]
pub struct PlaylistSequence {
    tracks: Vec<Track>,
    selected: Option<usize>,
}

impl PlaylistSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        Self {
            tracks,
            selected: None,
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Append at the end and return the new index.
    pub fn append(&mut self, track: Track) -> usize {
        self.tracks.push(track);
        self.tracks.len() - 1
    }

    /// Remove the entry at `index`. Out of range is a no-op.
    pub fn remove_at(&mut self, index: usize) -> Option<Track> {
        if index >= self.tracks.len() {
            return None;
        }
        let removed = self.tracks.remove(index);
        self.selected = match self.selected {
            Some(s) if s == index => None,
            Some(s) if s > index => Some(s - 1),
            other => other,
        };
        Some(removed)
    }

    /// Swap the whole content; the selection is cleared.
    pub fn replace(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
        self.selected = None;
    }

    /// Select `index`. Returns false (and leaves the selection alone) when
    /// the index is out of range.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.tracks.len() {
            self.selected = Some(index);
            true
        } else {
            false
        }
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// The index after the selection, or the first entry when nothing is
    /// selected. `None` at the end; there is no wraparound.
    pub fn next_index(&self) -> Option<usize> {
        let next = self.selected.map_or(0, |i| i + 1);
        (next < self.tracks.len()).then_some(next)
    }

    /// The index before the selection; `None` at the start or when nothing
    /// is selected.
    pub fn previous_index(&self) -> Option<usize> {
        self.selected.and_then(|i| i.checked_sub(1))
    }

    /// Move the selection forward. Returns the new index if it moved.
    pub fn select_next(&mut self) -> Option<usize> {
        let next = self.next_index()?;
        self.selected = Some(next);
        Some(next)
    }

    /// Move the selection back. Returns the new index if it moved.
    pub fn select_previous(&mut self) -> Option<usize> {
        let prev = self.previous_index()?;
        self.selected = Some(prev);
        Some(prev)
    }

    /// Sum of known durations after the selection, or of every entry when
    /// nothing is selected. Unknown durations count as zero.
    pub fn total_remaining_duration(&self) -> u64 {
        let start = self.selected.map_or(0, |i| i + 1);
        self.tracks
            .iter()
            .skip(start)
            .map(Track::duration_ns)
            .fold(0u64, u64::saturating_add)
    }

    pub fn position_of_uri(&self, uri: &str) -> Option<usize> {
        self.tracks.iter().position(|t| t.uri() == uri)
    }

    pub fn contains_uri(&self, uri: &str) -> bool {
        self.position_of_uri(uri).is_some()
    }
}
