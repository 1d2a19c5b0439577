use std::cmp::Ordering;

use crate::note::NoteInterval;

/// Combines per-track intervals into one list ordered by start time, then pitch, then end
/// time.
pub fn merge(tracks: impl IntoIterator<Item = Vec<NoteInterval>>) -> Vec<NoteInterval> {
    let mut notes: Vec<_> = tracks.into_iter().flatten().collect();
    notes.sort_by(compare);
    notes
}

fn compare(a: &NoteInterval, b: &NoteInterval) -> Ordering {
    a.start
        .total_cmp(&b.start)
        .then(a.code.cmp(&b.code))
        .then(a.end.total_cmp(&b.end))
}
