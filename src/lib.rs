//! Standard MIDI File (SMF) note decoder.
//!
//! Turns the bytes of a MIDI file into a flat list of [`NoteInterval`]s (start and end in
//! seconds, plus the pitch) ordered by start time, ready to drive a piano roll.
//!
//! # Example
//!
//! ```
//! # fn print_notes(bytes: &[u8]) -> Result<(), free_piano_midi::Error> {
//! for note in free_piano_midi::decode(bytes)? {
//!     println!("{} from {:.3}s to {:.3}s", note.code, note.start, note.end);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Decoding goes through [`chunk::MidiFile`] (header and track chunks),
//! [`event::TrackEvents`] (events of one track), [`tempo::TempoMap`] (ticks to seconds),
//! [`tracker::NoteTracker`] (note-on/note-off matching) and finally [`merge::merge`].

pub mod chunk;
pub mod cursor;
pub mod error;
pub mod event;
pub mod merge;
pub mod note;
pub mod tempo;
pub mod tracker;

use chunk::{Format, MidiFile};
use event::{decode_track, TrackEvent};
use tempo::TempoMap;

pub use error::{DecodeReason, Error, HeaderIssue, Result};
pub use note::NoteInterval;

/// Which notes [`decode_with`] keeps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Drop notes on the General MIDI percussion channel.
    pub skip_percussion: bool,
    /// When set, keep only notes on these channels (0-15).
    pub channels: Option<Vec<u8>>,
}

impl DecodeOptions {
    /// Channel 10 in the 1-based numbering used by General MIDI.
    pub const PERCUSSION_CHANNEL: u8 = 9;

    pub fn accepts_channel(&self, channel: u8) -> bool {
        if self.skip_percussion && channel == Self::PERCUSSION_CHANNEL {
            return false;
        }
        self.channels
            .as_ref()
            .map_or(true, |channels| channels.contains(&channel))
    }
}

/// Decodes every note of a MIDI file.
pub fn decode(bytes: &[u8]) -> Result<Vec<NoteInterval>> {
    decode_with(bytes, &DecodeOptions::default())
}

/// Decodes the notes of a MIDI file that `options` selects.
pub fn decode_with(bytes: &[u8], options: &DecodeOptions) -> Result<Vec<NoteInterval>> {
    let file = MidiFile::parse(bytes)?;
    let header = *file.header();
    let tracks = file
        .tracks()
        .iter()
        .map(decode_track)
        .collect::<Result<Vec<_>>>()?;

    let notes = match header.format {
        Format::Single | Format::Simultaneous => {
            // all tracks run on one clock
            let tempo = TempoMap::from_tracks(header.division, tracks.iter().map(Vec::as_slice));
            tracks
                .iter()
                .enumerate()
                .map(|(index, events)| track_notes(index, events, &tempo, options))
                .collect::<Vec<_>>()
        }
        Format::Independent => {
            log::info!(
                "format 2 file: each of the {} tracks uses its own tempo map",
                tracks.len()
            );
            tracks
                .iter()
                .enumerate()
                .map(|(index, events)| {
                    let tempo = TempoMap::from_tracks(header.division, [events.as_slice()]);
                    track_notes(index, events, &tempo, options)
                })
                .collect::<Vec<_>>()
        }
    };

    Ok(merge::merge(notes))
}

fn track_notes(
    index: usize,
    events: &[TrackEvent<'_>],
    tempo: &TempoMap,
    options: &DecodeOptions,
) -> Vec<NoteInterval> {
    let notes = tracker::track_notes(events, tempo, options);
    log::debug!(
        "track {index}: {} events, {} notes",
        events.len(),
        notes.len()
    );
    notes
}
