use std::collections::BTreeMap;

use crate::event::{ChannelEvent, ChannelEventKind, Event, MetaEvent, MetaKind, TrackEvent};
use crate::note::NoteInterval;
use crate::tempo::TempoMap;
use crate::DecodeOptions;

/// Matches note-on and note-off events of one track into [`NoteInterval`]s.
///
/// Each (channel, pitch) key keeps a stack of start ticks, so a pitch retriggered before it was
/// released is still matched: a note-off closes the most recent note-on of its key.
#[derive(Debug)]
pub struct NoteTracker<'m> {
    tempo: &'m TempoMap,
    open: BTreeMap<(u8, u8), Vec<u64>>,
    intervals: Vec<NoteInterval>,
}

impl<'m> NoteTracker<'m> {
    pub fn new(tempo: &'m TempoMap) -> Self {
        Self {
            tempo,
            open: BTreeMap::new(),
            intervals: Vec::new(),
        }
    }

    pub fn note_on(&mut self, tick: u64, channel: u8, note: u8) {
        self.open.entry((channel, note)).or_default().push(tick);
    }

    /// Closes the most recent open note of this key. A note-off with nothing to close is
    /// ignored.
    pub fn note_off(&mut self, tick: u64, channel: u8, note: u8) {
        match self.open.get_mut(&(channel, note)).and_then(Vec::pop) {
            Some(start) => self.close(start, tick, note),
            None => {
                log::trace!("ignoring stray note off {note} on channel {channel} at tick {tick}");
            }
        }
    }

    /// Number of notes currently sounding.
    pub fn open_count(&self) -> usize {
        self.open.values().map(Vec::len).sum()
    }

    /// Closes every note still open at `final_tick` and returns all intervals of the track.
    pub fn finish(mut self, final_tick: u64) -> Vec<NoteInterval> {
        let open = std::mem::take(&mut self.open);
        for ((channel, note), starts) in open {
            for start in starts {
                log::trace!("closing note {note} on channel {channel} at end of track");
                self.close(start, final_tick, note);
            }
        }
        self.intervals
    }

    fn close(&mut self, start: u64, end: u64, code: u8) {
        self.intervals.push(NoteInterval {
            start: self.tempo.seconds_at(start),
            end: self.tempo.seconds_at(end),
            code,
        });
    }
}

/// Runs a whole decoded track through a [`NoteTracker`].
///
/// The track ends at its end-of-track event, or at its last event when it has none.
pub fn track_notes(
    events: &[TrackEvent<'_>],
    tempo: &TempoMap,
    options: &DecodeOptions,
) -> Vec<NoteInterval> {
    let mut tracker = NoteTracker::new(tempo);
    let mut tick = 0u64;
    for event in events {
        tick += u64::from(event.delta);
        match event.event {
            Event::Channel(ChannelEvent {
                channel,
                kind,
                note,
                ..
            }) if options.accepts_channel(channel) => match kind {
                ChannelEventKind::NoteOn => tracker.note_on(tick, channel, note),
                ChannelEventKind::NoteOff => tracker.note_off(tick, channel, note),
                ChannelEventKind::Other(_) => {}
            },
            Event::Meta(MetaEvent {
                kind: MetaKind::EndOfTrack,
                ..
            }) => break,
            Event::Channel(_) | Event::Meta(_) | Event::Sysex(_) | Event::System(_) => {}
        }
    }

    if tracker.open_count() > 0 {
        log::debug!(
            "{} notes left open, closing them at tick {tick}",
            tracker.open_count()
        );
    }
    tracker.finish(tick)
}
