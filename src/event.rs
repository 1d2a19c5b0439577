use crate::chunk::TrackChunk;
use crate::cursor::Cursor;
use crate::error::{DecodeReason, Error, Result};

/// An event and the number of ticks since the previous event of the same track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackEvent<'a> {
    pub delta: u32,
    pub event: Event<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<'a> {
    Channel(ChannelEvent),
    Meta(MetaEvent<'a>),
    Sysex(SysexEvent<'a>),
    /// System common or real-time message. Its data bytes are consumed and discarded.
    System(u8),
}

/// A channel voice message.
///
/// For kinds other than notes, `note` and `velocity` hold the first and second data bytes
/// (the second is 0 for messages with a single data byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelEvent {
    pub channel: u8,
    pub kind: ChannelEventKind,
    pub note: u8,
    pub velocity: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEventKind {
    NoteOff,
    /// Always has a non-zero velocity; velocity 0 is decoded as [`ChannelEventKind::NoteOff`].
    NoteOn,
    /// Any other channel message, tagged with the high nibble of its status byte.
    Other(u8),
}

impl ChannelEvent {
    fn from_status(status: u8, note: u8, velocity: u8) -> Self {
        let kind = match status >> 4 {
            0x8 => ChannelEventKind::NoteOff,
            0x9 if velocity == 0 => ChannelEventKind::NoteOff,
            0x9 => ChannelEventKind::NoteOn,
            other => ChannelEventKind::Other(other),
        };
        Self {
            channel: status & 0x0F,
            kind,
            note,
            velocity,
        }
    }

    /// Number of data bytes following a channel status byte.
    const fn data_len(status: u8) -> usize {
        match status >> 4 {
            0xC | 0xD => 1,
            _ => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaEvent<'a> {
    pub kind: MetaKind,
    pub data: &'a [u8],
}

impl MetaEvent<'_> {
    /// Microseconds per quarter note, if this is a well-formed, non-zero tempo event.
    pub fn tempo(&self) -> Option<u32> {
        match (self.kind, self.data) {
            (MetaKind::Tempo, &[a, b, c]) => {
                Some(u32::from_be_bytes([0, a, b, c])).filter(|&micros| micros > 0)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaKind {
    EndOfTrack,
    Tempo,
    Other(u8),
}

impl From<u8> for MetaKind {
    fn from(value: u8) -> Self {
        match value {
            0x2F => Self::EndOfTrack,
            0x51 => Self::Tempo,
            other => Self::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SysexEvent<'a> {
    pub kind: SysexKind,
    pub data: &'a [u8],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SysexKind {
    /// `F0`: the first packet of a system exclusive message.
    Start,
    /// `F7`: a continuation packet of a split message, or an escape sequence.
    Continuation,
}

/// Iterator over the events of a single track chunk.
///
/// Stops after the end-of-track meta event or when the chunk runs out, and yields nothing
/// more after the first error.
#[derive(Debug, Clone)]
pub struct TrackEvents<'a> {
    cursor: Cursor<'a>,
    /// Status byte of the last channel event, reused when a status byte is omitted.
    running_status: Option<u8>,
    done: bool,
}

impl<'a> TrackEvents<'a> {
    pub const fn new(chunk: &TrackChunk<'a>) -> Self {
        Self {
            cursor: Cursor::with_offset(chunk.data, chunk.offset),
            running_status: None,
            done: false,
        }
    }

    fn read_event(&mut self) -> Result<TrackEvent<'a>> {
        let delta = self.cursor.read_varint()?;
        let status_offset = self.cursor.offset();
        let byte = self.cursor.read_u8()?;

        let event = match byte {
            0x00..=0x7F => {
                let status = self
                    .running_status
                    .ok_or(Error::decode(
                        status_offset,
                        DecodeReason::MissingRunningStatus(byte),
                    ))?;
                self.read_channel_event(status, Some(byte))?
            }
            0x80..=0xEF => {
                self.running_status = Some(byte);
                self.read_channel_event(byte, None)?
            }
            0xFF => {
                let kind = MetaKind::from(self.cursor.read_u8()?);
                let data = self.read_data()?;
                Event::Meta(MetaEvent { kind, data })
            }
            0xF0 => Event::Sysex(SysexEvent {
                kind: SysexKind::Start,
                data: self.read_data()?,
            }),
            0xF7 => Event::Sysex(SysexEvent {
                kind: SysexKind::Continuation,
                data: self.read_data()?,
            }),
            0xF1 | 0xF3 => {
                self.cursor.read_bytes(1)?;
                Event::System(byte)
            }
            0xF2 => {
                self.cursor.read_bytes(2)?;
                Event::System(byte)
            }
            0xF6 | 0xF8..=0xFE => Event::System(byte),
            0xF4 | 0xF5 => {
                return Err(Error::decode(
                    status_offset,
                    DecodeReason::UndefinedStatus(byte),
                ))
            }
        };

        Ok(TrackEvent { delta, event })
    }

    /// Reads the data bytes of a channel event, `first` being a data byte already consumed
    /// under running status.
    fn read_channel_event(&mut self, status: u8, first: Option<u8>) -> Result<Event<'a>> {
        let mut data = [0u8; 2];
        let mut start = 0;
        if let Some(byte) = first {
            data[0] = byte;
            start = 1;
        }
        for slot in data.iter_mut().take(ChannelEvent::data_len(status)).skip(start) {
            let offset = self.cursor.offset();
            let byte = self.cursor.read_u8()?;
            if byte & 0x80 != 0 {
                return Err(Error::decode(offset, DecodeReason::InvalidDataByte(byte)));
            }
            *slot = byte;
        }

        let [note, velocity] = data;
        Ok(Event::Channel(ChannelEvent::from_status(
            status, note, velocity,
        )))
    }

    /// Reads a varint length followed by that many payload bytes.
    fn read_data(&mut self) -> Result<&'a [u8]> {
        let length = self.cursor.read_varint()? as usize;
        self.cursor.read_bytes(length)
    }
}

impl<'a> Iterator for TrackEvents<'a> {
    type Item = Result<TrackEvent<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.cursor.is_empty() {
            return None;
        }

        let result = self.read_event();
        match &result {
            Ok(TrackEvent {
                event:
                    Event::Meta(MetaEvent {
                        kind: MetaKind::EndOfTrack,
                        ..
                    }),
                ..
            }) => {
                self.done = true;
                if !self.cursor.is_empty() {
                    log::debug!(
                        "ignoring {} bytes after end of track at offset {}",
                        self.cursor.remaining(),
                        self.cursor.offset()
                    );
                }
            }
            Ok(_) => {}
            Err(_) => self.done = true,
        }
        Some(result)
    }
}

impl std::iter::FusedIterator for TrackEvents<'_> {}

/// Decodes every event of a track chunk.
pub fn decode_track<'a>(chunk: &TrackChunk<'a>) -> Result<Vec<TrackEvent<'a>>> {
    TrackEvents::new(chunk).collect()
}
