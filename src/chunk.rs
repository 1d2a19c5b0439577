use std::str::FromStr;

use crate::cursor::Cursor;
use crate::error::{DecodeReason, Error, HeaderIssue, Result};

/// A parsed Standard MIDI File: the header plus the raw bytes of every track chunk.
///
/// Track contents are not decoded here; see [`crate::event::TrackEvents`].
#[derive(Debug, Clone)]
pub struct MidiFile<'a> {
    header: Header,
    tracks: Vec<TrackChunk<'a>>,
}

impl<'a> MidiFile<'a> {
    /// Parses the chunk structure of the given buffer.
    pub fn parse(buffer: &'a [u8]) -> Result<Self> {
        let mut cursor = Cursor::new(buffer);
        let header = Header::read(&mut cursor)?;

        let mut tracks = Vec::new();
        while !cursor.is_empty() {
            let tag = cursor.read_tag()?;
            let length = cursor.read_u32_be()? as usize;
            let offset = cursor.offset();
            let data = cursor.read_bytes(length)?;

            match ChunkType::from_tag(&tag) {
                Some(ChunkType::Track) => tracks.push(TrackChunk { offset, data }),
                _ => log::debug!(
                    "skipping {length} byte chunk {:?} at offset {offset}",
                    String::from_utf8_lossy(&tag)
                ),
            }
        }

        if usize::from(header.track_count) != tracks.len() {
            log::warn!(
                "header declares {} tracks but the file contains {}",
                header.track_count,
                tracks.len()
            );
        }

        Ok(Self { header, tracks })
    }

    pub const fn header(&self) -> &Header {
        &self.header
    }

    /// Track chunks in file order.
    pub fn tracks(&self) -> &[TrackChunk<'a>] {
        &self.tracks
    }
}

/// Contents of the `MThd` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub format: Format,
    /// Track count as declared by the header, which may disagree with the file.
    pub track_count: u16,
    pub division: Division,
}

impl Header {
    const MAGIC: &'static [u8; 4] = b"MThd";
    const LENGTH: u32 = 6;

    fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        let found = cursor.read_tag()?;
        if &found != Self::MAGIC {
            return Err(Error::BadMagic { found });
        }

        let length = cursor.read_u32_be()?;
        if length != Self::LENGTH {
            return Err(Error::UnsupportedFormat(HeaderIssue::Length(length)));
        }

        let format = Format::try_from(cursor.read_u16_be()?)?;
        let track_count = cursor.read_u16_be()?;
        let division_offset = cursor.offset();
        let division = Division::try_from(cursor.read_u16_be()?)
            .map_err(|reason| Error::decode(division_offset, reason))?;

        Ok(Self {
            format,
            track_count,
            division,
        })
    }
}

/// Format of a MIDI file, as specified in the file header chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// File contains a single, multi channel track.
    Single,
    /// File contains one or more simultaneous tracks sharing one clock.
    Simultaneous,
    /// File contains one or more sequentially independent single-track patterns.
    Independent,
}

impl TryFrom<u16> for Format {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Single),
            1 => Ok(Self::Simultaneous),
            2 => Ok(Self::Independent),
            other => Err(Error::UnsupportedFormat(HeaderIssue::Format(other))),
        }
    }
}

/// Specifies the meaning of the delta times in the MIDI file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Division {
    /// Delta times count fractions of a quarter note, so their length depends on tempo.
    Metrical { ticks_per_quarter_note: u16 },
    /// Delta times count fractions of an SMPTE frame, independent of tempo.
    TimeCode {
        smpte_format: SmpteFormat,
        ticks_per_frame: u8,
    },
}

impl TryFrom<u16> for Division {
    type Error = DecodeReason;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let invalid = DecodeReason::InvalidDivision(value);
        if value & 0x8000 == 0 {
            if value == 0 {
                return Err(invalid);
            }
            return Ok(Self::Metrical {
                ticks_per_quarter_note: value,
            });
        }

        // high byte is the frame rate in two's complement
        let [rate, ticks_per_frame] = value.to_be_bytes();
        let smpte_format = SmpteFormat::from_repr(rate as i8).ok_or(invalid)?;
        if ticks_per_frame == 0 {
            return Err(invalid);
        }
        Ok(Self::TimeCode {
            smpte_format,
            ticks_per_frame,
        })
    }
}

/// Standardized FPS rates for MIDI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::FromRepr)]
#[repr(i8)]
pub enum SmpteFormat {
    Fps24 = -24,
    Fps25 = -25,
    /// 29.97 drop frame.
    Fps30Drop = -29,
    Fps30 = -30,
}

impl SmpteFormat {
    pub fn frames_per_second(self) -> f64 {
        match self {
            Self::Fps24 => 24.0,
            Self::Fps25 => 25.0,
            Self::Fps30Drop => 30_000.0 / 1001.0,
            Self::Fps30 => 30.0,
        }
    }
}

/// The raw bytes of one `MTrk` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackChunk<'a> {
    /// File offset of the first byte of `data`.
    pub offset: usize,
    pub data: &'a [u8],
}

/// The chunk types this decoder knows about.
#[derive(Debug, Eq, PartialEq, strum::EnumString)]
pub enum ChunkType {
    #[strum(serialize = "MThd")]
    Header,
    #[strum(serialize = "MTrk")]
    Track,
}

impl ChunkType {
    /// Returns the chunk type for a 4-byte tag, or `None` for alien chunks.
    pub fn from_tag(tag: &[u8; 4]) -> Option<Self> {
        std::str::from_utf8(tag)
            .ok()
            .and_then(|tag| Self::from_str(tag).ok())
    }
}
