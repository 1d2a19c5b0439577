/// Errors produced while decoding a MIDI file.
///
/// Any of these aborts decoding of the whole input; there are no partial results.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The file does not start with an `MThd` chunk.
    #[error("not a standard midi file: expected `MThd`, found {found:02X?}")]
    BadMagic { found: [u8; 4] },
    /// The header chunk is readable but describes something this decoder does not handle.
    #[error("unsupported header: {0}")]
    UnsupportedFormat(HeaderIssue),
    /// A read went past the end of the buffer.
    #[error("truncated data at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    TruncatedData {
        offset: usize,
        needed: usize,
        remaining: usize,
    },
    /// Structurally invalid data that cannot be skipped safely.
    #[error("malformed data at offset {offset}: {reason}")]
    Decode { offset: usize, reason: DecodeReason },
}

impl Error {
    /// Constructs a new instance of `Error::Decode` at the given file offset.
    pub const fn decode(offset: usize, reason: DecodeReason) -> Self {
        Self::Decode { offset, reason }
    }

    /// Returns the file offset the error was detected at, if it has one.
    pub const fn offset(&self) -> Option<usize> {
        match self {
            Self::TruncatedData { offset, .. } | Self::Decode { offset, .. } => Some(*offset),
            Self::BadMagic { .. } | Self::UnsupportedFormat(_) => None,
        }
    }
}

/// What is wrong with an otherwise readable header chunk.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum HeaderIssue {
    #[error("header length must be 6, found {0}")]
    Length(u32),
    #[error("invalid integer value for format: {0}")]
    Format(u16),
}

/// Reason attached to [`Error::Decode`].
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum DecodeReason {
    #[error("variable length quantity longer than 4 bytes")]
    VarintTooLong,
    #[error("data byte {0:#04X} without a preceding channel status")]
    MissingRunningStatus(u8),
    #[error("data byte {0:#04X} has its high bit set")]
    InvalidDataByte(u8),
    #[error("undefined status byte {0:#04X}")]
    UndefinedStatus(u8),
    #[error("invalid division field {0:#06X}")]
    InvalidDivision(u16),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
