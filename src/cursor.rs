use std::ops::{AddAssign, ShlAssign};

use crate::error::{DecodeReason, Error, Result};

/// Sequential, bounds-checked reader over a byte slice.
///
/// The cursor remembers the file offset of its first byte so errors raised while reading a
/// sub-slice (a single track chunk, say) still point into the original file.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    position: usize,
    base: usize,
    buffer: &'a [u8],
}

impl<'a> Cursor<'a> {
    /// Creates a new instance of [`Cursor`] at the start of the file.
    pub const fn new(buffer: &'a [u8]) -> Self {
        Self::with_offset(buffer, 0)
    }

    /// Creates a cursor over `buffer`, which starts at file offset `base`.
    pub const fn with_offset(buffer: &'a [u8], base: usize) -> Self {
        Self {
            position: 0,
            base,
            buffer,
        }
    }

    /// Absolute file offset of the next byte to be read.
    pub const fn offset(&self) -> usize {
        self.base + self.position
    }

    /// Number of unread bytes.
    pub const fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Advance the cursor by the given number of bytes and return the eclipsed slice.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(Error::TruncatedData {
                offset: self.offset(),
                needed: count,
                remaining: self.remaining(),
            });
        }

        let slice = &self.buffer[self.position..self.position + count];
        self.position += count;
        Ok(slice)
    }

    /// Returns the next byte without consuming it.
    pub fn peek_u8(&self) -> Result<u8> {
        self.buffer
            .get(self.position)
            .copied()
            .ok_or(Error::TruncatedData {
                offset: self.offset(),
                needed: 1,
                remaining: 0,
            })
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let byte = self.peek_u8()?;
        self.position += 1;
        Ok(byte)
    }

    pub fn read_u16_be(&mut self) -> Result<u16> {
        self.read_as(2)
    }

    pub fn read_u32_be(&mut self) -> Result<u32> {
        self.read_as(4)
    }

    /// Reads a 4-byte chunk tag.
    pub fn read_tag(&mut self) -> Result<[u8; 4]> {
        let mut tag = [0; 4];
        tag.copy_from_slice(self.read_bytes(4)?);
        Ok(tag)
    }

    /// Reads a big-endian base-128 variable length quantity.
    ///
    /// SMF caps these at 4 bytes (28 bits).
    pub fn read_varint(&mut self) -> Result<u32> {
        let start = self.offset();
        let mut value: u32 = 0;
        for _ in 0..4 {
            let byte = self.read_u8()?;
            value = (value << 7) | u32::from(byte & 0x7F);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(Error::decode(start, DecodeReason::VarintTooLong))
    }

    /// Advance the cursor by the given number of bytes and return the eclipsed data as a single
    /// big-endian unsigned integer value.
    fn read_as<T>(&mut self, count: usize) -> Result<T>
    where
        T: AddAssign<T> + From<u8> + ShlAssign<u8>,
    {
        let slice = self.read_bytes(count)?;
        let mut value = T::from(0);
        for byte in slice {
            value <<= 8;
            value += T::from(*byte);
        }

        Ok(value)
    }
}
