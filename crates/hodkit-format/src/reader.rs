//! Bounds-checked cursor over a borrowed byte slice.

use crate::{FormatError, FormatResult, Tag};

/// Cursor that reports absolute file offsets in its errors.
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a reader over `data`, which starts at file offset `base`
    pub fn new(data: &'a [u8], base: usize) -> Self {
        Self { data, pos: 0, base }
    }

    /// Absolute offset of the cursor
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    /// Bytes left after the cursor
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Borrow the next `len` bytes and advance past them
    pub fn take(&mut self, len: usize) -> FormatResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(FormatError::ShortRead {
                offset: self.offset(),
                needed: len,
                available: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> FormatResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn tag(&mut self) -> FormatResult<Tag> {
        Ok(Tag(self.array()?))
    }

    pub fn u16_le(&mut self) -> FormatResult<u16> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    pub fn u32_le(&mut self) -> FormatResult<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    pub fn u32_be(&mut self) -> FormatResult<u32> {
        Ok(u32::from_be_bytes(self.array()?))
    }
}
