// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

//! Cursor primitives over caller supplied byte windows.
//!
//! Every operation either succeeds and advances the position by the exact
//! wire width, or fails with [`Incomplete`] and leaves the cursor where it
//! was. A reader reports how many more bytes the operation needs on top of
//! what the window still holds, since unread input is carried over to the
//! next call. A writer reports the free space the operation needs in the
//! next window, since unused space is not.

use derive_more::Display;

/// Not enough bytes (or free space) to complete one primitive.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
#[display("{_0} more bytes needed")]
pub struct Incomplete(pub usize);

pub type TryResult<T> = std::result::Result<T, Incomplete>;

macro_rules! read_le {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            #[inline]
            pub fn $name(&mut self) -> TryResult<$ty> {
                self.try_read_array().map(<$ty>::from_le_bytes)
            }
        )*
    };
}

macro_rules! write_le {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            #[inline]
            pub fn $name(&mut self, value: $ty) -> TryResult<()> {
                self.try_write_bytes(&value.to_le_bytes())
            }
        )*
    };
}

/// Read cursor over one input window.
#[derive(Debug)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        ByteReader { buf, pos: 0 }
    }

    /// Number of bytes consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn require(&self, len: usize) -> TryResult<()> {
        let remaining = self.remaining();
        if remaining < len {
            Err(Incomplete(len - remaining))
        } else {
            Ok(())
        }
    }

    pub fn try_read_array<const N: usize>(&mut self) -> TryResult<[u8; N]> {
        self.require(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    read_le! {
        try_read_u8 => u8,
        try_read_u16 => u16,
        try_read_i32 => i32,
        try_read_u32 => u32,
        try_read_i64 => i64,
    }

    /// Reads exactly `len` bytes or nothing.
    pub fn try_read_exact(&mut self, len: usize) -> TryResult<&'a [u8]> {
        self.require(len)?;
        let out = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    /// Reads up to `max` bytes, whatever the window still holds.
    pub fn read_partial(&mut self, max: usize) -> &'a [u8] {
        let len = max.min(self.remaining());
        let out = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        out
    }

    /// Reads a `[u16 length][payload]` blob as one unit.
    ///
    /// When the payload is not complete the length is not consumed either,
    /// and the reported shortfall covers the whole blob.
    pub fn try_read_blob(&mut self) -> TryResult<&'a [u8]> {
        self.require(2)?;
        let len = u16::from_le_bytes([self.buf[self.pos], self.buf[self.pos + 1]]) as usize;
        self.require(2 + len)?;
        let out = &self.buf[self.pos + 2..self.pos + 2 + len];
        self.pos += 2 + len;
        Ok(out)
    }
}

/// Write cursor over one output window.
#[derive(Debug)]
pub struct ByteWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> ByteWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        ByteWriter { buf, pos: 0 }
    }

    /// Number of bytes written so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn try_write_bytes(&mut self, bytes: &[u8]) -> TryResult<()> {
        if self.remaining() < bytes.len() {
            return Err(Incomplete(bytes.len()));
        }
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    write_le! {
        try_write_u8 => u8,
        try_write_u16 => u16,
        try_write_i32 => i32,
        try_write_u32 => u32,
        try_write_i64 => i64,
    }

    /// Writes as much of `bytes` as fits and returns the count written.
    pub fn write_partial(&mut self, bytes: &[u8]) -> usize {
        let len = bytes.len().min(self.remaining());
        self.buf[self.pos..self.pos + len].copy_from_slice(&bytes[..len]);
        self.pos += len;
        len
    }

    /// Writes a `[u16 length][payload]` blob as one unit.
    ///
    /// Payloads longer than `u16::MAX` are rejected when descriptors are
    /// encoded, never here.
    pub fn try_write_blob(&mut self, payload: &[u8]) -> TryResult<()> {
        debug_assert!(payload.len() <= u16::MAX as usize);
        let total = 2 + payload.len();
        if self.remaining() < total {
            return Err(Incomplete(total));
        }
        self.try_write_u16(payload.len() as u16)?;
        self.try_write_bytes(payload)
    }
}

#[cfg(test)]
mod unittests {
    use hex_literal::hex;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::empty(&[], 4)]
    #[case::one(&[1], 3)]
    #[case::three(&[1, 2, 3], 1)]
    fn short_read_reports_exact_shortfall(#[case] input: &[u8], #[case] needed: usize) {
        let mut reader = ByteReader::new(input);
        assert_eq!(reader.try_read_i32(), Err(Incomplete(needed)));
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn read_advances_by_wire_width() {
        let input = hex!("c0 1d fe ff 07");
        let mut reader = ByteReader::new(&input);
        assert_eq!(reader.try_read_i32(), Ok(-123456));
        assert_eq!(reader.position(), 4);
        assert_eq!(reader.try_read_u8(), Ok(7));
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn blob_is_all_or_nothing() {
        let input = hex!("05 00 61 62");
        let mut reader = ByteReader::new(&input);
        assert_eq!(reader.try_read_blob(), Err(Incomplete(3)));
        assert_eq!(reader.position(), 0);

        let input = hex!("02 00 61 62 ff");
        let mut reader = ByteReader::new(&input);
        assert_eq!(reader.try_read_blob(), Ok(&b"ab"[..]));
        assert_eq!(reader.position(), 4);
    }

    #[test]
    fn partial_read_takes_what_is_there() {
        let input = hex!("01 02 03");
        let mut reader = ByteReader::new(&input);
        assert_eq!(reader.read_partial(10), &input[..]);
        assert_eq!(reader.read_partial(10), &[] as &[u8]);
    }

    #[test]
    fn write_does_not_overflow_window() {
        let mut out = [0u8; 6];
        let mut writer = ByteWriter::new(&mut out);
        assert_eq!(writer.try_write_i32(-123456), Ok(()));
        assert_eq!(writer.try_write_i64(1), Err(Incomplete(8)));
        assert_eq!(writer.position(), 4);
        assert_eq!(writer.write_partial(b"xyz"), 2);
        assert_eq!(out, hex!("c0 1d fe ff 78 79"));
    }

    #[test]
    fn blob_write_needs_whole_blob() {
        let mut out = [0u8; 3];
        let mut writer = ByteWriter::new(&mut out);
        assert_eq!(writer.try_write_blob(b"abc"), Err(Incomplete(5)));
        assert_eq!(writer.position(), 0);
    }
}
