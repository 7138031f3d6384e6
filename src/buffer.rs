//! Bounds-checked, endianness-aware byte access.
//!
//! Two halves: [`BufferView`] wraps an immutable input buffer and exposes
//! offset-addressed reads, [`GrowableBuffer`] is the write side with
//! transparent growth, a cursor, and alignment. Every multi-byte access
//! takes an explicit [`Endianness`] because byte order is a per-file
//! property recovered from the magic signature, not a host property.

use crate::error::{BymlError, Result};

/// Byte order of a file's multi-byte fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    pub fn is_little(self) -> bool {
        matches!(self, Endianness::Little)
    }
}

/// Read-only view over a byte buffer with bounds-checked absolute reads.
#[derive(Clone, Copy)]
pub struct BufferView<'a> {
    data: &'a [u8],
}

impl<'a> BufferView<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn ensure(&self, offset: usize, need: usize) -> Result<()> {
        let end = offset.checked_add(need);
        if end.map_or(true, |end| end > self.data.len()) {
            return Err(BymlError::OutOfRange {
                offset,
                need,
                have: self.data.len().saturating_sub(offset),
            });
        }
        Ok(())
    }

    pub fn bytes_at(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        self.ensure(offset, len)?;
        Ok(&self.data[offset..offset + len])
    }

    pub fn u8_at(&self, offset: usize) -> Result<u8> {
        self.ensure(offset, 1)?;
        Ok(self.data[offset])
    }

    pub fn i8_at(&self, offset: usize) -> Result<i8> {
        Ok(self.u8_at(offset)? as i8)
    }

    pub fn u16_at(&self, offset: usize, endian: Endianness) -> Result<u16> {
        let b = self.bytes_at(offset, 2)?;
        Ok(match endian {
            Endianness::Little => u16::from_le_bytes([b[0], b[1]]),
            Endianness::Big => u16::from_be_bytes([b[0], b[1]]),
        })
    }

    pub fn i16_at(&self, offset: usize, endian: Endianness) -> Result<i16> {
        Ok(self.u16_at(offset, endian)? as i16)
    }

    /// Read a 24-bit unsigned field (BYML count fields and key indices).
    pub fn u24_at(&self, offset: usize, endian: Endianness) -> Result<u32> {
        let b = self.bytes_at(offset, 3)?;
        Ok(match endian {
            Endianness::Little => {
                (b[2] as u32) << 16 | (b[1] as u32) << 8 | b[0] as u32
            }
            Endianness::Big => {
                (b[0] as u32) << 16 | (b[1] as u32) << 8 | b[2] as u32
            }
        })
    }

    /// Read a sign-extended 24-bit field.
    pub fn i24_at(&self, offset: usize, endian: Endianness) -> Result<i32> {
        let raw = self.u24_at(offset, endian)?;
        Ok(((raw << 8) as i32) >> 8)
    }

    pub fn u32_at(&self, offset: usize, endian: Endianness) -> Result<u32> {
        let b = self.bytes_at(offset, 4)?;
        let b = [b[0], b[1], b[2], b[3]];
        Ok(match endian {
            Endianness::Little => u32::from_le_bytes(b),
            Endianness::Big => u32::from_be_bytes(b),
        })
    }

    pub fn i32_at(&self, offset: usize, endian: Endianness) -> Result<i32> {
        Ok(self.u32_at(offset, endian)? as i32)
    }

    pub fn u64_at(&self, offset: usize, endian: Endianness) -> Result<u64> {
        let b = self.bytes_at(offset, 8)?;
        let b = [b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]];
        Ok(match endian {
            Endianness::Little => u64::from_le_bytes(b),
            Endianness::Big => u64::from_be_bytes(b),
        })
    }

    pub fn i64_at(&self, offset: usize, endian: Endianness) -> Result<i64> {
        Ok(self.u64_at(offset, endian)? as i64)
    }

    pub fn f32_at(&self, offset: usize, endian: Endianness) -> Result<f32> {
        Ok(f32::from_bits(self.u32_at(offset, endian)?))
    }

    pub fn f64_at(&self, offset: usize, endian: Endianness) -> Result<f64> {
        Ok(f64::from_bits(self.u64_at(offset, endian)?))
    }

    /// Read a NUL-terminated UTF-8 string starting at `offset`.
    pub fn cstr_at(&self, offset: usize) -> Result<&'a str> {
        self.ensure(offset, 1)?;
        let rest = &self.data[offset..];
        let nul = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(BymlError::OutOfRange {
                offset: self.data.len(),
                need: 1,
                have: 0,
            })?;
        std::str::from_utf8(&rest[..nul])
            .map_err(|source| BymlError::InvalidString { offset, source })
    }
}

/// Growable output buffer with offset-addressed writes.
///
/// Writes past the current capacity grow storage (amortized doubling) while
/// preserving previously written bytes; unwritten gaps stay zeroed. `len()`
/// tracks the high-water mark, which is what [`into_bytes`](Self::into_bytes)
/// trims to.
pub struct GrowableBuffer {
    buf: Vec<u8>,
    len: usize,
    pos: usize,
}

impl GrowableBuffer {
    pub fn new() -> Self {
        Self::with_capacity(0x10000)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity],
            len: 0,
            pos: 0,
        }
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// High-water mark: one past the highest byte written or seeked over.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn grow(&mut self, end: usize) {
        if end > self.buf.len() {
            let new_len = (self.buf.len() * 2).max(end);
            self.buf.resize(new_len, 0);
        }
    }

    fn mark(&mut self, end: usize) {
        self.grow(end);
        if end > self.len {
            self.len = end;
        }
    }

    /// Move the cursor to an absolute position.
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
        self.mark(pos);
    }

    /// Advance the cursor by `n` bytes without writing.
    pub fn skip(&mut self, n: usize) {
        self.seek(self.pos + n);
    }

    /// Round the cursor up to the next multiple of `alignment` (power of two).
    pub fn align(&mut self, alignment: usize) {
        debug_assert!(alignment.is_power_of_two());
        self.seek((self.pos + alignment - 1) & !(alignment - 1));
    }

    pub fn write_bytes_at(&mut self, offset: usize, bytes: &[u8]) {
        self.mark(offset + bytes.len());
        self.buf[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    pub fn write_u8_at(&mut self, offset: usize, value: u8) {
        self.mark(offset + 1);
        self.buf[offset] = value;
    }

    pub fn write_u24_at(&mut self, offset: usize, value: u32, endian: Endianness) {
        debug_assert!(value <= 0x00FF_FFFF);
        let bytes = match endian {
            Endianness::Little => [
                (value & 0xFF) as u8,
                (value >> 8 & 0xFF) as u8,
                (value >> 16 & 0xFF) as u8,
            ],
            Endianness::Big => [
                (value >> 16 & 0xFF) as u8,
                (value >> 8 & 0xFF) as u8,
                (value & 0xFF) as u8,
            ],
        };
        self.write_bytes_at(offset, &bytes);
    }

    pub fn write_u32_at(&mut self, offset: usize, value: u32, endian: Endianness) {
        let bytes = match endian {
            Endianness::Little => value.to_le_bytes(),
            Endianness::Big => value.to_be_bytes(),
        };
        self.write_bytes_at(offset, &bytes);
    }

    pub fn write_i32_at(&mut self, offset: usize, value: i32, endian: Endianness) {
        self.write_u32_at(offset, value as u32, endian);
    }

    pub fn write_u64_at(&mut self, offset: usize, value: u64, endian: Endianness) {
        let bytes = match endian {
            Endianness::Little => value.to_le_bytes(),
            Endianness::Big => value.to_be_bytes(),
        };
        self.write_bytes_at(offset, &bytes);
    }

    pub fn write_i64_at(&mut self, offset: usize, value: i64, endian: Endianness) {
        self.write_u64_at(offset, value as u64, endian);
    }

    pub fn write_f32_at(&mut self, offset: usize, value: f32, endian: Endianness) {
        self.write_u32_at(offset, value.to_bits(), endian);
    }

    pub fn write_f64_at(&mut self, offset: usize, value: f64, endian: Endianness) {
        self.write_u64_at(offset, value.to_bits(), endian);
    }

    // Cursor-relative writes, advancing past what was written.

    pub fn put_u8(&mut self, value: u8) {
        self.write_u8_at(self.pos, value);
        self.pos += 1;
    }

    pub fn put_u24(&mut self, value: u32, endian: Endianness) {
        self.write_u24_at(self.pos, value, endian);
        self.pos += 3;
    }

    pub fn put_u32(&mut self, value: u32, endian: Endianness) {
        self.write_u32_at(self.pos, value, endian);
        self.pos += 4;
    }

    pub fn put_f32(&mut self, value: f32, endian: Endianness) {
        self.write_f32_at(self.pos, value, endian);
        self.pos += 4;
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.write_bytes_at(self.pos, bytes);
        self.pos += bytes.len();
    }

    /// Finalize, trimming to the highest byte actually written.
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.buf.truncate(self.len);
        self.buf
    }
}

impl Default for GrowableBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_out_of_range() {
        let view = BufferView::new(&[1, 2, 3]);
        assert!(view.u32_at(0, Endianness::Big).is_err());
        assert!(view.u8_at(3).is_err());
        match view.u16_at(2, Endianness::Little) {
            Err(BymlError::OutOfRange { offset, need, have }) => {
                assert_eq!((offset, need, have), (2, 2, 1));
            }
            other => panic!("expected OutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn endianness_swap() {
        let data = [0x12, 0x34, 0x56, 0x78];
        let view = BufferView::new(&data);
        assert_eq!(view.u32_at(0, Endianness::Big).unwrap(), 0x1234_5678);
        assert_eq!(view.u32_at(0, Endianness::Little).unwrap(), 0x7856_3412);
        assert_eq!(view.u24_at(0, Endianness::Big).unwrap(), 0x12_3456);
        assert_eq!(view.u24_at(0, Endianness::Little).unwrap(), 0x56_3412);
    }

    #[test]
    fn sign_extension() {
        let view = BufferView::new(&[0xFF, 0xFF, 0xFF]);
        assert_eq!(view.i24_at(0, Endianness::Big).unwrap(), -1);
        let view = BufferView::new(&[0x7F, 0xFF, 0xFF]);
        assert_eq!(view.i24_at(0, Endianness::Big).unwrap(), 0x7F_FFFF);
    }

    #[test]
    fn cstr_reads_to_terminator() {
        let view = BufferView::new(b"abc\0def\0");
        assert_eq!(view.cstr_at(0).unwrap(), "abc");
        assert_eq!(view.cstr_at(4).unwrap(), "def");
        assert_eq!(view.cstr_at(3).unwrap(), "");
        let unterminated = BufferView::new(b"abc");
        assert!(unterminated.cstr_at(0).is_err());
    }

    #[test]
    fn growth_preserves_written_bytes() {
        let mut buf = GrowableBuffer::with_capacity(4);
        buf.write_bytes_at(0, b"abcd");
        buf.write_u32_at(1000, 0xDEAD_BEEF, Endianness::Big);
        let bytes = buf.into_bytes();
        assert_eq!(bytes.len(), 1004);
        assert_eq!(&bytes[0..4], b"abcd");
        assert_eq!(&bytes[4..8], &[0, 0, 0, 0]);
        assert_eq!(&bytes[1000..1004], &[0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn align_advances_and_marks() {
        let mut buf = GrowableBuffer::new();
        buf.put_u8(1);
        buf.align(4);
        assert_eq!(buf.position(), 4);
        buf.align(4);
        assert_eq!(buf.position(), 4);
        assert_eq!(buf.into_bytes(), vec![1, 0, 0, 0]);
    }

    #[test]
    fn high_water_mark_keeps_back_patches() {
        let mut buf = GrowableBuffer::new();
        buf.seek(0x10);
        buf.put_u32(7, Endianness::Big);
        buf.write_u32_at(0x04, 0x10, Endianness::Big);
        assert_eq!(buf.len(), 0x14);
    }
}
