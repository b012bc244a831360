//! Stream contexts and the primitive codec.
//!
//! A [`TagReader`] or [`TagWriter`] is created by one driver call and threaded
//! through every codec call below it. The byte order is taken from the engine
//! the context was opened for; nothing here consults global state.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::engine::{Endian, Engine};
use crate::error::{TagError, TagResult, TagWarning};
use crate::group::GroupCode;
use crate::schema::IntWidth;

/// Read cursor over an in-memory tag image.
#[derive(Debug)]
pub struct TagReader<'a> {
    bytes: &'a [u8],
    position: usize,
    engine: Engine,
    version: u16,
    warnings: Vec<TagWarning>,
}

impl<'a> TagReader<'a> {
    pub fn new(bytes: &'a [u8], engine: Engine) -> Self {
        Self {
            bytes,
            position: 0,
            engine,
            version: 0,
            warnings: Vec::new(),
        }
    }

    /// Sets the tag version that version-gated fields are evaluated against.
    pub fn with_version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }

    pub fn engine(&self) -> Engine {
        self.engine
    }

    pub fn endian(&self) -> Endian {
        self.engine.endian()
    }

    pub fn version(&self) -> u16 {
        self.version
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.position)
    }

    /// Bytes consumed since `start`.
    pub fn consumed_since(&self, start: usize) -> &'a [u8] {
        self.bytes.get(start..self.position).unwrap_or(&[])
    }

    pub fn warn(&mut self, warning: TagWarning) {
        tracing::warn!(offset = self.position, "{warning}");
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[TagWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<TagWarning> {
        self.warnings
    }

    pub fn read_bytes(&mut self, len: usize) -> TagResult<&'a [u8]> {
        let end = self
            .position
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| TagError::UnexpectedEof {
                offset: self.position,
                needed: len - self.remaining().min(len),
            })?;
        let slice = &self.bytes[self.position..end];
        self.position = end;
        Ok(slice)
    }

    pub fn peek_u8(&self) -> Option<u8> {
        self.bytes.get(self.position).copied()
    }

    /// Advances past `len` bytes of padding without looking at them.
    pub fn skip(&mut self, len: usize) -> TagResult<()> {
        self.read_bytes(len).map(|_| ())
    }

    pub fn read_u8(&mut self) -> TagResult<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_i8(&mut self) -> TagResult<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> TagResult<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(match self.endian() {
            Endian::Big => BigEndian::read_u16(bytes),
            Endian::Little => LittleEndian::read_u16(bytes),
        })
    }

    pub fn read_i16(&mut self) -> TagResult<i16> {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_u32(&mut self) -> TagResult<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(match self.endian() {
            Endian::Big => BigEndian::read_u32(bytes),
            Endian::Little => LittleEndian::read_u32(bytes),
        })
    }

    pub fn read_i32(&mut self) -> TagResult<i32> {
        Ok(self.read_u32()? as i32)
    }

    pub fn read_f32(&mut self) -> TagResult<f32> {
        let bytes = self.read_bytes(4)?;
        Ok(match self.endian() {
            Endian::Big => BigEndian::read_f32(bytes),
            Endian::Little => LittleEndian::read_f32(bytes),
        })
    }

    /// Reads an angle stored in radians and returns it in degrees.
    pub fn read_angle(&mut self) -> TagResult<f32> {
        Ok(self.read_f32()?.to_degrees())
    }

    /// Reads a signed integer of the given width, sign-extended.
    pub fn read_int(&mut self, width: IntWidth) -> TagResult<i64> {
        Ok(match width {
            IntWidth::Byte => i64::from(self.read_i8()?),
            IntWidth::Short => i64::from(self.read_i16()?),
            IntWidth::Long => i64::from(self.read_i32()?),
        })
    }

    /// Reads an unsigned integer of the given width.
    pub fn read_uint(&mut self, width: IntWidth) -> TagResult<u64> {
        Ok(match width {
            IntWidth::Byte => u64::from(self.read_u8()?),
            IntWidth::Short => u64::from(self.read_u16()?),
            IntWidth::Long => u64::from(self.read_u32()?),
        })
    }

    pub fn read_group_code(&mut self) -> TagResult<GroupCode> {
        Ok(GroupCode::from_u32(self.read_u32()?))
    }

    /// Reads a zero-padded string of `width` bytes; bytes after the first NUL
    /// are ignored.
    ///
    /// A value with no terminator is cut the same way the writer cuts it, to
    /// `width - 1` bytes at a char boundary, and a [`TagWarning::Truncated`]
    /// is recorded against `field`.
    pub fn read_fixed_string(&mut self, field: &str, width: usize) -> TagResult<String> {
        let bytes = self.read_bytes(width)?;
        let end = bytes.iter().position(|byte| *byte == 0).unwrap_or(bytes.len());
        let mut text = String::from_utf8_lossy(&bytes[..end]).into_owned();
        let limit = width.saturating_sub(1);
        let kept = truncate_at_char_boundary(&text, limit).len();
        if kept < text.len() {
            text.truncate(kept);
            self.warn(TagWarning::Truncated {
                field: field.to_string(),
                limit,
            });
        }
        Ok(text)
    }
}

/// Append-only writer producing a tag image.
#[derive(Debug)]
pub struct TagWriter {
    buffer: Vec<u8>,
    engine: Engine,
    version: u16,
    warnings: Vec<TagWarning>,
}

impl TagWriter {
    pub fn new(engine: Engine) -> Self {
        Self {
            buffer: Vec::new(),
            engine,
            version: 0,
            warnings: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }

    pub fn engine(&self) -> Engine {
        self.engine
    }

    pub fn endian(&self) -> Endian {
        self.engine.endian()
    }

    pub fn version(&self) -> u16 {
        self.version
    }

    pub fn position(&self) -> usize {
        self.buffer.len()
    }

    pub fn warn(&mut self, warning: TagWarning) {
        tracing::warn!(offset = self.buffer.len(), "{warning}");
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[TagWarning] {
        &self.warnings
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn into_parts(self) -> (Vec<u8>, Vec<TagWarning>) {
        (self.buffer, self.warnings)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Emits `len` zero bytes.
    pub fn write_padding(&mut self, len: usize) {
        self.buffer.resize(self.buffer.len() + len, 0);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.buffer.push(value as u8);
    }

    pub fn write_u16(&mut self, value: u16) {
        let mut bytes = [0u8; 2];
        match self.endian() {
            Endian::Big => BigEndian::write_u16(&mut bytes, value),
            Endian::Little => LittleEndian::write_u16(&mut bytes, value),
        }
        self.buffer.extend_from_slice(&bytes);
    }

    pub fn write_i16(&mut self, value: i16) {
        self.write_u16(value as u16);
    }

    pub fn write_u32(&mut self, value: u32) {
        let mut bytes = [0u8; 4];
        match self.endian() {
            Endian::Big => BigEndian::write_u32(&mut bytes, value),
            Endian::Little => LittleEndian::write_u32(&mut bytes, value),
        }
        self.buffer.extend_from_slice(&bytes);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.write_u32(value as u32);
    }

    pub fn write_f32(&mut self, value: f32) {
        let mut bytes = [0u8; 4];
        match self.endian() {
            Endian::Big => BigEndian::write_f32(&mut bytes, value),
            Endian::Little => LittleEndian::write_f32(&mut bytes, value),
        }
        self.buffer.extend_from_slice(&bytes);
    }

    /// Writes an angle given in degrees as radians.
    pub fn write_angle(&mut self, degrees: f32) {
        self.write_f32(degrees.to_radians());
    }

    /// Writes the low `width` bytes of `value`. The caller checks the range.
    pub fn write_int(&mut self, width: IntWidth, value: i64) {
        match width {
            IntWidth::Byte => self.write_i8(value as i8),
            IntWidth::Short => self.write_i16(value as i16),
            IntWidth::Long => self.write_i32(value as i32),
        }
    }

    pub fn write_uint(&mut self, width: IntWidth, value: u64) {
        match width {
            IntWidth::Byte => self.write_u8(value as u8),
            IntWidth::Short => self.write_u16(value as u16),
            IntWidth::Long => self.write_u32(value as u32),
        }
    }

    pub fn write_group_code(&mut self, code: GroupCode) {
        self.write_u32(code.to_u32());
    }

    /// Writes `value` into exactly `width` bytes, keeping room for a NUL.
    ///
    /// Longer values are cut at a char boundary and a [`TagWarning::Truncated`]
    /// is recorded against `field`.
    pub fn write_fixed_string(&mut self, field: &str, value: &str, width: usize) {
        let limit = width.saturating_sub(1);
        let kept = truncate_at_char_boundary(value, limit);
        if kept.len() < value.len() {
            self.warn(TagWarning::Truncated {
                field: field.to_string(),
                limit,
            });
        }
        self.buffer.extend_from_slice(kept.as_bytes());
        self.write_padding(width - kept.len());
    }
}

/// Longest prefix of `value` that fits in `limit` bytes without splitting a char.
pub(crate) fn truncate_at_char_boundary(value: &str, limit: usize) -> &str {
    if value.len() <= limit {
        return value;
    }
    let mut end = limit;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

#[cfg(test)]
#[path = "tests/stream_tests.rs"]
mod tests;
