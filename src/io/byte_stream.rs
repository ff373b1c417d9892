//! Bounded byte reading and back-reference expansion shared by every codec.
//!
//! Decoders read their source through [`ByteReader`], which reports
//! [`CompressionError::TruncatedStream`] instead of panicking when the source
//! runs out, and write through a [`History`] sink. The sink is either the real
//! output buffer or a [`LengthCounter`] used by `identify()` to walk a stream
//! without allocating its decompressed contents.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::{CompressionError, Result};

// ---------------------------------------------------------------------------
// ByteReader
// ---------------------------------------------------------------------------

/// Forward cursor over a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Current offset from the start of the slice.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Total length of the underlying slice.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left between the cursor and the end of the slice.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Move the cursor to an absolute offset.
    ///
    /// Seeking past the end is allowed; the next read reports truncation.
    pub fn seek(&mut self, position: usize) {
        self.position = position;
    }

    /// Borrow `count` bytes and advance past them.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(CompressionError::TruncatedStream {
                offset: self.position,
                needed: count - self.remaining(),
            });
        }
        let slice = &self.data[self.position..self.position + count];
        self.position += count;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16_be(&mut self) -> Result<u16> {
        Ok(BigEndian::read_u16(self.read_bytes(2)?))
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.read_bytes(4)?))
    }

    pub fn read_u32_be(&mut self) -> Result<u32> {
        Ok(BigEndian::read_u32(self.read_bytes(4)?))
    }
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

pub fn put_u16_be(dest: &mut Vec<u8>, value: u16) {
    let mut buf = [0u8; 2];
    BigEndian::write_u16(&mut buf, value);
    dest.extend_from_slice(&buf);
}

pub fn put_u32_le(dest: &mut Vec<u8>, value: u32) {
    let mut buf = [0u8; 4];
    LittleEndian::write_u32(&mut buf, value);
    dest.extend_from_slice(&buf);
}

pub fn put_u32_be(dest: &mut Vec<u8>, value: u32) {
    let mut buf = [0u8; 4];
    BigEndian::write_u32(&mut buf, value);
    dest.extend_from_slice(&buf);
}

/// Output buffer for a stream declaring `declared` bytes.
///
/// The capacity hint is bounded by the source size so a corrupt header cannot
/// force a huge allocation up front.
pub fn output_buffer(declared: usize, source_len: usize) -> Vec<u8> {
    Vec::with_capacity(declared.min(source_len.saturating_mul(16)))
}

// ---------------------------------------------------------------------------
// History sinks
// ---------------------------------------------------------------------------

/// Append-only decompression output that doubles as the back-reference
/// history.
pub trait History {
    /// Number of bytes produced so far.
    fn produced(&self) -> usize;

    /// Append one literal byte.
    fn push_literal(&mut self, byte: u8);

    /// Copy `length` bytes starting `distance` bytes back from the cursor.
    ///
    /// The copy runs one byte at a time so `distance < length` repeats the
    /// bytes written earlier in the same copy.
    fn copy_back(&mut self, distance: usize, length: usize) -> Result<()>;
}

impl History for Vec<u8> {
    fn produced(&self) -> usize {
        self.len()
    }

    fn push_literal(&mut self, byte: u8) {
        self.push(byte);
    }

    fn copy_back(&mut self, distance: usize, length: usize) -> Result<()> {
        check_distance(self.len(), distance)?;
        self.reserve(length);
        let mut from = self.len() - distance;
        for _ in 0..length {
            let byte = self[from];
            self.push(byte);
            from += 1;
        }
        Ok(())
    }
}

/// History sink that only counts bytes. Used for dry-run stream validation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LengthCounter(pub usize);

impl History for LengthCounter {
    fn produced(&self) -> usize {
        self.0
    }

    fn push_literal(&mut self, _byte: u8) {
        self.0 += 1;
    }

    fn copy_back(&mut self, distance: usize, length: usize) -> Result<()> {
        check_distance(self.0, distance)?;
        self.0 += length;
        Ok(())
    }
}

fn check_distance(produced: usize, distance: usize) -> Result<()> {
    if distance == 0 || distance > produced {
        return Err(CompressionError::InvalidFormat(format!(
            "back-reference {} bytes back with only {} bytes of output",
            distance, produced
        )));
    }
    Ok(())
}

/// Fail with [`CompressionError::OversizedOutput`] if appending `extra` bytes
/// would overrun the declared output length.
pub fn check_declared(declared: usize, produced: usize, extra: usize) -> Result<()> {
    let attempted = produced + extra;
    if attempted > declared {
        return Err(CompressionError::OversizedOutput {
            declared,
            attempted,
        });
    }
    Ok(())
}
