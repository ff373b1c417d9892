//! LZ11 compression and decompression.
//!
//! Same flag scheme as LZ10 but with three back-reference widths, selected by
//! the high nibble of the first code byte:
//!
//! | nibble | bytes | length range |
//! |--------|-------|--------------|
//! | 2..=15 | 2     | 3 ..= 16     |
//! | 0      | 3     | 17 ..= 272   |
//! | 1      | 4     | 273 ..= 65808|
//!
//! The header is `0x11 | length << 8`. A zero length field means the real
//! length follows as a separate u32, which is also how lengths above 24 bits
//! and the empty stream are written.

use log::debug;

use super::dictionary::WindowDictionary;
use super::{Compressor, Decompressor, MAX_TRAILING_PADDING};
use crate::error::{CompressionError, Result};
use crate::io::byte_stream::{
    check_declared, output_buffer, put_u32_le, ByteReader, History, LengthCounter,
};
use crate::io::flags::{BitOrder, FlagReader, FlagWriter};

/// First header byte of an LZ11 stream.
pub const LZ11_TAG: u8 = 0x11;

const WINDOW_SIZE: usize = 0x1000;
const MIN_MATCH: usize = 3;
const MAX_MATCH: usize = 0x1_0110;

const SHORT_MAX: usize = 0x10;
const MEDIUM_BIAS: usize = 0x11;
const MEDIUM_MAX: usize = 0x110;
const LONG_BIAS: usize = 0x111;

/// Codec for bare LZ11 streams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lz11;

impl Compressor for Lz11 {
    fn compress(&self, source: &[u8]) -> Result<Vec<u8>> {
        let mut dest = Vec::with_capacity(source.len() / 2 + 8);
        encode(source, &mut dest)?;
        debug!("lz11: compressed {} -> {} bytes", source.len(), dest.len());
        Ok(dest)
    }
}

impl Decompressor for Lz11 {
    fn decompress(&self, source: &[u8]) -> Result<Vec<u8>> {
        let mut reader = ByteReader::new(source);
        let declared = read_header(&mut reader)?;
        let mut dest = output_buffer(declared, source.len());
        decode_payload(&mut reader, declared, &mut dest)?;
        debug!("lz11: decompressed {} -> {} bytes", source.len(), dest.len());
        Ok(dest)
    }

    fn identify(&self, source: &[u8]) -> bool {
        let mut reader = ByteReader::new(source);
        let Ok(declared) = read_header(&mut reader) else {
            return false;
        };
        let mut counter = LengthCounter::default();
        decode_payload(&mut reader, declared, &mut counter).is_ok()
            && reader.remaining() <= MAX_TRAILING_PADDING
    }
}

fn read_header(reader: &mut ByteReader<'_>) -> Result<usize> {
    let header = reader.read_u32_le()?;
    if header & 0xFF != LZ11_TAG as u32 {
        return Err(CompressionError::InvalidFormat(format!(
            "expected LZ11 tag 0x11, found {:#04X}",
            header & 0xFF
        )));
    }
    let length = header >> 8;
    if length == 0 {
        return Ok(reader.read_u32_le()? as usize);
    }
    Ok(length as usize)
}

fn decode_payload<H: History>(
    reader: &mut ByteReader<'_>,
    declared: usize,
    out: &mut H,
) -> Result<()> {
    let mut flags = FlagReader::new(BitOrder::MsbFirst);
    while out.produced() < declared {
        if !flags.next_bit(reader)? {
            out.push_literal(reader.read_u8()?);
            continue;
        }

        let b0 = reader.read_u8()? as usize;
        let (length, distance) = match b0 >> 4 {
            0 => {
                let b1 = reader.read_u8()? as usize;
                let b2 = reader.read_u8()? as usize;
                let length = (((b0 & 0x0F) << 4) | (b1 >> 4)) + MEDIUM_BIAS;
                (length, (((b1 & 0x0F) << 8) | b2) + 1)
            }
            1 => {
                let b1 = reader.read_u8()? as usize;
                let b2 = reader.read_u8()? as usize;
                let b3 = reader.read_u8()? as usize;
                let length = (((b0 & 0x0F) << 12) | (b1 << 4) | (b2 >> 4)) + LONG_BIAS;
                (length, (((b2 & 0x0F) << 8) | b3) + 1)
            }
            nibble => {
                let b1 = reader.read_u8()? as usize;
                (nibble + 1, (((b0 & 0x0F) << 8) | b1) + 1)
            }
        };

        check_declared(declared, out.produced(), length)?;
        out.copy_back(distance, length)?;
    }
    Ok(())
}

/// Append a complete LZ11 stream for `source` to `dest`.
pub(crate) fn encode(source: &[u8], dest: &mut Vec<u8>) -> Result<()> {
    let length = u32::try_from(source.len()).map_err(|_| CompressionError::SourceTooLarge {
        size: source.len(),
        limit: u32::MAX as usize,
    })?;
    if length == 0 || length > 0xFF_FFFF {
        put_u32_le(dest, LZ11_TAG as u32);
        put_u32_le(dest, length);
    } else {
        put_u32_le(dest, LZ11_TAG as u32 | length << 8);
    }

    let mut dictionary = WindowDictionary::new(WINDOW_SIZE, MIN_MATCH, MAX_MATCH);
    let mut flags = FlagWriter::new(BitOrder::MsbFirst);
    let mut position = 0;

    while position < source.len() {
        let found = dictionary.search(source, position, source.len());
        if found.is_found() {
            flags.push_bit(dest, true);
            write_reference(dest, found.length, found.distance);
            dictionary.add_entry_range(source, position, found.length);
            position += found.length;
        } else {
            flags.push_bit(dest, false);
            dest.push(source[position]);
            dictionary.add_entry(source, position);
            position += 1;
        }
    }

    Ok(())
}

fn write_reference(dest: &mut Vec<u8>, length: usize, distance: usize) {
    let d = distance - 1;
    if length <= SHORT_MAX {
        dest.push((((length - 1) << 4) | (d >> 8)) as u8);
        dest.push(d as u8);
    } else if length <= MEDIUM_MAX {
        let l = length - MEDIUM_BIAS;
        dest.push((l >> 4) as u8);
        dest.push((((l & 0x0F) << 4) | (d >> 8)) as u8);
        dest.push(d as u8);
    } else {
        let l = length - LONG_BIAS;
        dest.push((0x10 | (l >> 12)) as u8);
        dest.push((l >> 4) as u8);
        dest.push((((l & 0x0F) << 4) | (d >> 8)) as u8);
        dest.push(d as u8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_reference(code: &[u8]) -> (usize, usize) {
        // Wrap the code in a stream: one literal, then the reference
        let mut stream = vec![LZ11_TAG, 0, 0, 0];
        stream.extend_from_slice(&[0, 0, 0, 0]);
        stream.push(0b0100_0000);
        stream.push(b'z');
        stream.extend_from_slice(code);
        let mut reader = ByteReader::new(&stream);
        read_header(&mut reader).unwrap();
        let mut counter = LengthCounter::default();
        // Distance 1 keeps every code valid after the single literal
        decode_payload(&mut reader, usize::MAX, &mut counter).unwrap_err();
        (counter.produced() - 1, reader.position())
    }

    #[test]
    fn test_reference_widths() {
        for (length, width) in [(3, 2), (16, 2), (17, 3), (272, 3), (273, 4), (65808, 4)] {
            let mut code = Vec::new();
            write_reference(&mut code, length, 1);
            assert_eq!(code.len(), width, "length {length}");
            let (decoded, _) = decode_reference(&code);
            assert_eq!(decoded, length);
        }
    }

    #[test]
    fn test_long_run_uses_wide_codes() {
        let data = vec![0xEEu8; 70_000];
        let packed = Lz11.compress(&data).unwrap();
        // literal + two 4-byte references cover it
        assert!(packed.len() < 32, "packed to {} bytes", packed.len());
        assert_eq!(Lz11.decompress(&packed).unwrap(), data);
    }

    #[test]
    fn test_empty_uses_extended_header() {
        let packed = Lz11.compress(&[]).unwrap();
        assert_eq!(packed, vec![0x11, 0, 0, 0, 0, 0, 0, 0]);
        assert!(Lz11.decompress(&packed).unwrap().is_empty());
        assert!(Lz11.identify(&packed));
    }

    #[test]
    fn test_extended_header_decodes() {
        let mut stream = vec![0x11, 0, 0, 0, 3, 0, 0, 0];
        stream.push(0);
        stream.extend_from_slice(b"xyz");
        assert_eq!(Lz11.decompress(&stream).unwrap(), b"xyz");
    }

    #[test]
    fn test_roundtrip_text() {
        let text = b"It was the best of times, it was the worst of times, it was the age of wisdom";
        let packed = Lz11.compress(text).unwrap();
        assert!(Lz11.identify(&packed));
        assert_eq!(Lz11.decompress(&packed).unwrap(), text);
    }

    #[test]
    fn test_rejects_lz10() {
        let stream = [0x10, 0x01, 0x00, 0x00, 0x00, b'a'];
        assert!(!Lz11.identify(&stream));
        assert!(matches!(
            Lz11.decompress(&stream),
            Err(CompressionError::InvalidFormat(_))
        ));
    }
}
