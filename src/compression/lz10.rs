//! LZ10 compression and decompression.
//!
//! Stream layout:
//! - u32 LE header: `0x10 | decompressed_length << 8`
//! - flag bytes read MSB first, bit set = back-reference
//! - back-reference: two bytes, `LLLL DDDD DDDDDDDD`, length = L + 3,
//!   distance = D + 1 (window 4096)

use log::debug;

use super::dictionary::WindowDictionary;
use super::{Compressor, Decompressor, MAX_TRAILING_PADDING};
use crate::error::{CompressionError, Result};
use crate::io::byte_stream::{
    check_declared, output_buffer, put_u32_le, ByteReader, History, LengthCounter,
};
use crate::io::flags::{BitOrder, FlagReader, FlagWriter};

/// First header byte of an LZ10 stream.
pub const LZ10_TAG: u8 = 0x10;

/// Largest source the 24-bit length field can describe.
pub const MAX_SOURCE_LENGTH: usize = 0xFF_FFFF;

const WINDOW_SIZE: usize = 0x1000;
const MIN_MATCH: usize = 3;
const MAX_MATCH: usize = 18;

/// Codec for bare LZ10 streams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lz10;

impl Compressor for Lz10 {
    fn compress(&self, source: &[u8]) -> Result<Vec<u8>> {
        let mut dest = Vec::with_capacity(source.len() / 2 + 8);
        encode(source, &mut dest)?;
        debug!("lz10: compressed {} -> {} bytes", source.len(), dest.len());
        Ok(dest)
    }
}

impl Decompressor for Lz10 {
    fn decompress(&self, source: &[u8]) -> Result<Vec<u8>> {
        let mut reader = ByteReader::new(source);
        let declared = read_header(&mut reader)?;
        let mut dest = output_buffer(declared, source.len());
        decode_payload(&mut reader, declared, &mut dest)?;
        debug!("lz10: decompressed {} -> {} bytes", source.len(), dest.len());
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
    if header & 0xFF != LZ10_TAG as u32 {
        return Err(CompressionError::InvalidFormat(format!(
            "expected LZ10 tag 0x10, found {:#04X}",
            header & 0xFF
        )));
    }
    Ok((header >> 8) as usize)
}

fn decode_payload<H: History>(
    reader: &mut ByteReader<'_>,
    declared: usize,
    out: &mut H,
) -> Result<()> {
    let mut flags = FlagReader::new(BitOrder::MsbFirst);
    while out.produced() < declared {
        if flags.next_bit(reader)? {
            let b0 = reader.read_u8()?;
            let b1 = reader.read_u8()?;
            let length = (b0 >> 4) as usize + MIN_MATCH;
            let distance = ((((b0 & 0x0F) as usize) << 8) | b1 as usize) + 1;
            check_declared(declared, out.produced(), length)?;
            out.copy_back(distance, length)?;
        } else {
            out.push_literal(reader.read_u8()?);
        }
    }
    Ok(())
}

/// Append a complete LZ10 stream for `source` to `dest`.
pub(crate) fn encode(source: &[u8], dest: &mut Vec<u8>) -> Result<()> {
    if source.len() > MAX_SOURCE_LENGTH {
        return Err(CompressionError::SourceTooLarge {
            size: source.len(),
            limit: MAX_SOURCE_LENGTH,
        });
    }
    put_u32_le(dest, LZ10_TAG as u32 | (source.len() as u32) << 8);

    let mut dictionary = WindowDictionary::new(WINDOW_SIZE, MIN_MATCH, MAX_MATCH);
    let mut flags = FlagWriter::new(BitOrder::MsbFirst);
    let mut position = 0;

    while position < source.len() {
        let found = dictionary.search(source, position, source.len());
        if found.is_found() {
            flags.push_bit(dest, true);
            let length = found.length - MIN_MATCH;
            let distance = found.distance - 1;
            dest.push(((length << 4) | (distance >> 8)) as u8);
            dest.push((distance & 0xFF) as u8);
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
