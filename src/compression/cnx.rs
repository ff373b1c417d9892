//! CNX compression and decompression.
//!
//! Header (16 bytes):
//! - `"CNX\x02"`
//! - 3-byte extension hint of the packed file (e.g. `gvr`)
//! - marker byte `0x10`
//! - u32 BE payload length (header excluded)
//! - u32 BE decompressed length
//!
//! Each flag byte carries four 2-bit commands, lowest bits first:
//!
//! | cmd | meaning |
//! |-----|---------|
//! | 0 | skip to the next 0x800 boundary of the payload; the rest of the flag byte is dropped |
//! | 1 | one literal byte |
//! | 2 | u16 BE back-reference `DDDDDDDD DDDLLLLL`, distance D + 1, length L + 4 |
//! | 3 | count byte N, then N literal bytes |
//!
//! History lives in a 2048-byte ring.

use log::debug;

use super::dictionary::RingDictionary;
use super::{Compressor, Decompressor};
use crate::error::{CompressionError, Result};
use crate::io::byte_stream::{
    check_declared, output_buffer, put_u16_be, put_u32_be, ByteReader,
};
use crate::io::flags::{BitOrder, FlagReader, FlagWriter};

pub const CNX_MAGIC: [u8; 4] = *b"CNX\x02";
const MARKER: u8 = 0x10;
pub const HEADER_SIZE: usize = 16;

const BUFFER_SIZE: usize = 0x800;
const BUFFER_MASK: usize = BUFFER_SIZE - 1;
const BLOCK_SIZE: usize = 0x800;
const MIN_MATCH: usize = 4;
const MAX_MATCH: usize = 35;
const MAX_RUN: usize = 0xFF;

const CMD_SKIP: u8 = 0;
const CMD_LITERAL: u8 = 1;
const CMD_REFERENCE: u8 = 2;
const CMD_RUN: u8 = 3;

/// Parsed CNX header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CnxHeader {
    pub extension: [u8; 3],
    pub compressed_length: u32,
    pub decompressed_length: u32,
}

impl CnxHeader {
    pub fn parse(source: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(source);
        if reader.read_bytes(4)? != CNX_MAGIC {
            return Err(CompressionError::InvalidFormat(
                "missing CNX signature".to_string(),
            ));
        }
        let mut extension = [0u8; 3];
        extension.copy_from_slice(reader.read_bytes(3)?);
        let marker = reader.read_u8()?;
        if marker != MARKER {
            return Err(CompressionError::InvalidFormat(format!(
                "unexpected CNX marker {:#04X}",
                marker
            )));
        }
        Ok(Self {
            extension,
            compressed_length: reader.read_u32_be()?,
            decompressed_length: reader.read_u32_be()?,
        })
    }

    /// Extension hint as text, without trailing NULs.
    pub fn extension_str(&self) -> String {
        let end = self.extension.iter().position(|&b| b == 0).unwrap_or(3);
        String::from_utf8_lossy(&self.extension[..end]).into_owned()
    }
}

/// CNX codec. The extension hint only matters when compressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cnx {
    pub extension: [u8; 3],
}

impl Default for Cnx {
    fn default() -> Self {
        Self {
            extension: *b"bin",
        }
    }
}

impl Compressor for Cnx {
    fn compress(&self, source: &[u8]) -> Result<Vec<u8>> {
        let decompressed_length = u32::try_from(source.len()).map_err(|_| {
            CompressionError::SourceTooLarge {
                size: source.len(),
                limit: u32::MAX as usize,
            }
        })?;

        let mut dest = Vec::with_capacity(HEADER_SIZE + source.len() / 2);
        dest.extend_from_slice(&CNX_MAGIC);
        dest.extend_from_slice(&self.extension);
        dest.push(MARKER);
        put_u32_be(&mut dest, 0);
        put_u32_be(&mut dest, decompressed_length);

        encode_payload(source, &mut dest);

        let payload_length = u32::try_from(dest.len() - HEADER_SIZE).map_err(|_| {
            CompressionError::SourceTooLarge {
                size: source.len(),
                limit: u32::MAX as usize,
            }
        })?;
        dest[8..12].copy_from_slice(&payload_length.to_be_bytes());

        debug!("cnx: compressed {} -> {} bytes", source.len(), dest.len());
        Ok(dest)
    }
}

impl Decompressor for Cnx {
    fn decompress(&self, source: &[u8]) -> Result<Vec<u8>> {
        let header = CnxHeader::parse(source)?;
        let end = HEADER_SIZE
            .saturating_add(header.compressed_length as usize)
            .min(source.len());
        let payload = &source[HEADER_SIZE..end];
        let declared = header.decompressed_length as usize;

        let mut dest = output_buffer(declared, source.len());
        decode_payload(payload, declared, &mut dest)?;
        debug!("cnx: decompressed {} -> {} bytes", source.len(), dest.len());
        Ok(dest)
    }

    fn identify(&self, source: &[u8]) -> bool {
        match CnxHeader::parse(source) {
            Ok(header) => HEADER_SIZE + header.compressed_length as usize == source.len(),
            Err(_) => false,
        }
    }
}

fn decode_payload(payload: &[u8], declared: usize, dest: &mut Vec<u8>) -> Result<()> {
    let mut reader = ByteReader::new(payload);
    let mut flags = FlagReader::with_width(BitOrder::LsbFirst, 2);
    let mut ring = [0u8; BUFFER_SIZE];
    let mut cursor = 0usize;

    while dest.len() < declared {
        match flags.next(&mut reader)? {
            CMD_SKIP => {
                let next = (reader.position() + BLOCK_SIZE) & !(BLOCK_SIZE - 1);
                reader.seek(next);
                flags.discard();
            }
            CMD_LITERAL => {
                check_declared(declared, dest.len(), 1)?;
                let byte = reader.read_u8()?;
                dest.push(byte);
                ring[cursor] = byte;
                cursor = (cursor + 1) & BUFFER_MASK;
            }
            CMD_REFERENCE => {
                let pair = reader.read_u16_be()? as usize;
                let distance = (pair >> 5) + 1;
                let length = (pair & 0x1F) + MIN_MATCH;
                check_declared(declared, dest.len(), length)?;
                if distance > dest.len() {
                    return Err(CompressionError::InvalidFormat(format!(
                        "back-reference {} bytes back with only {} bytes of output",
                        distance,
                        dest.len()
                    )));
                }
                let mut from = (cursor + BUFFER_SIZE - distance) & BUFFER_MASK;
                for _ in 0..length {
                    let byte = ring[from];
                    dest.push(byte);
                    ring[cursor] = byte;
                    cursor = (cursor + 1) & BUFFER_MASK;
                    from = (from + 1) & BUFFER_MASK;
                }
            }
            _ => {
                let count = reader.read_u8()? as usize;
                check_declared(declared, dest.len(), count)?;
                for &byte in reader.read_bytes(count)? {
                    dest.push(byte);
                    ring[cursor] = byte;
                    cursor = (cursor + 1) & BUFFER_MASK;
                }
            }
        }
    }
    Ok(())
}

fn encode_payload(source: &[u8], dest: &mut Vec<u8>) {
    let mut dictionary = RingDictionary::new(BUFFER_SIZE, 0, MIN_MATCH, MAX_MATCH);
    let mut flags = FlagWriter::with_width(BitOrder::LsbFirst, 2);
    let mut pending = 0usize;
    let mut position = 0;

    while position < source.len() {
        let found = dictionary.search(source, position, source.len());
        if found.is_found() {
            flush_literals(&source[position - pending..position], &mut flags, dest);
            pending = 0;
            flags.push(dest, CMD_REFERENCE);
            put_u16_be(
                dest,
                (((found.distance - 1) << 5) | (found.length - MIN_MATCH)) as u16,
            );
            dictionary.add_entry_range(source, position, found.length);
            position += found.length;
        } else {
            dictionary.add_entry(source, position);
            pending += 1;
            position += 1;
        }
    }
    flush_literals(&source[position - pending..position], &mut flags, dest);
}

fn flush_literals(mut literals: &[u8], flags: &mut FlagWriter, dest: &mut Vec<u8>) {
    while !literals.is_empty() {
        if literals.len() == 1 {
            flags.push(dest, CMD_LITERAL);
            dest.push(literals[0]);
            return;
        }
        let count = literals.len().min(MAX_RUN);
        flags.push(dest, CMD_RUN);
        dest.push(count as u8);
        dest.extend_from_slice(&literals[..count]);
        literals = &literals[count..];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let codec = Cnx {
            extension: *b"gvr",
        };
        let packed = codec.compress(b"cnx cnx cnx cnx cnx").unwrap();
        assert_eq!(&packed[..4], b"CNX\x02");
        assert_eq!(&packed[4..7], b"gvr");
        assert_eq!(packed[7], 0x10);
        let header = CnxHeader::parse(&packed).unwrap();
        assert_eq!(header.compressed_length as usize, packed.len() - HEADER_SIZE);
        assert_eq!(header.decompressed_length, 19);
        assert_eq!(header.extension_str(), "gvr");
        assert!(codec.identify(&packed));
    }

    #[test]
    fn test_commands() {
        let packed = Cnx::default().compress(b"wxyzwxyzwxyzQ").unwrap();
        let payload = &packed[HEADER_SIZE..];
        // run of 4 literals, reference (4 back, 8 long), single literal
        assert_eq!(payload[0], CMD_RUN | CMD_REFERENCE << 2 | CMD_LITERAL << 4);
        assert_eq!(payload[1], 4);
        assert_eq!(&payload[2..6], b"wxyz");
        assert_eq!(&payload[6..8], &[0x00, 0x64]);
        assert_eq!(payload[8], b'Q');
        assert_eq!(Cnx::default().decompress(&packed).unwrap(), b"wxyzwxyzwxyzQ");
    }

    #[test]
    fn test_skip_to_block_boundary() {
        let mut payload = vec![CMD_LITERAL | CMD_SKIP << 2, b'A'];
        payload.resize(BLOCK_SIZE, 0xCC);
        payload.extend_from_slice(&[CMD_LITERAL, b'B']);

        let mut stream = Vec::new();
        stream.extend_from_slice(&CNX_MAGIC);
        stream.extend_from_slice(b"bin");
        stream.push(MARKER);
        put_u32_be(&mut stream, payload.len() as u32);
        put_u32_be(&mut stream, 2);
        stream.extend_from_slice(&payload);

        assert!(Cnx::default().identify(&stream));
        assert_eq!(Cnx::default().decompress(&stream).unwrap(), b"AB");
    }

    #[test]
    fn test_long_literal_runs_are_split() {
        let data: Vec<u8> = (0..600u32).map(|i| (i * 7 % 251) as u8).collect();
        let packed = Cnx::default().compress(&data).unwrap();
        assert_eq!(Cnx::default().decompress(&packed).unwrap(), data);
    }

    #[test]
    fn test_oversized_output() {
        let mut stream = Vec::new();
        stream.extend_from_slice(&CNX_MAGIC);
        stream.extend_from_slice(b"bin");
        stream.push(MARKER);
        put_u32_be(&mut stream, 5);
        put_u32_be(&mut stream, 2);
        stream.extend_from_slice(&[CMD_RUN, 3, b'a', b'b', b'c']);
        assert!(matches!(
            Cnx::default().decompress(&stream),
            Err(CompressionError::OversizedOutput {
                declared: 2,
                attempted: 3
            })
        ));
    }

    #[test]
    fn test_bad_marker() {
        let mut packed = Cnx::default().compress(b"marker").unwrap();
        packed[7] = 0x11;
        assert!(!Cnx::default().identify(&packed));
        assert!(matches!(
            Cnx::default().decompress(&packed),
            Err(CompressionError::InvalidFormat(_))
        ));
    }
}
