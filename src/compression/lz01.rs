//! LZ01 and LZ00 compression and decompression.
//!
//! Both formats are classic LZSS over a 4096-byte ring buffer whose write
//! cursor starts at 0xFEE. The decoder's ring starts zero-filled.
//!
//! Header (56 bytes, little-endian):
//!
//! | offset | size | field |
//! |--------|------|-------|
//! | 0x00 | 4  | magic `LZ01` / `LZ00` |
//! | 0x04 | 4  | total stream length, header included |
//! | 0x08 | 4  | decompressed length |
//! | 0x0C | 32 | file name, Shift-JIS, NUL padded |
//! | 0x2C | 4  | keystream seed (0 for LZ01) |
//! | 0x30 | 8  | reserved |
//!
//! Payload: flag bytes read LSB first, bit set = literal. A back-reference is
//! two bytes `PPPPPPPP PPPPLLLL` holding the absolute ring slot P and length
//! L + 3. LZ00 XORs every payload byte with a [`KeyStream`] seeded from the
//! header.

use std::borrow::Cow;
use std::time::{SystemTime, UNIX_EPOCH};

use encoding_rs::SHIFT_JIS;
use log::debug;

use super::dictionary::RingDictionary;
use super::key_stream::KeyStream;
use super::{Compressor, Decompressor};
use crate::error::{CompressionError, Result};
use crate::io::byte_stream::{check_declared, output_buffer, put_u32_le, ByteReader};
use crate::io::flags::{BitOrder, FlagReader, FlagWriter};

pub const LZ01_MAGIC: [u8; 4] = *b"LZ01";
pub const LZ00_MAGIC: [u8; 4] = *b"LZ00";

/// Size of the fixed header in front of the payload.
pub const HEADER_SIZE: usize = 0x38;
const NAME_OFFSET: usize = 0x0C;
const NAME_LENGTH: usize = 32;
const SEED_OFFSET: usize = 0x2C;

const BUFFER_SIZE: usize = 0x1000;
const BUFFER_MASK: usize = BUFFER_SIZE - 1;
const BUFFER_START: usize = 0xFEE;
const MIN_MATCH: usize = 3;
const MAX_MATCH: usize = 18;

/// Parsed LZ01/LZ00 header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lz01Header {
    pub magic: [u8; 4],
    /// Length of the whole stream, header included.
    pub compressed_length: u32,
    pub decompressed_length: u32,
    /// Stored file name, decoded from Shift-JIS.
    pub file_name: String,
    pub key_seed: u32,
}

impl Lz01Header {
    /// Parse the fixed header at the start of `source`.
    pub fn parse(source: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(source);
        let mut magic = [0u8; 4];
        magic.copy_from_slice(reader.read_bytes(4)?);
        if magic != LZ01_MAGIC && magic != LZ00_MAGIC {
            return Err(CompressionError::InvalidFormat(format!(
                "expected LZ01/LZ00 magic, found {:02X?}",
                magic
            )));
        }
        let compressed_length = reader.read_u32_le()?;
        let decompressed_length = reader.read_u32_le()?;
        let file_name = decode_file_name(reader.read_bytes(NAME_LENGTH)?);
        let key_seed = reader.read_u32_le()?;
        reader.read_bytes(HEADER_SIZE - reader.position())?;

        Ok(Self {
            magic,
            compressed_length,
            decompressed_length,
            file_name,
            key_seed,
        })
    }

    pub fn is_transformed(&self) -> bool {
        self.magic == LZ00_MAGIC
    }
}

/// Plain ring-buffer codec.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lz01 {
    /// Name written into the header.
    pub file_name: String,
}

/// Ring-buffer codec with the keystream transform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lz00 {
    pub file_name: String,
    /// Keystream seed. `None` seeds from the current UNIX time.
    pub key_seed: Option<u32>,
}

impl Compressor for Lz01 {
    fn compress(&self, source: &[u8]) -> Result<Vec<u8>> {
        encode(source, LZ01_MAGIC, &self.file_name, None)
    }
}

impl Decompressor for Lz01 {
    fn decompress(&self, source: &[u8]) -> Result<Vec<u8>> {
        decode(source, LZ01_MAGIC)
    }

    fn identify(&self, source: &[u8]) -> bool {
        identify(source, LZ01_MAGIC)
    }
}

impl Compressor for Lz00 {
    fn compress(&self, source: &[u8]) -> Result<Vec<u8>> {
        let seed = self.key_seed.unwrap_or_else(timestamp_seed);
        encode(source, LZ00_MAGIC, &self.file_name, Some(seed))
    }
}

impl Decompressor for Lz00 {
    fn decompress(&self, source: &[u8]) -> Result<Vec<u8>> {
        decode(source, LZ00_MAGIC)
    }

    fn identify(&self, source: &[u8]) -> bool {
        identify(source, LZ00_MAGIC)
    }
}

fn timestamp_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as u32)
        .unwrap_or(0)
}

fn identify(source: &[u8], magic: [u8; 4]) -> bool {
    match Lz01Header::parse(source) {
        Ok(header) => header.magic == magic && header.compressed_length as usize == source.len(),
        Err(_) => false,
    }
}

fn encode(source: &[u8], magic: [u8; 4], file_name: &str, seed: Option<u32>) -> Result<Vec<u8>> {
    let decompressed_length = u32::try_from(source.len()).map_err(|_| {
        CompressionError::SourceTooLarge {
            size: source.len(),
            limit: u32::MAX as usize,
        }
    })?;

    let mut dest = Vec::with_capacity(HEADER_SIZE + source.len() / 2);
    dest.extend_from_slice(&magic);
    put_u32_le(&mut dest, 0);
    put_u32_le(&mut dest, decompressed_length);
    dest.extend_from_slice(&encode_file_name(file_name));
    put_u32_le(&mut dest, seed.unwrap_or(0));
    dest.resize(HEADER_SIZE, 0);

    let mut dictionary = RingDictionary::new(BUFFER_SIZE, BUFFER_START, MIN_MATCH, MAX_MATCH);
    let mut flags = FlagWriter::new(BitOrder::LsbFirst);
    let mut position = 0;

    while position < source.len() {
        let found = dictionary.search(source, position, source.len());
        if found.is_found() {
            flags.push_bit(&mut dest, false);
            let slot = dictionary.ring_position(position, found.distance);
            dest.push(slot as u8);
            dest.push((((slot >> 4) & 0xF0) | (found.length - MIN_MATCH)) as u8);
            dictionary.add_entry_range(source, position, found.length);
            position += found.length;
        } else {
            flags.push_bit(&mut dest, true);
            dest.push(source[position]);
            dictionary.add_entry(source, position);
            position += 1;
        }
    }

    let total = u32::try_from(dest.len()).map_err(|_| CompressionError::SourceTooLarge {
        size: source.len(),
        limit: u32::MAX as usize,
    })?;
    dest[4..8].copy_from_slice(&total.to_le_bytes());

    if let Some(seed) = seed {
        KeyStream::new(seed).apply(&mut dest[HEADER_SIZE..]);
    }

    debug!(
        "{}: compressed {} -> {} bytes",
        String::from_utf8_lossy(&magic),
        source.len(),
        dest.len()
    );
    Ok(dest)
}

fn decode(source: &[u8], magic: [u8; 4]) -> Result<Vec<u8>> {
    let header = Lz01Header::parse(source)?;
    if header.magic != magic {
        return Err(CompressionError::InvalidFormat(format!(
            "expected {} magic, found {}",
            String::from_utf8_lossy(&magic),
            String::from_utf8_lossy(&header.magic)
        )));
    }

    let end = (header.compressed_length as usize).clamp(HEADER_SIZE, source.len());
    let payload: Cow<'_, [u8]> = if header.is_transformed() {
        let mut clear = source[HEADER_SIZE..end].to_vec();
        KeyStream::new(header.key_seed).apply(&mut clear);
        Cow::Owned(clear)
    } else {
        Cow::Borrowed(&source[HEADER_SIZE..end])
    };

    let declared = header.decompressed_length as usize;
    let mut dest = output_buffer(declared, source.len());
    let mut reader = ByteReader::new(&payload);
    let mut flags = FlagReader::new(BitOrder::LsbFirst);
    let mut ring = [0u8; BUFFER_SIZE];
    let mut cursor = BUFFER_START;

    while dest.len() < declared {
        if flags.next_bit(&mut reader)? {
            let byte = reader.read_u8()?;
            dest.push(byte);
            ring[cursor] = byte;
            cursor = (cursor + 1) & BUFFER_MASK;
        } else {
            let b0 = reader.read_u8()? as usize;
            let b1 = reader.read_u8()? as usize;
            let slot = b0 | ((b1 & 0xF0) << 4);
            let length = (b1 & 0x0F) + MIN_MATCH;
            check_declared(declared, dest.len(), length)?;
            for k in 0..length {
                let byte = ring[(slot + k) & BUFFER_MASK];
                dest.push(byte);
                ring[cursor] = byte;
                cursor = (cursor + 1) & BUFFER_MASK;
            }
        }
    }

    debug!(
        "{}: decompressed {} -> {} bytes",
        String::from_utf8_lossy(&magic),
        source.len(),
        dest.len()
    );
    Ok(dest)
}

fn encode_file_name(name: &str) -> [u8; NAME_LENGTH] {
    let mut field = [0u8; NAME_LENGTH];
    let mut used = 0;
    let mut utf8 = [0u8; 4];
    for ch in name.chars() {
        let (bytes, _, _) = SHIFT_JIS.encode(ch.encode_utf8(&mut utf8));
        if used + bytes.len() > NAME_LENGTH {
            break;
        }
        field[used..used + bytes.len()].copy_from_slice(&bytes);
        used += bytes.len();
    }
    field
}

fn decode_file_name(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    let (name, _, _) = SHIFT_JIS.decode(&field[..end]);
    name.into_owned()
}
