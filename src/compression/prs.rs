//! PRS compression and decompression.
//!
//! PRS has no header. Control bits are taken lowest bit first from control
//! bytes that are pulled from the stream whenever the previous one is used up:
//!
//! - `1`: copy one literal byte
//! - `0 1` + two bytes `a b`: long reference. `(b << 8 | a) >> 3` is a 13-bit
//!   offset field (distance = 0x2000 - field). A non-zero `a & 7` gives
//!   length `(a & 7) + 2`, otherwise a third byte gives length `byte + 1`.
//!   `a == b == 0` ends the stream.
//! - `0 0 h l` + one byte `o`: short reference, length `(h << 1 | l) + 2`,
//!   distance `256 - o`
//!
//! Every reference is copied byte by byte, so a distance shorter than the
//! length repeats the bytes it has just written.

use log::debug;

use super::dictionary::WindowDictionary;
use super::{Compressor, Decompressor};
use crate::error::Result;
use crate::io::byte_stream::{ByteReader, History, LengthCounter};
use crate::io::flags::{BitOrder, FlagReader, FlagWriter};

/// Furthest back the encoder looks. Kept under 0x2000 so no long reference
/// ever encodes as the all-zero terminator.
const WINDOW_SIZE: usize = 0x1FF0;
const MAX_MATCH: usize = 0x100;
const SHORT_MAX_DISTANCE: usize = 0x100;
const SHORT_MIN_MATCH: usize = 2;
const SHORT_MAX_MATCH: usize = 5;
const LONG_MIN_MATCH: usize = 3;
const LONG_INLINE_MAX: usize = 9;
const LONG_OFFSET_BASE: usize = 0x2000;

/// PRS codec.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Prs;

impl Compressor for Prs {
    fn compress(&self, source: &[u8]) -> Result<Vec<u8>> {
        let mut dest = Vec::with_capacity(source.len() / 2 + 4);
        encode(source, &mut dest);
        debug!("prs: compressed {} -> {} bytes", source.len(), dest.len());
        Ok(dest)
    }
}

impl Decompressor for Prs {
    fn decompress(&self, source: &[u8]) -> Result<Vec<u8>> {
        let mut reader = ByteReader::new(source);
        let mut dest = Vec::with_capacity(source.len() * 2);
        decode(&mut reader, &mut dest)?;
        debug!("prs: decompressed {} -> {} bytes", source.len(), dest.len());
        Ok(dest)
    }

    /// The first control bit must be a literal (nothing exists to reference
    /// yet) unless the stream is a bare terminator, the last two bytes must be
    /// the zero terminator, and a dry run must end exactly there.
    fn identify(&self, source: &[u8]) -> bool {
        if source.len() < 3 || source[source.len() - 2..] != [0u8, 0] {
            return false;
        }
        if source[0] & 1 == 0 && source[..3] != [0b10u8, 0, 0] {
            return false;
        }
        let mut reader = ByteReader::new(source);
        let mut counter = LengthCounter::default();
        decode(&mut reader, &mut counter).is_ok() && reader.is_at_end()
    }
}

fn decode<H: History>(reader: &mut ByteReader<'_>, out: &mut H) -> Result<()> {
    let mut control = FlagReader::new(BitOrder::LsbFirst);
    loop {
        if control.next_bit(reader)? {
            out.push_literal(reader.read_u8()?);
            continue;
        }

        let (distance, length) = if control.next_bit(reader)? {
            let a = reader.read_u8()? as usize;
            let b = reader.read_u8()? as usize;
            if a == 0 && b == 0 {
                return Ok(());
            }
            let distance = LONG_OFFSET_BASE - (((b << 8) | a) >> 3);
            let length = match a & 0x07 {
                0 => reader.read_u8()? as usize + 1,
                inline => inline + 2,
            };
            (distance, length)
        } else {
            let high = control.next(reader)? as usize;
            let low = control.next(reader)? as usize;
            let length = ((high << 1) | low) + 2;
            let distance = SHORT_MAX_DISTANCE - reader.read_u8()? as usize;
            (distance, length)
        };

        out.copy_back(distance, length)?;
    }
}

fn encode(source: &[u8], dest: &mut Vec<u8>) {
    let mut dictionary = WindowDictionary::new(WINDOW_SIZE, SHORT_MIN_MATCH, MAX_MATCH);
    let mut control = FlagWriter::new(BitOrder::LsbFirst);
    let mut position = 0;

    while position < source.len() {
        let found = dictionary.search(source, position, source.len());
        let short = found.is_found()
            && found.distance <= SHORT_MAX_DISTANCE
            && found.length <= SHORT_MAX_MATCH;

        if short {
            let bits = found.length - SHORT_MIN_MATCH;
            control.push_bit(dest, false);
            control.push_bit(dest, false);
            control.push(dest, (bits >> 1) as u8);
            control.push(dest, (bits & 1) as u8);
            dest.push((SHORT_MAX_DISTANCE - found.distance) as u8);
        } else if found.length >= LONG_MIN_MATCH {
            let field = (LONG_OFFSET_BASE - found.distance) << 3;
            control.push_bit(dest, false);
            control.push_bit(dest, true);
            if found.length <= LONG_INLINE_MAX {
                let field = field | (found.length - 2);
                dest.push(field as u8);
                dest.push((field >> 8) as u8);
            } else {
                dest.push(field as u8);
                dest.push((field >> 8) as u8);
                dest.push((found.length - 1) as u8);
            }
        } else {
            control.push_bit(dest, true);
            dest.push(source[position]);
            dictionary.add_entry(source, position);
            position += 1;
            continue;
        }

        dictionary.add_entry_range(source, position, found.length);
        position += found.length;
    }

    // Terminator
    control.push_bit(dest, false);
    control.push_bit(dest, true);
    dest.push(0);
    dest.push(0);
}
