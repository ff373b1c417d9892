//! Flag-byte readers and writers.
//!
//! Every codec in this crate interleaves control bytes with data: a control
//! byte is pulled from the stream the moment the previous one runs out of
//! symbols, so the data belonging to a control byte always follows it. The
//! writer mirrors this by reserving a zeroed slot in the output when it needs a
//! fresh control byte and filling the bits in afterwards.

use super::byte_stream::ByteReader;
use crate::error::Result;

/// Order in which symbols are taken from a control byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOrder {
    /// Highest bits first (Nintendo-style LZ10/LZ11)
    MsbFirst,
    /// Lowest bits first (LZSS ring formats, CNX, PRS)
    LsbFirst,
}

/// Reads fixed-width symbols from control bytes embedded in a stream.
#[derive(Debug, Clone, Copy)]
pub struct FlagReader {
    order: BitOrder,
    width: u8,
    current: u8,
    remaining: u8,
}

impl FlagReader {
    /// Single-bit flags.
    pub fn new(order: BitOrder) -> Self {
        Self::with_width(order, 1)
    }

    /// Symbols of `width` bits; `width` must divide 8.
    pub fn with_width(order: BitOrder, width: u8) -> Self {
        debug_assert!(width > 0 && 8 % width == 0);
        Self {
            order,
            width,
            current: 0,
            remaining: 0,
        }
    }

    /// Take the next symbol, refilling from `source` when exhausted.
    pub fn next(&mut self, source: &mut ByteReader<'_>) -> Result<u8> {
        if self.remaining == 0 {
            self.current = source.read_u8()?;
            self.remaining = 8 / self.width;
        }
        let mask = (1u8 << self.width) - 1;
        let symbol = match self.order {
            BitOrder::MsbFirst => {
                let s = (self.current >> (8 - self.width)) & mask;
                self.current = self.current.checked_shl(self.width as u32).unwrap_or(0);
                s
            }
            BitOrder::LsbFirst => {
                let s = self.current & mask;
                self.current = self.current.checked_shr(self.width as u32).unwrap_or(0);
                s
            }
        };
        self.remaining -= 1;
        Ok(symbol)
    }

    /// Take one bit as a bool.
    pub fn next_bit(&mut self, source: &mut ByteReader<'_>) -> Result<bool> {
        Ok(self.next(source)? != 0)
    }

    /// Drop whatever is left of the current control byte.
    pub fn discard(&mut self) {
        self.remaining = 0;
    }
}

/// Writes fixed-width symbols into control bytes reserved inside `dest`.
#[derive(Debug, Clone, Copy)]
pub struct FlagWriter {
    order: BitOrder,
    width: u8,
    slot: Option<usize>,
    used: u8,
}

impl FlagWriter {
    pub fn new(order: BitOrder) -> Self {
        Self::with_width(order, 1)
    }

    pub fn with_width(order: BitOrder, width: u8) -> Self {
        debug_assert!(width > 0 && 8 % width == 0);
        Self {
            order,
            width,
            slot: None,
            used: 0,
        }
    }

    /// Record one symbol. Must be called before the data it governs is
    /// appended to `dest`.
    pub fn push(&mut self, dest: &mut Vec<u8>, symbol: u8) {
        let per_byte = 8 / self.width;
        let slot = match self.slot {
            Some(slot) if self.used < per_byte => slot,
            _ => {
                dest.push(0);
                self.used = 0;
                let slot = dest.len() - 1;
                self.slot = Some(slot);
                slot
            }
        };
        let mask = (1u8 << self.width) - 1;
        let shift = match self.order {
            BitOrder::MsbFirst => 8 - self.width * (self.used + 1),
            BitOrder::LsbFirst => self.width * self.used,
        };
        dest[slot] |= (symbol & mask) << shift;
        self.used += 1;
    }

    pub fn push_bit(&mut self, dest: &mut Vec<u8>, bit: bool) {
        self.push(dest, bit as u8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msb_first_bits() {
        let data = [0b1010_0000u8];
        let mut reader = ByteReader::new(&data);
        let mut flags = FlagReader::new(BitOrder::MsbFirst);
        let bits: Vec<u8> = (0..4).map(|_| flags.next(&mut reader).unwrap()).collect();
        assert_eq!(bits, vec![1, 0, 1, 0]);
    }

    #[test]
    fn test_lsb_first_two_bit_symbols() {
        let data = [0b11_10_01_00u8];
        let mut reader = ByteReader::new(&data);
        let mut flags = FlagReader::with_width(BitOrder::LsbFirst, 2);
        let symbols: Vec<u8> = (0..4).map(|_| flags.next(&mut reader).unwrap()).collect();
        assert_eq!(symbols, vec![0, 1, 2, 3]);
        assert!(flags.next(&mut reader).is_err());
    }

    #[test]
    fn test_writer_interleaves_slots_with_data() {
        let mut dest = Vec::new();
        let mut flags = FlagWriter::new(BitOrder::LsbFirst);
        for i in 0..9u8 {
            flags.push_bit(&mut dest, i % 2 == 0);
            dest.push(0xF0 | i);
        }
        // First control byte, 8 data bytes, second control byte, 1 data byte
        assert_eq!(dest.len(), 11);
        assert_eq!(dest[0], 0b0101_0101);
        assert_eq!(dest[9], 0b0000_0001);
        assert_eq!(dest[10], 0xF8);

        let mut reader = ByteReader::new(&dest);
        let mut read = FlagReader::new(BitOrder::LsbFirst);
        for i in 0..9u8 {
            assert_eq!(read.next_bit(&mut reader).unwrap(), i % 2 == 0);
            assert_eq!(reader.read_u8().unwrap(), 0xF0 | i);
        }
    }

    #[test]
    fn test_discard_forces_refill() {
        let data = [0xFFu8, 0x00];
        let mut reader = ByteReader::new(&data);
        let mut flags = FlagReader::new(BitOrder::MsbFirst);
        assert!(flags.next_bit(&mut reader).unwrap());
        flags.discard();
        assert!(!flags.next_bit(&mut reader).unwrap());
    }
}
