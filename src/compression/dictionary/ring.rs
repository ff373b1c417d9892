//! Circular-buffer match finder.

use super::{EntryTable, Match};

/// Match finder for formats whose decoder keeps its history in a fixed ring
/// buffer and starts writing at `buffer_start` rather than slot zero.
///
/// The region of the ring in front of the first output byte holds no real data,
/// so it is never indexed and never matched. Matches are limited to
/// `buffer_size - max_match_length` bytes back, which keeps a decoder that
/// writes into the ring while it copies from being overtaken by its own
/// writes.
#[derive(Debug, Clone)]
pub struct RingDictionary {
    buffer_size: usize,
    buffer_start: usize,
    min_match_length: usize,
    max_match_length: usize,
    entries: EntryTable,
}

impl RingDictionary {
    pub fn new(
        buffer_size: usize,
        buffer_start: usize,
        min_match_length: usize,
        max_match_length: usize,
    ) -> Self {
        debug_assert!(buffer_size > max_match_length);
        let max_distance = buffer_size - max_match_length;
        Self {
            buffer_size,
            buffer_start: buffer_start % buffer_size,
            min_match_length,
            max_match_length,
            entries: EntryTable::new(min_match_length, max_distance),
        }
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn buffer_start(&self) -> usize {
        self.buffer_start
    }

    /// Greatest distance a match may have.
    pub fn max_distance(&self) -> usize {
        self.buffer_size - self.max_match_length
    }

    pub fn add_entry(&mut self, data: &[u8], position: usize) {
        self.entries.insert(data, position);
    }

    pub fn add_entry_range(&mut self, data: &[u8], start: usize, count: usize) {
        self.entries.insert_range(data, start, count);
    }

    pub fn search(&self, data: &[u8], position: usize, data_length: usize) -> Match {
        self.entries.longest_match(
            data,
            position,
            data_length,
            self.max_distance(),
            self.min_match_length,
            self.max_match_length,
        )
    }

    /// Ring slot the decoder writes output byte `position` into.
    pub fn cursor(&self, position: usize) -> usize {
        (self.buffer_start + position) % self.buffer_size
    }

    /// Ring slot holding the first byte of a match found at `position`.
    pub fn ring_position(&self, position: usize, distance: usize) -> usize {
        (self.buffer_start + self.buffer_size + position - distance % self.buffer_size)
            % self.buffer_size
    }
}
