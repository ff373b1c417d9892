//! Sliding-window match finder.

use super::{EntryTable, Match};

/// LZ77 match finder over the last `window_size` bytes of the source.
///
/// Positions are indexed as the encoder advances; after emitting a match the
/// encoder must index every covered position with [`add_entry_range`] or later
/// searches miss matches that start inside it.
///
/// [`add_entry_range`]: WindowDictionary::add_entry_range
#[derive(Debug, Clone)]
pub struct WindowDictionary {
    window_size: usize,
    min_match_length: usize,
    max_match_length: usize,
    entries: EntryTable,
}

impl WindowDictionary {
    pub fn new(window_size: usize, min_match_length: usize, max_match_length: usize) -> Self {
        Self {
            window_size,
            min_match_length,
            max_match_length,
            entries: EntryTable::new(min_match_length, window_size),
        }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn min_match_length(&self) -> usize {
        self.min_match_length
    }

    pub fn max_match_length(&self) -> usize {
        self.max_match_length
    }

    /// Index the prefix starting at `position`.
    pub fn add_entry(&mut self, data: &[u8], position: usize) {
        self.entries.insert(data, position);
    }

    /// Index `count` consecutive positions starting at `start`.
    pub fn add_entry_range(&mut self, data: &[u8], start: usize, count: usize) {
        self.entries.insert_range(data, start, count);
    }

    /// Longest prior occurrence of the bytes at `position`, considering only
    /// `data[..data_length]`.
    pub fn search(&self, data: &[u8], position: usize, data_length: usize) -> Match {
        self.entries.longest_match(
            data,
            position,
            data_length,
            self.window_size,
            self.min_match_length,
            self.max_match_length,
        )
    }
}
