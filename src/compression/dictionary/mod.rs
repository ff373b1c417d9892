//! Back-reference dictionaries used by the LZ encoders.
//!
//! Two matchers share one entry table:
//! - [`WindowDictionary`]: plain sliding window over the source
//! - [`RingDictionary`]: fixed circular buffer with a logical start cursor
//!
//! Both report matches as a distance back from the cursor, so the codecs decide
//! how a match is spelled in their own bit layout.

pub mod ring;
pub mod window;

use std::collections::VecDeque;

use ahash::AHashMap;

pub use ring::RingDictionary;
pub use window::WindowDictionary;

/// A back-reference candidate. `length == 0` means nothing was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Match {
    /// Bytes back from the current position (always ≥ 1 for a real match).
    pub distance: usize,
    /// Number of bytes covered.
    pub length: usize,
}

impl Match {
    pub const NONE: Match = Match {
        distance: 0,
        length: 0,
    };

    pub fn is_found(&self) -> bool {
        self.length > 0
    }
}

/// Prefix → prior positions, oldest first.
///
/// Keys are the prefix bytes themselves packed into a `u32`, so two positions
/// in one bucket are guaranteed to agree on their first `prefix_len` bytes.
#[derive(Debug, Clone)]
pub(crate) struct EntryTable {
    prefix_len: usize,
    horizon: usize,
    buckets: AHashMap<u32, VecDeque<usize>>,
}

impl EntryTable {
    pub(crate) fn new(min_match_length: usize, horizon: usize) -> Self {
        Self {
            prefix_len: min_match_length.clamp(1, 3),
            horizon,
            buckets: AHashMap::new(),
        }
    }

    fn key(&self, data: &[u8], position: usize, data_length: usize) -> Option<u32> {
        let end = position.checked_add(self.prefix_len)?;
        if end > data_length.min(data.len()) {
            return None;
        }
        Some(
            data[position..end]
                .iter()
                .fold(0u32, |acc, &b| (acc << 8) | b as u32),
        )
    }

    pub(crate) fn insert(&mut self, data: &[u8], position: usize) {
        let Some(key) = self.key(data, position, data.len()) else {
            return;
        };
        let horizon = self.horizon;
        let bucket = self.buckets.entry(key).or_default();
        bucket.push_back(position);
        while let Some(&oldest) = bucket.front() {
            if position - oldest > horizon {
                bucket.pop_front();
            } else {
                break;
            }
        }
    }

    pub(crate) fn insert_range(&mut self, data: &[u8], start: usize, count: usize) {
        for position in start..start.saturating_add(count) {
            self.insert(data, position);
        }
    }

    /// Longest match at `position` no further back than `max_distance`.
    /// Equal lengths resolve to the nearest candidate.
    pub(crate) fn longest_match(
        &self,
        data: &[u8],
        position: usize,
        data_length: usize,
        max_distance: usize,
        min_match_length: usize,
        max_match_length: usize,
    ) -> Match {
        let data_length = data_length.min(data.len());
        if position >= data_length {
            return Match::NONE;
        }
        let limit = max_match_length.min(data_length - position);
        if limit < min_match_length {
            return Match::NONE;
        }
        let Some(key) = self.key(data, position, data_length) else {
            return Match::NONE;
        };
        let Some(bucket) = self.buckets.get(&key) else {
            return Match::NONE;
        };

        let mut best = Match::NONE;
        for &candidate in bucket.iter().rev() {
            if candidate >= position {
                continue;
            }
            let distance = position - candidate;
            if distance > max_distance {
                break;
            }
            let mut length = 0;
            while length < limit && data[candidate + length] == data[position + length] {
                length += 1;
            }
            if length > best.length {
                best = Match { distance, length };
                if length == limit {
                    break;
                }
            }
        }

        if best.length < min_match_length {
            Match::NONE
        } else {
            best
        }
    }
}
