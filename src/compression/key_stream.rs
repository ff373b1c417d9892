//! Reversible XOR keystream applied to LZ00 payloads.
//!
//! This is obfuscation, not encryption. The recurrence below must stay
//! exactly as written: existing LZ00 files only decode with this sequence.

/// Keystream generator with a 32-bit state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStream {
    state: u32,
}

impl KeyStream {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    /// Advance the state and return the next mask byte.
    pub fn next_byte(&mut self) -> u8 {
        self.state = next_state(self.state);
        (self.state >> 16) as u8
    }

    /// XOR `data` in place. Applying it twice from the same seed restores
    /// the input.
    pub fn apply(&mut self, data: &mut [u8]) {
        for byte in data {
            *byte ^= self.next_byte();
        }
    }
}

fn next_state(key: u32) -> u32 {
    let mut x = (key << 1).wrapping_add(key);
    x = (x << 5).wrapping_sub(key);
    x = (x << 5).wrapping_add(key);
    x = (x << 7).wrapping_sub(key);
    x = (x << 6).wrapping_sub(x);
    x = (x << 4).wrapping_sub(x);
    ((x << 2).wrapping_sub(x)).wrapping_add(12345)
}
