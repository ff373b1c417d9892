//! Shared inputs for the gamepack integration tests.

#![allow(dead_code)]

use gamepack::CompressionFormat;

/// Deterministic xorshift32 bytes, incompressible enough to exercise
/// literal-heavy paths.
pub fn random_bytes(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed.max(1);
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}

/// Repetitive English text.
pub fn text_sample() -> Vec<u8> {
    b"The quick brown fox jumps over the lazy dog. "
        .iter()
        .cycle()
        .take(2000)
        .copied()
        .collect()
}

/// A single byte repeated, longer than every window in the crate.
pub fn run_sample() -> Vec<u8> {
    vec![0x5A; 5000]
}

/// Text with random noise spliced in, to mix matches and literals.
pub fn mixed_sample() -> Vec<u8> {
    let mut data = text_sample();
    let noise = random_bytes(700, 0xC0FFEE);
    data.splice(900..900, noise);
    data.extend(random_bytes(300, 42));
    data.extend_from_slice(&text_sample()[..500]);
    data
}

/// Named inputs used across the round-trip tests.
pub fn samples() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("empty", Vec::new()),
        ("single", vec![0x7F]),
        ("text", text_sample()),
        ("run", run_sample()),
        ("random", random_bytes(4096, 7)),
        ("mixed", mixed_sample()),
    ]
}

pub fn round_trip(format: CompressionFormat, data: &[u8]) -> Vec<u8> {
    let packed = format
        .compress(data)
        .unwrap_or_else(|e| panic!("{} failed to compress: {}", format, e));
    format
        .decompress(&packed)
        .unwrap_or_else(|e| panic!("{} failed to decompress own output: {}", format, e))
}
