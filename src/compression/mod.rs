//! LZ-family and bitstream codecs for game resource files.
//!
//! Formats are grouped by their underlying bit layout:
//! - **Window family** ([`lz10`], [`lz11`], plus the magic-prefixed
//!   [`wrapped`] forms): flag bits MSB first, sliding-window matches
//! - **Ring family** ([`lz01`]): flag bits LSB first, 4 KiB ring buffer
//!   starting at 0xFEE, with an optional keystream transform
//! - **Tiered flags** ([`cnx`]): four 2-bit commands per flag byte, 2 KiB ring
//! - **Bitstream** ([`prs`]): single control bits, terminator-delimited
//!
//! [`CompressionFormat`] ties them together for callers that only know the
//! format by name or need to sniff it.

pub mod cnx;
pub mod dictionary;
pub mod format;
pub mod key_stream;
pub mod lz01;
pub mod lz10;
pub mod lz11;
pub mod prs;
pub mod wrapped;

pub use format::CompressionFormat;

use crate::error::Result;

/// Padding some packers append after an LZ10/LZ11 stream to reach a 4-byte
/// boundary. `identify()` tolerates up to this many trailing bytes.
pub(crate) const MAX_TRAILING_PADDING: usize = 3;

/// Trait for compressing data.
pub trait Compressor {
    /// Compress the whole of `source` into a new stream, header included.
    fn compress(&self, source: &[u8]) -> Result<Vec<u8>>;
}

/// Trait for decompressing data.
pub trait Decompressor {
    /// Decompress a complete stream, header included.
    fn decompress(&self, source: &[u8]) -> Result<Vec<u8>>;

    /// Structural check used for format sniffing. Never fails, never panics.
    fn identify(&self, source: &[u8]) -> bool;
}
