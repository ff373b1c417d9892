//! # gamepack
//!
//! Compression codecs found in console game archives, with format sniffing.
//!
//! ## Features
//!
//! - LZ10 and LZ11 window codecs, bare or behind the `CXLZ`, `CMPR` and `ONZ`
//!   signatures
//! - LZ01 ring-buffer LZSS and its keystream-masked LZ00 variant
//! - CNX tiered-flag codec
//! - PRS bitstream codec
//! - Format detection over raw bytes
//!
//! ## Quick Start
//!
//! ```rust
//! use gamepack::CompressionFormat;
//!
//! let packed = CompressionFormat::Lz11.compress(b"hello hello hello hello")?;
//! assert_eq!(CompressionFormat::detect(&packed), Some(CompressionFormat::Lz11));
//! assert_eq!(CompressionFormat::Lz11.decompress(&packed)?, b"hello hello hello hello");
//! # Ok::<(), gamepack::CompressionError>(())
//! ```
//!
//! ## Architecture
//!
//! - `Compressor` / `Decompressor` - traits every codec implements
//! - `CompressionFormat` - closed enum dispatching to the codecs
//! - `WindowDictionary` / `RingDictionary` - match finders shared by the encoders

#![allow(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod compression;
pub mod config;
pub mod error;
pub mod io;

pub use compression::{CompressionFormat, Compressor, Decompressor};
pub use config::CompressionConfiguration;
pub use error::{CompressionError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
