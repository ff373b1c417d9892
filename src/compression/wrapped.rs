//! Formats that prepend a signature to an LZ10 or LZ11 stream and otherwise
//! delegate to it unchanged.

use log::debug;

use super::lz10::Lz10;
use super::lz11::Lz11;
use super::{Compressor, Decompressor};
use crate::error::{CompressionError, Result};

/// A magic prefix, optionally followed by one marker byte, in front of an
/// inner codec's stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wrapped<C> {
    name: &'static str,
    magic: [u8; 4],
    marker: Option<u8>,
    inner: C,
}

/// `"CXLZ"` + LZ10.
pub const CXLZ: Wrapped<Lz10> = Wrapped {
    name: "cxlz",
    magic: *b"CXLZ",
    marker: None,
    inner: Lz10,
};

/// `"CMPR"` + marker `0x01` + LZ10.
pub const CMPR: Wrapped<Lz10> = Wrapped {
    name: "cmpr",
    magic: *b"CMPR",
    marker: Some(0x01),
    inner: Lz10,
};

/// `"ONZ\0"` + LZ11.
pub const ONZ: Wrapped<Lz11> = Wrapped {
    name: "onz",
    magic: *b"ONZ\0",
    marker: None,
    inner: Lz11,
};

impl<C> Wrapped<C> {
    pub fn magic(&self) -> &[u8; 4] {
        &self.magic
    }

    fn prefix_len(&self) -> usize {
        self.magic.len() + self.marker.map_or(0, |_| 1)
    }

    fn has_prefix(&self, source: &[u8]) -> bool {
        source.len() >= self.prefix_len()
            && source[..4] == self.magic
            && self.marker.map_or(true, |m| source[4] == m)
    }
}

impl<C: Compressor> Compressor for Wrapped<C> {
    fn compress(&self, source: &[u8]) -> Result<Vec<u8>> {
        let body = self.inner.compress(source)?;
        let mut dest = Vec::with_capacity(self.prefix_len() + body.len());
        dest.extend_from_slice(&self.magic);
        if let Some(marker) = self.marker {
            dest.push(marker);
        }
        dest.extend_from_slice(&body);
        debug!("{}: wrapped {} byte stream", self.name, body.len());
        Ok(dest)
    }
}

impl<C: Decompressor> Decompressor for Wrapped<C> {
    fn decompress(&self, source: &[u8]) -> Result<Vec<u8>> {
        if !self.has_prefix(source) {
            return Err(CompressionError::InvalidFormat(format!(
                "missing {} signature",
                self.name
            )));
        }
        self.inner.decompress(&source[self.prefix_len()..])
    }

    fn identify(&self, source: &[u8]) -> bool {
        self.has_prefix(source) && self.inner.identify(&source[self.prefix_len()..])
    }
}
