//! Options applied when compressing.
//!
//! Decompression never needs configuration: everything a decoder requires is
//! stored in the stream itself.

/// Per-call compression options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionConfiguration {
    /// Seed for the LZ00 keystream.
    ///
    /// Default: `None`, seed from the current UNIX time.
    pub key_seed: Option<u32>,

    /// File name stored in LZ01/LZ00 headers. Encoded as Shift-JIS and cut to
    /// 32 bytes on a character boundary.
    ///
    /// Default: empty.
    pub file_name: String,

    /// Extension hint stored in CNX headers.
    ///
    /// Default: `b"bin"`.
    pub extension: [u8; 3],
}

impl Default for CompressionConfiguration {
    fn default() -> Self {
        Self {
            key_seed: None,
            file_name: String::new(),
            extension: *b"bin",
        }
    }
}

impl CompressionConfiguration {
    /// Fixed keystream seed, for reproducible LZ00 output.
    pub fn with_key_seed(mut self, seed: u32) -> Self {
        self.key_seed = Some(seed);
        self
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    /// Extension hint from a string. Shorter values are NUL padded, longer
    /// ones cut to three bytes.
    pub fn with_extension(mut self, extension: &str) -> Self {
        let mut hint = [0u8; 3];
        for (slot, byte) in hint.iter_mut().zip(extension.bytes()) {
            *slot = byte;
        }
        self.extension = hint;
        self
    }
}
