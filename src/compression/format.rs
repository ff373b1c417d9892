//! The closed set of supported formats and name/sniffing helpers.

use std::fmt;
use std::io::Read;
use std::str::FromStr;

use log::{debug, trace};

use super::cnx::Cnx;
use super::lz01::{Lz00, Lz01};
use super::lz10::Lz10;
use super::lz11::Lz11;
use super::prs::Prs;
use super::wrapped::{CMPR, CXLZ, ONZ};
use super::{Compressor, Decompressor};
use crate::config::CompressionConfiguration;
use crate::error::{CompressionError, Result};

/// Every compression format the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionFormat {
    /// Bare LZ10 stream
    Lz10,
    /// `CXLZ` signature + LZ10
    Cxlz,
    /// `CMPR` signature and marker byte + LZ10
    Cmpr,
    /// Bare LZ11 stream
    Lz11,
    /// `ONZ` signature + LZ11
    Onz,
    /// Ring-buffer LZSS with a 56-byte header
    Lz01,
    /// LZ01 layout with a keystream over the payload
    Lz00,
    /// Tiered-flag codec with a 16-byte header
    Cnx,
    /// Headerless bitstream codec
    Prs,
}

impl CompressionFormat {
    /// All formats, in the order [`detect`](Self::detect) probes them.
    ///
    /// Formats with a signature go first; the bare streams, which can only
    /// be recognised structurally, come last.
    pub const ALL: [CompressionFormat; 9] = [
        CompressionFormat::Cxlz,
        CompressionFormat::Cmpr,
        CompressionFormat::Onz,
        CompressionFormat::Lz00,
        CompressionFormat::Lz01,
        CompressionFormat::Cnx,
        CompressionFormat::Lz10,
        CompressionFormat::Lz11,
        CompressionFormat::Prs,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CompressionFormat::Lz10 => "lz10",
            CompressionFormat::Cxlz => "cxlz",
            CompressionFormat::Cmpr => "cmpr",
            CompressionFormat::Lz11 => "lz11",
            CompressionFormat::Onz => "onz",
            CompressionFormat::Lz01 => "lz01",
            CompressionFormat::Lz00 => "lz00",
            CompressionFormat::Cnx => "cnx",
            CompressionFormat::Prs => "prs",
        }
    }

    /// Compress with default options.
    pub fn compress(self, source: &[u8]) -> Result<Vec<u8>> {
        self.compress_with(source, &CompressionConfiguration::default())
    }

    pub fn compress_with(
        self,
        source: &[u8],
        config: &CompressionConfiguration,
    ) -> Result<Vec<u8>> {
        debug!("compressing {} bytes as {}", source.len(), self);
        match self {
            CompressionFormat::Lz10 => Lz10.compress(source),
            CompressionFormat::Cxlz => CXLZ.compress(source),
            CompressionFormat::Cmpr => CMPR.compress(source),
            CompressionFormat::Lz11 => Lz11.compress(source),
            CompressionFormat::Onz => ONZ.compress(source),
            CompressionFormat::Lz01 => Lz01 {
                file_name: config.file_name.clone(),
            }
            .compress(source),
            CompressionFormat::Lz00 => Lz00 {
                file_name: config.file_name.clone(),
                key_seed: config.key_seed,
            }
            .compress(source),
            CompressionFormat::Cnx => Cnx {
                extension: config.extension,
            }
            .compress(source),
            CompressionFormat::Prs => Prs.compress(source),
        }
    }

    /// Read `reader` to the end, then compress what was read.
    ///
    /// A read failure surfaces as [`CompressionError::UnreadableSource`]
    /// before anything is compressed.
    pub fn compress_from<R: Read>(
        self,
        reader: &mut R,
        config: &CompressionConfiguration,
    ) -> Result<Vec<u8>> {
        let mut source = Vec::new();
        reader.read_to_end(&mut source)?;
        self.compress_with(&source, config)
    }

    pub fn decompress(self, source: &[u8]) -> Result<Vec<u8>> {
        debug!("decompressing {} bytes as {}", source.len(), self);
        match self {
            CompressionFormat::Lz10 => Lz10.decompress(source),
            CompressionFormat::Cxlz => CXLZ.decompress(source),
            CompressionFormat::Cmpr => CMPR.decompress(source),
            CompressionFormat::Lz11 => Lz11.decompress(source),
            CompressionFormat::Onz => ONZ.decompress(source),
            CompressionFormat::Lz01 => Lz01::default().decompress(source),
            CompressionFormat::Lz00 => Lz00::default().decompress(source),
            CompressionFormat::Cnx => Cnx::default().decompress(source),
            CompressionFormat::Prs => Prs.decompress(source),
        }
    }

    pub fn identify(self, source: &[u8]) -> bool {
        match self {
            CompressionFormat::Lz10 => Lz10.identify(source),
            CompressionFormat::Cxlz => CXLZ.identify(source),
            CompressionFormat::Cmpr => CMPR.identify(source),
            CompressionFormat::Lz11 => Lz11.identify(source),
            CompressionFormat::Onz => ONZ.identify(source),
            CompressionFormat::Lz01 => Lz01::default().identify(source),
            CompressionFormat::Lz00 => Lz00::default().identify(source),
            CompressionFormat::Cnx => Cnx::default().identify(source),
            CompressionFormat::Prs => Prs.identify(source),
        }
    }

    /// First format in [`ALL`](Self::ALL) whose `identify()` accepts `source`.
    pub fn detect(source: &[u8]) -> Option<CompressionFormat> {
        let found = Self::ALL.iter().copied().find(|format| {
            let hit = format.identify(source);
            trace!("probe {}: {}", format, hit);
            hit
        });
        debug!("detected format for {} bytes: {:?}", source.len(), found);
        found
    }

    /// Detect the format and decompress. `Ok(None)` means nothing matched,
    /// which callers usually treat as "store uncompressed".
    pub fn detect_and_decompress(source: &[u8]) -> Result<Option<(CompressionFormat, Vec<u8>)>> {
        match Self::detect(source) {
            Some(format) => Ok(Some((format, format.decompress(source)?))),
            None => Ok(None),
        }
    }
}

impl fmt::Display for CompressionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CompressionFormat {
    type Err = CompressionError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|format| format.name() == lower)
            .ok_or_else(|| CompressionError::UnknownFormat(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for format in CompressionFormat::ALL {
            assert_eq!(format.name().parse::<CompressionFormat>().unwrap(), format);
            assert_eq!(
                format.to_string().to_uppercase().parse::<CompressionFormat>().unwrap(),
                format
            );
        }
        assert!(matches!(
            "deflate".parse::<CompressionFormat>(),
            Err(CompressionError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_detect_prefers_signatures() {
        let packed = CompressionFormat::Cxlz.compress(b"signature first").unwrap();
        assert_eq!(CompressionFormat::detect(&packed), Some(CompressionFormat::Cxlz));
    }

    #[test]
    fn test_detect_nothing() {
        assert_eq!(CompressionFormat::detect(b"plain text, not compressed"), None);
        assert_eq!(CompressionFormat::detect(&[]), None);
        assert!(CompressionFormat::detect_and_decompress(b"raw").unwrap().is_none());
    }

    #[test]
    fn test_configuration_reaches_headers() {
        let config = CompressionConfiguration::default()
            .with_extension("pvr")
            .with_file_name("title.pvr")
            .with_key_seed(99);
        let cnx = CompressionFormat::Cnx.compress_with(b"data", &config).unwrap();
        assert_eq!(&cnx[4..7], b"pvr");
        let lz00 = CompressionFormat::Lz00.compress_with(b"data", &config).unwrap();
        let header = crate::compression::lz01::Lz01Header::parse(&lz00).unwrap();
        assert_eq!(header.file_name, "title.pvr");
        assert_eq!(header.key_seed, 99);
    }

    #[test]
    fn test_compress_from_reader_error() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "device gone"))
            }
        }
        let err = CompressionFormat::Lz10
            .compress_from(&mut Broken, &CompressionConfiguration::default())
            .unwrap_err();
        assert!(matches!(err, CompressionError::UnreadableSource(_)));
    }

    #[test]
    fn test_compress_from_reader() {
        let mut input: &[u8] = b"read me fully, read me fully";
        let packed = CompressionFormat::Prs
            .compress_from(&mut input, &CompressionConfiguration::default())
            .unwrap();
        assert_eq!(
            CompressionFormat::Prs.decompress(&packed).unwrap(),
            b"read me fully, read me fully"
        );
    }
}
