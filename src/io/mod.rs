//! Byte-level plumbing shared by the codecs.

pub mod byte_stream;
pub mod flags;
