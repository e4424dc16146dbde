//! ID3v1 items
//!
//! # A warning about ID3v1
//!
//! ID3v1 is a severely limited format: 128 bytes at the end of the file,
//! single-byte text only, every field capped at 30 bytes or less. It exists
//! here for compatibility with old software; anything it cannot hold is
//! expected to live in the ID3v2 tag alongside it.

pub(crate) mod constants;
pub(crate) mod read;
pub(crate) mod tag;
pub(crate) mod write;

pub use tag::Id3v1Tag;
