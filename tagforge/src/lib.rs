//! [![GitHub Workflow Status](https://img.shields.io/github/actions/workflow/status/tagforge/tagforge/ci.yml?branch=main&style=for-the-badge&logo=github)](https://github.com/tagforge/tagforge/actions/workflows/ci.yml)
//! [![Crates.io](https://img.shields.io/crates/v/tagforge?style=for-the-badge&logo=rust)](https://crates.io/crates/tagforge)
//!
//! ID3v1/ID3v2 tag reading and writing.
//!
//! A file's metadata is exchanged as a single format-independent
//! [`Tag`](tag::Tag); reading merges both on-disk tag versions into one, and
//! saving decides per version whether to write, update, or strip, reporting
//! an independent [`WriteOutcome`] for each.
//!
//! # Examples
//!
//! ```rust,no_run
//! use tagforge::config::{EncodingOptions, ParseOptions, WriteOptions};
//! use tagforge::tag::Tag;
//!
//! # fn main() -> tagforge::error::Result<()> {
//! // Read whatever the file carries
//! let mut tag = tagforge::read_from_path("music.mp3", ParseOptions::new())?;
//!
//! tag.set_title("Know");
//! tag.set_artist("Nick Drake");
//!
//! // Write both versions back
//! let report = tagforge::save_to_path(
//! 	"music.mp3",
//! 	&tag,
//! 	WriteOptions::new(),
//! 	EncodingOptions::new(),
//! );
//! assert!(report.is_success());
//! # Ok(()) }
//! ```
//!
//! # Text encodings
//!
//! All text is UTF-8 internally. On disk, every ID3v2 text frame carries an
//! encoding marker; [`EncodingOptions`](config::EncodingOptions) controls
//! what gets written (Unicode on/off, the single-byte charset, and what to
//! do with unrepresentable characters), and
//! [`ParseOptions::fallback_charset`](config::ParseOptions::fallback_charset)
//! handles old tags written in a mislabeled codepage.

#![deny(missing_docs)]

pub(crate) mod macros;

pub mod config;
pub mod error;
mod field;
pub mod genre;
pub mod guard;
pub mod id3;
pub mod save;
pub mod tag;
pub mod util;

pub use save::{
	TagWriteReport, WriteFailure, WriteOutcome, read_from, read_from_path, save_to, save_to_path,
};
