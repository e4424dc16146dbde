//! Conversion between the character sets that appear in ID3 tags
//!
//! All tag text is held internally as UTF-8 [`String`]s; this module is the
//! boundary where the on-disk byte representations are produced and consumed.

use crate::error::{ErrorKind, Result, TagError};
use crate::macros::err;

use std::fmt::{Display, Formatter};

/// A named character set
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum Charset {
	/// ISO-8859-1 (Latin-1), the single-byte set ID3 was designed around
	Iso8859_1,
	/// UTF-8
	Utf8,
	/// UTF-16 little endian
	Utf16Le,
	/// UTF-16 big endian
	Utf16Be,
}

impl Charset {
	/// The conventional name of the charset, as it would appear in an iconv invocation
	pub fn name(self) -> &'static str {
		match self {
			Self::Iso8859_1 => "ISO-8859-1",
			Self::Utf8 => "UTF-8",
			Self::Utf16Le => "UTF-16LE",
			Self::Utf16Be => "UTF-16BE",
		}
	}

	/// Get a `Charset` from a conventional name (case-insensitive)
	pub fn from_name(name: &str) -> Option<Self> {
		match name.to_ascii_uppercase().as_str() {
			"ISO-8859-1" | "LATIN1" => Some(Self::Iso8859_1),
			"UTF-8" => Some(Self::Utf8),
			"UTF-16LE" => Some(Self::Utf16Le),
			"UTF-16BE" => Some(Self::Utf16Be),
			_ => None,
		}
	}
}

impl Display for Charset {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}

/// What to do with a character that has no representation in the destination charset
///
/// This mirrors the iconv `//TRANSLIT` and `//IGNORE` suffixes.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum ConflictPolicy {
	/// Fail the conversion, reporting the offending character
	Reject,
	/// Substitute one or more visually similar characters, never failing
	#[default]
	Transliterate,
	/// Silently drop the character, never failing
	Discard,
}

/// An unrepresentable character encountered with [`ConflictPolicy::Reject`]
#[derive(Copy, Clone, Debug)]
pub struct ConversionError {
	charset: Charset,
	character: char,
}

impl ConversionError {
	/// The destination charset of the failed conversion
	pub fn charset(&self) -> Charset {
		self.charset
	}

	/// The character with no representation in the destination charset
	pub fn character(&self) -> char {
		self.character
	}
}

impl Display for ConversionError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"character {:?} has no representation in {}",
			self.character, self.charset
		)
	}
}

impl std::error::Error for ConversionError {}

/// Decode a length-delimited byte buffer into a `String`
///
/// UTF-16 payloads may legitimately contain embedded zero bytes, so no byte
/// value terminates the buffer here; use [`decode_terminated`] for
/// NUL-terminated input.
///
/// # Errors
///
/// * The bytes are not valid in `charset`
pub fn decode(bytes: &[u8], charset: Charset) -> Result<String> {
	match charset {
		Charset::Iso8859_1 => Ok(bytes.iter().map(|b| *b as char).collect()),
		Charset::Utf8 => String::from_utf8(bytes.to_vec()).map_err(Into::into),
		Charset::Utf16Le => decode_utf16(bytes, u16::from_le_bytes),
		Charset::Utf16Be => decode_utf16(bytes, u16::from_be_bytes),
	}
}

/// Decode a NUL-terminated byte buffer into a `String`
///
/// Returns the decoded text and the number of bytes consumed, including the
/// terminator. The terminator is a single zero byte for single-byte charsets
/// and a zero *pair* for UTF-16, where lone zero bytes are ordinary content.
///
/// # Errors
///
/// * The bytes are not valid in `charset`
pub fn decode_terminated(bytes: &[u8], charset: Charset) -> Result<(String, usize)> {
	match charset {
		Charset::Iso8859_1 | Charset::Utf8 => {
			let end = bytes.iter().position(|b| *b == 0);
			let content = &bytes[..end.unwrap_or(bytes.len())];
			Ok((
				decode(content, charset)?,
				content.len() + usize::from(end.is_some()),
			))
		},
		Charset::Utf16Le | Charset::Utf16Be => {
			let end = bytes
				.chunks_exact(2)
				.position(|pair| pair == [0, 0])
				.map(|units| units * 2);
			let content = &bytes[..end.unwrap_or(bytes.len())];
			Ok((
				decode(content, charset)?,
				content.len() + if end.is_some() { 2 } else { 0 },
			))
		},
	}
}

fn decode_utf16(bytes: &[u8], endianness: fn([u8; 2]) -> u16) -> Result<String> {
	if bytes.len() % 2 != 0 {
		err!(TextDecode("UTF-16 string has an odd length"));
	}

	let units = bytes
		.chunks_exact(2)
		.map(|pair| endianness(pair.try_into().unwrap())) // Infallible
		.collect::<Vec<u16>>();

	String::from_utf16(&units)
		.map_err(|_| TagError::new(ErrorKind::TextDecode("invalid UTF-16 string")))
}

/// Encode a `&str` into the destination charset
///
/// Only the single-byte destination can be lossy; `policy` decides what
/// happens to characters outside it.
///
/// # Errors
///
/// * `policy` is [`ConflictPolicy::Reject`] and a character cannot be
///   represented in `charset` ([`ErrorKind::UnsupportedCharacter`](crate::error::ErrorKind::UnsupportedCharacter))
pub fn encode(text: &str, charset: Charset, policy: ConflictPolicy) -> Result<Vec<u8>> {
	match charset {
		Charset::Iso8859_1 => encode_latin1(text, policy),
		Charset::Utf8 => Ok(text.as_bytes().to_vec()),
		Charset::Utf16Le => Ok(text
			.encode_utf16()
			.flat_map(u16::to_le_bytes)
			.collect::<Vec<u8>>()),
		Charset::Utf16Be => Ok(text
			.encode_utf16()
			.flat_map(u16::to_be_bytes)
			.collect::<Vec<u8>>()),
	}
}

/// Convert a byte buffer between two charsets
///
/// This is a pure transform; the input is never mutated.
///
/// # Errors
///
/// * The bytes are not valid in `from`
/// * `policy` is [`ConflictPolicy::Reject`] and a character cannot be represented in `to`
pub fn convert(bytes: &[u8], from: Charset, to: Charset, policy: ConflictPolicy) -> Result<Vec<u8>> {
	let text = decode(bytes, from)?;
	encode(&text, to, policy)
}

/// Whether `text` survives a round trip through `charset` unchanged
pub fn is_representable(text: &str, charset: Charset) -> bool {
	match charset {
		Charset::Iso8859_1 => text.chars().all(|c| c as u32 <= 255),
		_ => true,
	}
}

fn encode_latin1(text: &str, policy: ConflictPolicy) -> Result<Vec<u8>> {
	let mut out = Vec::with_capacity(text.len());

	for c in text.chars() {
		if (c as u32) <= 255 {
			out.push(c as u8);
			continue;
		}

		match policy {
			ConflictPolicy::Reject => {
				return Err(TagError::new(ErrorKind::UnsupportedCharacter(
					ConversionError {
						charset: Charset::Iso8859_1,
						character: c,
					},
				)));
			},
			ConflictPolicy::Transliterate => out.extend_from_slice(transliterate(c).as_bytes()),
			ConflictPolicy::Discard => {},
		}
	}

	Ok(out)
}

/// A visually similar ASCII replacement for a character outside Latin-1
///
/// Covers the typographic characters that actually show up in tag text;
/// anything unrecognized degrades to `"?"`.
fn transliterate(c: char) -> &'static str {
	match c {
		'\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2039}' | '\u{203A}' => "'",
		'\u{201C}' | '\u{201D}' | '\u{201E}' => "\"",
		'\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}' => "-",
		'\u{2026}' => "...",
		'\u{2022}' | '\u{00B7}' => "*",
		'\u{20AC}' => "EUR",
		'\u{2122}' => "TM",
		'\u{0152}' => "OE",
		'\u{0153}' => "oe",
		'\u{0160}' => "S",
		'\u{0161}' => "s",
		'\u{017D}' => "Z",
		'\u{017E}' => "z",
		'\u{0178}' => "Y",
		'\u{FB01}' => "fi",
		'\u{FB02}' => "fl",
		'\u{2212}' => "-",
		'\u{00A0}' => " ",
		_ => "?",
	}
}

#[cfg(test)]
mod tests {
	use super::{Charset, ConflictPolicy};

	#[test_log::test]
	fn latin1_round_trip() {
		let text = "na\u{00ef}ve caf\u{00e9}";
		let encoded = super::encode(text, Charset::Iso8859_1, ConflictPolicy::Reject).unwrap();
		assert_eq!(encoded.len(), text.chars().count());

		let decoded = super::decode(&encoded, Charset::Iso8859_1).unwrap();
		assert_eq!(decoded, text);
	}

	#[test_log::test]
	fn conflict_policies() {
		let text = "a\u{2014}b\u{4E16}c";

		super::encode(text, Charset::Iso8859_1, ConflictPolicy::Reject).unwrap_err();

		let transliterated =
			super::encode(text, Charset::Iso8859_1, ConflictPolicy::Transliterate).unwrap();
		assert_eq!(transliterated, b"a-b?c");

		let discarded = super::encode(text, Charset::Iso8859_1, ConflictPolicy::Discard).unwrap();
		assert_eq!(discarded, b"abc");
	}

	#[test_log::test]
	fn utf16_embedded_zeros() {
		// 'A' in UTF-16BE is [0x00, 0x41]; the zero byte is content, not a terminator
		let bytes = [0x00, 0x41, 0x00, 0x42, 0x00, 0x00, 0x00, 0x43];

		let (terminated, consumed) =
			super::decode_terminated(&bytes, Charset::Utf16Be).unwrap();
		assert_eq!(terminated, "AB");
		assert_eq!(consumed, 6);

		// The length-delimited form must not stop at the zero pair
		let full = super::decode(&bytes[..4], Charset::Utf16Be).unwrap();
		assert_eq!(full, "AB");
	}

	#[test_log::test]
	fn charset_names() {
		assert_eq!(Charset::from_name("iso-8859-1"), Some(Charset::Iso8859_1));
		assert_eq!(Charset::from_name("UTF-16BE"), Some(Charset::Utf16Be));
		assert_eq!(Charset::from_name("KOI8-R"), None);
		assert_eq!(Charset::Utf8.name(), "UTF-8");
	}
}
