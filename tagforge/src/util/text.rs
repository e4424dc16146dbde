//! Text encoding handling for ID3v2 frame content

use crate::error::Result;
use crate::macros::err;
use crate::util::charset::{self, Charset, ConflictPolicy};

use std::io::Read;

use byteorder::ReadBytesExt;

/// The hard cap on a single decoded text field, in characters
///
/// Malformed frames can declare absurd sizes; anything beyond this is
/// truncated rather than rejected.
pub(crate) const MAX_FIELD_LENGTH: usize = 4096;

/// The text encoding of an ID3v2 frame
///
/// The first four variants correspond to the on-disk encoding marker bytes
/// `0x00`–`0x03`. [`LegacyUnspecified`](Self::LegacyUnspecified) covers text
/// that carries no marker at all: ID3v1 fields and the URL portion of
/// W-frames, which the format defines as ISO-8859-1 only.
#[derive(Debug, Clone, Eq, PartialEq, Copy, Hash)]
pub enum TextEncoding {
	/// ISO-8859-1
	Latin1,
	/// UTF-16 with a byte order mark
	Utf16,
	/// UTF-16 big endian, no byte order mark (ID3v2.4)
	Utf16Be,
	/// UTF-8 (ID3v2.4)
	Utf8,
	/// Marker-less single-byte text (ID3v1 fields, URL frame content)
	LegacyUnspecified,
}

impl TextEncoding {
	/// Get a `TextEncoding` from an encoding marker byte, must be 0-3 inclusive
	pub fn from_marker(byte: u8) -> Option<Self> {
		match byte {
			0 => Some(Self::Latin1),
			1 => Some(Self::Utf16),
			2 => Some(Self::Utf16Be),
			3 => Some(Self::Utf8),
			_ => None,
		}
	}

	/// The encoding marker byte written before frame text
	///
	/// Marker-less text is declared as Latin-1 when a marker byte cannot be avoided.
	pub fn marker(self) -> u8 {
		match self {
			Self::Latin1 | Self::LegacyUnspecified => 0,
			Self::Utf16 => 1,
			Self::Utf16Be => 2,
			Self::Utf8 => 3,
		}
	}

	/// ID3v2.4 introduced two new text encodings.
	///
	/// When writing ID3v2.3, we just substitute with UTF-16.
	pub(crate) fn to_id3v23(self) -> Self {
		match self {
			Self::Utf8 | Self::Utf16Be => {
				log::warn!(
					"Text encoding {:?} is not supported in ID3v2.3, substituting with UTF-16",
					self
				);
				Self::Utf16
			},
			_ => self,
		}
	}

	/// Encode `text`, honoring `policy` on the single-byte path
	///
	/// UTF-16 output is always big endian: a byte order mark followed by
	/// big-endian code units. Several widespread readers assume big-endian
	/// payloads regardless of the mark, so emitting anything else is asking
	/// for mojibake.
	///
	/// # Errors
	///
	/// * `policy` is [`ConflictPolicy::Reject`] and a character has no Latin-1 representation
	pub(crate) fn encode(
		self,
		text: &str,
		terminated: bool,
		policy: ConflictPolicy,
	) -> Result<Vec<u8>> {
		match self {
			Self::Latin1 | Self::LegacyUnspecified => {
				let mut out = charset::encode(text, Charset::Iso8859_1, policy)?;
				if terminated {
					out.push(0);
				}

				Ok(out)
			},
			Self::Utf16 => Ok(utf16_encode(text, u16::to_be_bytes, true, terminated)),
			Self::Utf16Be => Ok(utf16_encode(text, u16::to_be_bytes, false, terminated)),
			Self::Utf8 => {
				let mut out = text.as_bytes().to_vec();

				if terminated {
					out.push(0);
				}

				Ok(out)
			},
		}
	}
}

#[derive(Eq, PartialEq, Debug, Default)]
pub(crate) struct DecodeTextResult {
	pub(crate) content: String,
	pub(crate) bytes_read: usize,
}

impl DecodeTextResult {
	pub(crate) fn text_or_none(self) -> Option<String> {
		if self.content.is_empty() {
			return None;
		}

		Some(self.content)
	}
}

/// Specify how to decode the provided text
///
/// By default, this will:
///
/// * Use [`TextEncoding::Utf8`] as the encoding
/// * Not expect the text to be null terminated
#[derive(Copy, Clone, Debug)]
pub(crate) struct TextDecodeOptions {
	pub encoding: TextEncoding,
	pub terminated: bool,
}

impl TextDecodeOptions {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	pub(crate) fn encoding(mut self, encoding: TextEncoding) -> Self {
		self.encoding = encoding;
		self
	}

	pub(crate) fn terminated(mut self, terminated: bool) -> Self {
		self.terminated = terminated;
		self
	}
}

impl Default for TextDecodeOptions {
	fn default() -> Self {
		Self {
			encoding: TextEncoding::Utf8,
			terminated: false,
		}
	}
}

pub(crate) fn decode_text<R>(reader: &mut R, options: TextDecodeOptions) -> Result<DecodeTextResult>
where
	R: Read,
{
	let raw_bytes;
	let bytes_read;

	if options.terminated {
		let (bytes, terminator_len) = read_to_terminator(reader, options.encoding);

		if bytes.is_empty() {
			return Ok(DecodeTextResult {
				bytes_read: terminator_len,
				..DecodeTextResult::default()
			});
		}

		bytes_read = bytes.len() + terminator_len;
		raw_bytes = bytes;
	} else {
		let mut bytes = Vec::new();
		reader.read_to_end(&mut bytes)?;

		if bytes.is_empty() {
			return Ok(DecodeTextResult::default());
		}

		bytes_read = bytes.len();
		raw_bytes = bytes;
	}

	let read_string = match options.encoding {
		TextEncoding::Latin1 | TextEncoding::LegacyUnspecified => latin1_decode(&raw_bytes),
		TextEncoding::Utf16 => {
			if raw_bytes.len() % 2 != 0 {
				err!(TextDecode("UTF-16 string has an odd length"));
			}

			match raw_bytes.first_chunk::<2>() {
				Some([0xFE, 0xFF]) => utf16_decode_bytes(&raw_bytes[2..], u16::from_be_bytes)?,
				Some([0xFF, 0xFE]) => utf16_decode_bytes(&raw_bytes[2..], u16::from_le_bytes)?,
				// Some encoders omit the byte order mark entirely and always
				// write big endian, so assume that rather than bailing.
				_ => utf16_decode_bytes(&raw_bytes, u16::from_be_bytes)?,
			}
		},
		TextEncoding::Utf16Be => utf16_decode_bytes(raw_bytes.as_slice(), u16::from_be_bytes)?,
		TextEncoding::Utf8 => utf8_decode(raw_bytes)?,
	};

	Ok(DecodeTextResult {
		content: truncate_field(read_string),
		bytes_read,
	})
}

pub(crate) fn truncate_field(mut text: String) -> String {
	if text.chars().count() > MAX_FIELD_LENGTH {
		log::debug!("Text field exceeds {} characters, truncating", MAX_FIELD_LENGTH);
		text = text.chars().take(MAX_FIELD_LENGTH).collect();
	}

	text
}

pub(crate) fn read_to_terminator<R>(reader: &mut R, encoding: TextEncoding) -> (Vec<u8>, usize)
where
	R: Read,
{
	let mut text_bytes = Vec::new();
	let mut terminator_len = 0;

	match encoding {
		TextEncoding::Latin1 | TextEncoding::Utf8 | TextEncoding::LegacyUnspecified => {
			while let Ok(byte) = reader.read_u8() {
				if byte == 0 {
					terminator_len = 1;
					break;
				}

				text_bytes.push(byte)
			}
		},
		TextEncoding::Utf16 | TextEncoding::Utf16Be => {
			while let (Ok(b1), Ok(b2)) = (reader.read_u8(), reader.read_u8()) {
				if b1 == 0 && b2 == 0 {
					terminator_len = 2;
					break;
				}

				text_bytes.push(b1);
				text_bytes.push(b2)
			}
		},
	}

	(text_bytes, terminator_len)
}

pub(crate) fn latin1_decode(bytes: &[u8]) -> String {
	let mut text = bytes.iter().map(|c| *c as char).collect::<String>();
	trim_end_nulls(&mut text);
	text
}

pub(crate) fn utf8_decode(bytes: Vec<u8>) -> Result<String> {
	String::from_utf8(bytes)
		.map(|mut text| {
			trim_end_nulls(&mut text);
			text
		})
		.map_err(Into::into)
}

pub(crate) fn utf16_decode_bytes(bytes: &[u8], endianness: fn([u8; 2]) -> u16) -> Result<String> {
	if bytes.is_empty() {
		return Ok(String::new());
	}

	let unverified: Vec<u16> = bytes
		.chunks_exact(2)
		// In ID3v2, it is possible to have multiple UTF-16 strings separated by null.
		// This also makes it possible for us to encounter multiple BOMs in a single string.
		// We must filter them out.
		.filter_map(|c| match c {
			[0xFF, 0xFE] | [0xFE, 0xFF] => None,
			_ => Some(endianness(c.try_into().unwrap())), // Infallible
		})
		.collect();

	let mut text = String::from_utf16(&unverified)
		.map_err(|_| crate::error::TagError::new(crate::error::ErrorKind::TextDecode(
			"invalid UTF-16 string",
		)))?;
	trim_end_nulls(&mut text);
	Ok(text)
}

pub(crate) fn trim_end_nulls(text: &mut String) {
	if text.ends_with('\0') {
		let new_len = text.trim_end_matches('\0').len();
		text.truncate(new_len);
	}
}

fn utf16_encode(
	text: &str,
	endianness: fn(u16) -> [u8; 2],
	bom: bool,
	terminated: bool,
) -> Vec<u8> {
	let mut encoded = Vec::<u8>::new();

	if bom {
		encoded.extend_from_slice(&endianness(0xFEFF_u16));
	}

	for ch in text.encode_utf16() {
		encoded.extend_from_slice(&endianness(ch));
	}

	if terminated {
		encoded.extend_from_slice(&[0, 0]);
	}

	encoded
}

#[cfg(test)]
mod tests {
	use super::{TextDecodeOptions, TextEncoding};
	use crate::util::charset::ConflictPolicy;

	use std::io::Cursor;

	const TEST_STRING: &str = "l\u{00f8}ft\u{00a5}";

	#[test_log::test]
	fn text_decode() {
		// No BOM, assumed big endian
		let utf16_decode = super::utf16_decode_bytes(
			&[
				0x00, 0x6C, 0x00, 0xF8, 0x00, 0x66, 0x00, 0x74, 0x00, 0xA5, 0x00, 0x00,
			],
			u16::from_be_bytes,
		)
		.unwrap();

		assert_eq!(utf16_decode, TEST_STRING.to_string());

		// BOM test
		let be_utf16_decode = super::decode_text(
			&mut Cursor::new(&[
				0xFE, 0xFF, 0x00, 0x6C, 0x00, 0xF8, 0x00, 0x66, 0x00, 0x74, 0x00, 0xA5, 0x00, 0x00,
			]),
			TextDecodeOptions::new().encoding(TextEncoding::Utf16),
		)
		.unwrap();
		let le_utf16_decode = super::decode_text(
			&mut Cursor::new(&[
				0xFF, 0xFE, 0x6C, 0x00, 0xF8, 0x00, 0x66, 0x00, 0x74, 0x00, 0xA5, 0x00, 0x00, 0x00,
			]),
			TextDecodeOptions::new().encoding(TextEncoding::Utf16),
		)
		.unwrap();

		assert_eq!(be_utf16_decode.content, le_utf16_decode.content);
		assert_eq!(be_utf16_decode.bytes_read, le_utf16_decode.bytes_read);
		assert_eq!(be_utf16_decode.content, TEST_STRING.to_string());

		// A missing BOM must decode as big endian
		let bomless_utf16_decode = super::decode_text(
			&mut Cursor::new(&[0x00, 0x6C, 0x00, 0xF8, 0x00, 0x66, 0x00, 0x74, 0x00, 0xA5]),
			TextDecodeOptions::new().encoding(TextEncoding::Utf16),
		)
		.unwrap();
		assert_eq!(bomless_utf16_decode.content, TEST_STRING.to_string());

		let utf8_decode = super::decode_text(
			&mut TEST_STRING.as_bytes(),
			TextDecodeOptions::new().encoding(TextEncoding::Utf8),
		)
		.unwrap();

		assert_eq!(utf8_decode.content, TEST_STRING.to_string());
	}

	#[test_log::test]
	fn text_encode() {
		let be_utf16_encode = TextEncoding::Utf16Be
			.encode(TEST_STRING, false, ConflictPolicy::Reject)
			.unwrap();

		// TextEncoding::Utf16Be has no BOM
		assert_eq!(
			be_utf16_encode.as_slice(),
			&[0x00, 0x6C, 0x00, 0xF8, 0x00, 0x66, 0x00, 0x74, 0x00, 0xA5]
		);

		// TextEncoding::Utf16 always writes a big endian BOM and big endian payload
		let utf16_encode = TextEncoding::Utf16
			.encode(TEST_STRING, false, ConflictPolicy::Reject)
			.unwrap();
		assert_eq!(
			utf16_encode.as_slice(),
			&[
				0xFE, 0xFF, 0x00, 0x6C, 0x00, 0xF8, 0x00, 0x66, 0x00, 0x74, 0x00, 0xA5
			]
		);

		let utf8_encode = TextEncoding::Utf8
			.encode(TEST_STRING, false, ConflictPolicy::Reject)
			.unwrap();

		assert_eq!(utf8_encode.as_slice(), TEST_STRING.as_bytes());
	}

	#[test_log::test]
	fn terminated_utf16_field() {
		let mut reader = Cursor::new(&[
			0xFE, 0xFF, 0x00, 0x41, 0x00, 0x00, // "A" + terminator
			0x00, 0x42, // following content
		]);

		let decoded = super::decode_text(
			&mut reader,
			TextDecodeOptions::new()
				.encoding(TextEncoding::Utf16)
				.terminated(true),
		)
		.unwrap();

		assert_eq!(decoded.content, "A");
		assert_eq!(decoded.bytes_read, 6);
	}
}
