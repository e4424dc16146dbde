use super::constants::ID3V1_TAG_MARKER;
use super::tag::Id3v1Tag;
use crate::config::{ParseOptions, ParsingMode};
use crate::error::TagError;
use crate::field::{self, FieldClass};
use crate::genre::GENRES;
use crate::macros::err;
use crate::util::text::TextEncoding;

impl Id3v1Tag {
	/// Parse an `Id3v1Tag` from a 128 byte trailer
	///
	/// # Errors
	///
	/// * The buffer does not start with the "TAG" marker
	/// * [`ParsingMode::Strict`] and the year field is malformed
	pub fn parse(reader: [u8; 128], parse_options: ParseOptions) -> Result<Self, TagError> {
		let mut tag = Self::new();

		if reader[..3] != ID3V1_TAG_MARKER {
			err!(FakeTag);
		}

		let reader = &reader[3..];

		tag.title = decode_text(&reader[..30], parse_options);
		tag.artist = decode_text(&reader[30..60], parse_options);
		tag.album = decode_text(&reader[60..90], parse_options);

		tag.year = try_parse_year(&reader[90..94], parse_options.parsing_mode)?;

		// Determine the range of the comment (30 bytes for ID3v1 and 28 for ID3v1.1)
		// We check for the null terminator 28 bytes in, and for a non-zero track number after it.
		// A track number of 0 is invalid.
		let range = if reader[122] == 0 && reader[123] != 0 {
			tag.track_number = Some(reader[123]);

			94_usize..123
		} else {
			94..124
		};

		tag.comment = decode_text(&reader[range], parse_options);

		if reader[124] < GENRES.len() as u8 {
			tag.genre = Some(reader[124]);
		}

		Ok(tag)
	}
}

fn decode_text(data: &[u8], parse_options: ParseOptions) -> Option<String> {
	let mut first_null_pos = data.len();
	if let Some(null_pos) = data.iter().position(|&b| b == 0) {
		if null_pos == 0 {
			return None;
		}

		if data[null_pos..].iter().any(|b| *b != b'\0') {
			log::warn!("ID3v1 text field contains trailing junk, skipping");
		}

		first_null_pos = null_pos;
	}

	let decoded = field::decode_field(
		&data[..first_null_pos],
		TextEncoding::LegacyUnspecified,
		FieldClass::Text,
		parse_options,
	);

	if decoded.is_empty() {
		return None;
	}

	Some(decoded)
}

fn try_parse_year(input: &[u8], parse_mode: ParsingMode) -> Result<Option<u16>, TagError> {
	let (num_digits, year) = input
		.iter()
		.take_while(|c| (**c).is_ascii_digit())
		.fold((0usize, 0u16), |(num_digits, year), c| {
			(num_digits + 1, year * 10 + u16::from(*c - b'0'))
		});
	if num_digits != 4 {
		// The official test suite says that any year that isn't 4 characters should be a decoding failure.
		// However, it seems most popular libraries (including us) will write "\0\0\0\0" for empty
		// years, rather than "0000" as the "spec" would suggest.
		if parse_mode == ParsingMode::Strict {
			err!(TextDecode(
				"ID3v1 year field contains non-ASCII digit characters"
			));
		}

		return Ok(None);
	}

	Ok(Some(year))
}

#[cfg(test)]
mod tests {
	use super::Id3v1Tag;
	use crate::config::{ParseOptions, ParsingMode};

	fn tag_bytes() -> [u8; 128] {
		let mut bytes = [0u8; 128];
		bytes[..3].copy_from_slice(b"TAG");
		bytes[3..8].copy_from_slice(b"Title");
		bytes[33..39].copy_from_slice(b"Artist");
		bytes[93..97].copy_from_slice(b"1999");
		// v1.1: null at comment byte 28, then track
		bytes[126] = 7;
		bytes[127] = 32; // Classical
		bytes
	}

	#[test_log::test]
	fn parse_v11_track() {
		let tag = Id3v1Tag::parse(tag_bytes(), ParseOptions::new()).unwrap();

		assert_eq!(tag.title.as_deref(), Some("Title"));
		assert_eq!(tag.artist.as_deref(), Some("Artist"));
		assert_eq!(tag.year, Some(1999));
		assert_eq!(tag.track_number, Some(7));
		assert_eq!(tag.genre, Some(32));
	}

	#[test_log::test]
	fn bad_marker() {
		let mut bytes = tag_bytes();
		bytes[0] = b'X';

		assert!(Id3v1Tag::parse(bytes, ParseOptions::new()).is_err());
	}

	#[test_log::test]
	fn empty_year_is_lenient() {
		let mut bytes = tag_bytes();
		bytes[93..97].copy_from_slice(&[0, 0, 0, 0]);

		let tag = Id3v1Tag::parse(bytes, ParseOptions::new()).unwrap();
		assert_eq!(tag.year, None);

		// Strict mode rejects it
		let strict = ParseOptions::new().parsing_mode(ParsingMode::Strict);
		assert!(Id3v1Tag::parse(bytes, strict).is_err());
	}
}
