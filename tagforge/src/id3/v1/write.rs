use super::constants::ID3V1_TAG_MARKER;
use super::tag::Id3v1Tag;
use crate::config::{EncodingOptions, ParseOptions, WriteOptions};
use crate::error::{Result, TagError};
use crate::field;
use crate::id3::{ID3FindResults, find_id3v1};
use crate::util::io::{FileLike, Length, Truncate};

pub(crate) fn write_id3v1<F>(
	file: &mut F,
	tag: &Id3v1Tag,
	write_options: WriteOptions,
	encoding_options: EncodingOptions,
) -> Result<()>
where
	F: FileLike,
	TagError: From<<F as Truncate>::Error>,
	TagError: From<<F as Length>::Error>,
{
	// This will seek us to the writing position
	let ID3FindResults(header, _) = find_id3v1(file, false, ParseOptions::default())?;

	if tag.is_empty() {
		if header.is_some() {
			// An ID3v1 tag occupies the last 128 bytes of the file, so we can just
			// shrink it down.
			let new_length = file.len()?.saturating_sub(128);
			file.truncate(new_length)?;
		}

		return Ok(());
	}

	let tag = encode(tag, write_options, encoding_options)?;

	file.write_all(&tag)?;

	Ok(())
}

pub(super) fn encode(
	tag: &Id3v1Tag,
	_write_options: WriteOptions,
	encoding_options: EncodingOptions,
) -> Result<[u8; 128]> {
	fn resize_field(
		out: &mut [u8],
		value: Option<&str>,
		encoding_options: EncodingOptions,
	) -> Result<()> {
		if let Some(val) = value {
			let encoded = field::encode_single_byte(val, encoding_options)?;
			let len = std::cmp::min(encoded.len(), out.len());
			out[..len].copy_from_slice(&encoded[..len]);
		}

		Ok(())
	}

	let mut writer = [0u8; 128];

	writer[..3].copy_from_slice(&ID3V1_TAG_MARKER);

	resize_field(&mut writer[3..33], tag.title.as_deref(), encoding_options)?;
	resize_field(&mut writer[33..63], tag.artist.as_deref(), encoding_options)?;
	resize_field(&mut writer[63..93], tag.album.as_deref(), encoding_options)?;

	if let Some(year_num) = tag.year {
		let mut year_num = std::cmp::min(year_num, 9999);

		let mut idx = 96;
		loop {
			writer[idx] = b'0' + (year_num % 10) as u8;
			year_num /= 10;

			if idx == 93 {
				break;
			}

			idx -= 1;
		}
	}

	// A track number makes this a v1.1 tag: the comment shrinks to 28 bytes,
	// byte 125 stays zero as the marker, and byte 126 carries the track.
	match tag.track_number {
		Some(track_number) if track_number != 0 => {
			resize_field(&mut writer[97..125], tag.comment.as_deref(), encoding_options)?;
			writer[126] = track_number;
		},
		_ => {
			resize_field(&mut writer[97..127], tag.comment.as_deref(), encoding_options)?;
		},
	}

	writer[127] = tag.genre.unwrap_or(255);

	Ok(writer)
}

#[cfg(test)]
mod tests {
	use super::super::tag::Id3v1Tag;
	use crate::config::{EncodingOptions, ParseOptions, WriteOptions};
	use crate::util::charset::ConflictPolicy;

	#[test_log::test]
	fn v1_layout() {
		let tag = Id3v1Tag {
			title: Some(String::from("Title")),
			artist: None,
			album: None,
			year: Some(2003),
			comment: Some(String::from("c")),
			track_number: Some(9),
			genre: Some(17),
		};

		let bytes = super::encode(&tag, WriteOptions::new(), EncodingOptions::new()).unwrap();

		assert_eq!(&bytes[..3], b"TAG");
		assert_eq!(&bytes[3..8], b"Title");
		assert_eq!(&bytes[93..97], b"2003");
		assert_eq!(bytes[97], b'c');
		assert_eq!(bytes[125], 0);
		assert_eq!(bytes[126], 9);
		assert_eq!(bytes[127], 17);
	}

	#[test_log::test]
	fn field_overflow_is_shrunk() {
		let tag = Id3v1Tag {
			title: Some("x".repeat(64)),
			..Id3v1Tag::default()
		};

		let bytes = super::encode(&tag, WriteOptions::new(), EncodingOptions::new()).unwrap();

		assert!(bytes[3..33].iter().all(|b| *b == b'x'));
		// Must not bleed into the artist field
		assert_eq!(bytes[33], 0);
	}

	#[test_log::test]
	fn conflict_policies_apply() {
		let tag = Id3v1Tag {
			title: Some(String::from("a\u{2014}b")),
			..Id3v1Tag::default()
		};

		let transliterated =
			super::encode(&tag, WriteOptions::new(), EncodingOptions::new()).unwrap();
		assert_eq!(&transliterated[3..6], b"a-b");

		let reject_options = EncodingOptions::new().on_conflict(ConflictPolicy::Reject);
		super::encode(&tag, WriteOptions::new(), reject_options).unwrap_err();
	}

	#[test_log::test]
	fn round_trip() {
		let tag = Id3v1Tag {
			title: Some(String::from("Foo title")),
			artist: Some(String::from("Bar artist")),
			album: Some(String::from("Baz album")),
			year: Some(1984),
			comment: Some(String::from("Qux comment")),
			track_number: Some(1),
			genre: Some(32),
		};

		let bytes = super::encode(&tag, WriteOptions::new(), EncodingOptions::new()).unwrap();
		let reparsed = Id3v1Tag::parse(bytes, ParseOptions::new()).unwrap();

		assert_eq!(reparsed, tag);
	}
}
