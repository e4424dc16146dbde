use super::frame::{Frame, FrameFlags};
use super::synchsafe::SynchsafeInteger;
use super::tag::Id3v2Tag;
use crate::config::{EncodingOptions, WriteOptions};
use crate::error::{Id3v2Error, Id3v2ErrorKind, Result, TagError};
use crate::id3::{FindId3v2Config, find_id3v2};
use crate::macros::try_vec;
use crate::util::io::{FileLike, Length, Truncate};

use std::io::{Cursor, Read, Seek, SeekFrom, Write};

use byteorder::{BigEndian, WriteBytesExt};

/// Commit the tag to the head of the file
///
/// An existing tag is replaced; an empty frame set strips the tag. Either
/// way the rest of the file is carried over byte for byte, spliced behind
/// the new tag.
pub(crate) fn write_id3v2<F>(
	file: &mut F,
	tag: &Id3v2Tag,
	write_options: WriteOptions,
	encoding_options: EncodingOptions,
) -> Result<()>
where
	F: FileLike,
	TagError: From<<F as Truncate>::Error>,
	TagError: From<<F as Length>::Error>,
{
	let id3v2 = create_tag(tag, write_options, encoding_options)?;

	// find_id3v2 will seek us to the end of an existing tag
	find_id3v2(file, FindId3v2Config::NO_READ_TAG)?;

	let mut file_bytes = Vec::new();
	file.read_to_end(&mut file_bytes)?;

	file_bytes.splice(0..0, id3v2);

	file.rewind()?;
	file.truncate(0)?;
	file.write_all(&file_bytes)?;

	Ok(())
}

pub(crate) fn create_tag(
	tag: &Id3v2Tag,
	write_options: WriteOptions,
	encoding_options: EncodingOptions,
) -> Result<Vec<u8>> {
	// We are stripping the tag
	if tag.is_empty() {
		return Ok(Vec::new());
	}

	let is_id3v23 = write_options.use_id3v23;
	if is_id3v23 {
		log::debug!("Using ID3v2.3");
	}

	let mut id3v2 = create_tag_header(is_id3v23)?;
	let header_len = id3v2.get_ref().len();

	// Write the items
	for frame in tag.frames() {
		verify_frame(frame)?;
		let value = frame.as_bytes(write_options, encoding_options)?;

		write_frame(&mut id3v2, frame.id().as_str(), frame.flags(), &value, write_options)?;
	}

	let mut len = id3v2.get_ref().len() - header_len;

	let padding_len = write_options.preferred_padding.unwrap_or(0) as usize;
	len += padding_len;

	// Go back to the start and write the final size
	id3v2.seek(SeekFrom::Start(6))?;
	id3v2.write_u32::<BigEndian>((len as u32).synch()?)?;

	if padding_len == 0 {
		log::trace!("No padding requested, writing tag as-is");
		return Ok(id3v2.into_inner());
	}

	log::trace!("Padding tag with {} bytes", padding_len);

	id3v2.seek(SeekFrom::End(0))?;
	id3v2.write_all(&try_vec![0; padding_len])?;

	Ok(id3v2.into_inner())
}

fn create_tag_header(is_id3v23: bool) -> Result<Cursor<Vec<u8>>> {
	let mut header = Cursor::new(Vec::new());

	header.write_all(b"ID3")?;

	if is_id3v23 {
		// Version 3, rev 0
		header.write_all(&[3, 0])?;
	} else {
		// Version 4, rev 0
		header.write_all(&[4, 0])?;
	}

	// No tag-level flags are ever set on write
	header.write_u8(0)?;
	header.write_u32::<BigEndian>(0)?;

	Ok(header)
}

fn verify_frame(frame: &Frame) -> Result<()> {
	let valid = match frame {
		Frame::Text(text) => text.id.is_text(),
		Frame::Url(url) => url.id.is_url(),
		Frame::Comment(_) | Frame::Picture(_) | Frame::Binary(_) => true,
	};

	if !valid {
		return Err(Id3v2Error::new(Id3v2ErrorKind::BadFrame(
			frame.id().as_str().to_owned(),
			frame.name(),
		))
		.into());
	}

	Ok(())
}

fn write_frame<W>(
	writer: &mut W,
	name: &str,
	flags: FrameFlags,
	value: &[u8],
	write_options: WriteOptions,
) -> Result<()>
where
	W: Write,
{
	let len = value.len() as u32;

	// Encrypted frames are opaque: their payload still contains the group
	// byte and data length indicator exactly as read, so nothing may be
	// injected in front of it.
	if flags.encryption.is_some() {
		write_frame_header(writer, name, len, flags, write_options)?;
		writer.write_all(value)?;
		return Ok(());
	}

	let is_grouping_identity = flags.grouping_identity.is_some();

	write_frame_header(
		writer,
		name,
		if is_grouping_identity { len + 1 } else { len },
		flags,
		write_options,
	)?;

	if is_grouping_identity {
		// Guaranteed to be `Some` at this point.
		writer.write_u8(flags.grouping_identity.unwrap())?;
	}

	writer.write_all(value)?;

	Ok(())
}

fn write_frame_header<W>(
	writer: &mut W,
	name: &str,
	mut len: u32,
	flags: FrameFlags,
	write_options: WriteOptions,
) -> Result<()>
where
	W: Write,
{
	let flags = if write_options.use_id3v23 {
		flags.as_id3v23_bytes()
	} else {
		flags.as_id3v24_bytes()
	};

	writer.write_all(name.as_bytes())?;
	if !write_options.use_id3v23 {
		len = len.synch()?;
	}

	writer.write_u32::<BigEndian>(len)?;
	writer.write_u16::<BigEndian>(flags)?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::super::frame::{FRAME_ID_ARTIST, Frame, TextFrame};
	use super::super::header::{Id3v2Header, Id3v2Version};
	use super::super::tag::Id3v2Tag;
	use crate::config::{EncodingOptions, ParseOptions, WriteOptions};
	use crate::util::text::TextEncoding;

	use std::io::Cursor;

	fn single_frame_tag() -> Id3v2Tag {
		let mut tag = Id3v2Tag::new();
		tag.insert(Frame::Text(TextFrame::new(
			FRAME_ID_ARTIST,
			TextEncoding::Latin1,
			"Foo artist",
		)));
		tag
	}

	#[test_log::test]
	fn empty_tag_creates_nothing() {
		let bytes = super::create_tag(
			&Id3v2Tag::new(),
			WriteOptions::new(),
			EncodingOptions::new(),
		)
		.unwrap();

		assert!(bytes.is_empty());
	}

	#[test_log::test]
	fn created_tag_re_parses() {
		let bytes = super::create_tag(
			&single_frame_tag(),
			WriteOptions::new().preferred_padding(0),
			EncodingOptions::new(),
		)
		.unwrap();

		let mut reader = Cursor::new(bytes);
		let header = Id3v2Header::parse(&mut reader).unwrap();
		assert_eq!(header.version, Id3v2Version::V4);

		let parsed =
			super::super::read::parse_id3v2(&mut reader, header, ParseOptions::new()).unwrap();
		assert_eq!(parsed.len(), 1);
	}

	#[test_log::test]
	fn v23_header_version() {
		let bytes = super::create_tag(
			&single_frame_tag(),
			WriteOptions::new().use_id3v23(true),
			EncodingOptions::new(),
		)
		.unwrap();

		assert_eq!(&bytes[..5], &[b'I', b'D', b'3', 3, 0]);
	}

	#[test_log::test]
	fn padding_is_applied() {
		let without_padding = super::create_tag(
			&single_frame_tag(),
			WriteOptions::new().preferred_padding(0),
			EncodingOptions::new(),
		)
		.unwrap();
		let with_padding = super::create_tag(
			&single_frame_tag(),
			WriteOptions::new().preferred_padding(64),
			EncodingOptions::new(),
		)
		.unwrap();

		assert_eq!(with_padding.len(), without_padding.len() + 64);
		assert!(with_padding[with_padding.len() - 64..].iter().all(|b| *b == 0));
	}
}
