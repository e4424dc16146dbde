//! ID3 specific items
//!
//! ID3 does things differently than other tags, making working with them a little more effort than other formats.
//! Check the other modules for important notes and/or warnings.

pub mod v1;
pub mod v2;

use crate::config::ParseOptions;
use crate::error::{ErrorKind, Result, TagError};
use crate::macros::{err, try_vec};
use v1::constants::ID3V1_TAG_MARKER;
use v2::header::Id3v2Header;

use std::io::{Read, Seek, SeekFrom};
use std::ops::Neg;

use byteorder::{LittleEndian, ReadBytesExt};

pub(crate) struct ID3FindResults<Header, Content>(pub Option<Header>, pub Content);

/// Locate a Lyrics3v2 block ending at the current position
///
/// On a match, the reader is left at the start of the block and the returned
/// size covers the entire block including its trailing size/marker bytes.
pub(crate) fn find_lyrics3v2<R>(data: &mut R) -> Result<ID3FindResults<(), u32>>
where
	R: Read + Seek,
{
	log::debug!("Searching for a Lyrics3v2 tag");

	let mut header = None;
	let mut size = 0_u32;

	data.seek(SeekFrom::Current(-15))?;

	let mut lyrics3v2 = [0; 15];
	data.read_exact(&mut lyrics3v2)?;

	if &lyrics3v2[7..] == b"LYRICS200" {
		log::warn!("Encountered a Lyrics3v2 tag. This is an outdated format, and will be removed.");

		header = Some(());

		let lyrics_size = std::str::from_utf8(&lyrics3v2[..7])?;
		let lyrics_size = lyrics_size.parse::<u32>().map_err(|_| {
			TagError::new(ErrorKind::TextDecode(
				"Lyrics3v2 tag has an invalid size string",
			))
		})?;

		size += lyrics_size + 15;

		data.seek(SeekFrom::Current(i64::from(lyrics_size + 15).neg()))?;
	}

	Ok(ID3FindResults(header, size))
}

/// Locate an APE tag ending at the current position
///
/// APE tags carry a 32 byte footer whose size field covers the items plus the
/// footer itself; a flag bit marks whether an additional 32 byte header
/// precedes the items. On a match, the reader is left at the start of the
/// whole tag and the returned size covers all of it.
pub(crate) fn find_ape<R>(data: &mut R) -> Result<ID3FindResults<(), u32>>
where
	R: Read + Seek,
{
	log::debug!("Searching for an APE tag");

	const APE_HEADER_PRESENT: u32 = 0x8000_0000;

	let mut header = None;
	let mut size = 0_u32;

	data.seek(SeekFrom::Current(-32))?;

	let mut preamble = [0; 8];
	data.read_exact(&mut preamble)?;

	if &preamble == b"APETAGEX" {
		header = Some(());

		let _version = data.read_u32::<LittleEndian>()?;
		let tag_size = data.read_u32::<LittleEndian>()?;
		let _item_count = data.read_u32::<LittleEndian>()?;
		let flags = data.read_u32::<LittleEndian>()?;

		if tag_size < 32 {
			return Err(TagError::new(ErrorKind::SizeMismatch));
		}

		size = tag_size;
		if flags & APE_HEADER_PRESENT == APE_HEADER_PRESENT {
			size += 32;
		}

		// We are 8 bytes shy of the footer's end; rewind past the whole tag
		data.seek(SeekFrom::Current(i64::from(size).neg() + 8))?;
	} else {
		data.seek(SeekFrom::Current(24))?;
	}

	Ok(ID3FindResults(header, size))
}

#[allow(unused_variables)]
pub(crate) fn find_id3v1<R>(
	data: &mut R,
	read: bool,
	parse_options: ParseOptions,
) -> Result<ID3FindResults<(), Option<v1::tag::Id3v1Tag>>>
where
	R: Read + Seek,
{
	log::debug!("Searching for an ID3v1 tag");

	let mut id3v1 = None;
	let mut header = None;

	// Reader is too small to contain an ID3v1 tag
	if data.seek(SeekFrom::End(-128)).is_err() {
		data.seek(SeekFrom::End(0))?;
		return Ok(ID3FindResults(header, id3v1));
	}

	let mut id3v1_header = [0; 3];
	data.read_exact(&mut id3v1_header)?;

	data.seek(SeekFrom::Current(-3))?;

	// No ID3v1 tag found
	if id3v1_header != ID3V1_TAG_MARKER {
		data.seek(SeekFrom::End(0))?;
		return Ok(ID3FindResults(header, id3v1));
	}

	log::debug!("Found an ID3v1 tag, parsing");

	header = Some(());

	if read {
		let mut id3v1_tag = [0; 128];
		data.read_exact(&mut id3v1_tag)?;

		data.seek(SeekFrom::End(-128))?;

		id3v1 = Some(v1::tag::Id3v1Tag::parse(id3v1_tag, parse_options)?)
	}

	Ok(ID3FindResults(header, id3v1))
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct FindId3v2Config {
	pub(crate) read: bool,
}

impl FindId3v2Config {
	pub(crate) const NO_READ_TAG: Self = Self { read: false };
	pub(crate) const READ_TAG: Self = Self { read: true };
}

pub(crate) fn find_id3v2<R>(
	data: &mut R,
	config: FindId3v2Config,
) -> Result<ID3FindResults<Id3v2Header, Option<Vec<u8>>>>
where
	R: Read + Seek,
{
	log::debug!(
		"Searching for an ID3v2 tag at offset: {}",
		data.stream_position()?
	);

	let mut header = None;
	let mut id3v2 = None;

	if let Ok(id3v2_header) = Id3v2Header::parse(data) {
		log::debug!("Found an ID3v2 tag, parsing");

		// A corrupt header can claim a size past the end of the file. Trusting
		// it would make the writer treat the audio data as part of the tag.
		let position = data.stream_position()?;
		let end = data.seek(SeekFrom::End(0))?;
		data.seek(SeekFrom::Start(position))?;

		if u64::from(id3v2_header.size) > end - position {
			err!(SizeMismatch);
		}

		if config.read {
			let mut tag = try_vec![0; id3v2_header.size as usize];
			data.read_exact(&mut tag)?;

			id3v2 = Some(tag)
		} else {
			data.seek(SeekFrom::Current(i64::from(id3v2_header.size)))?;
		}

		if id3v2_header.flags.footer {
			data.seek(SeekFrom::Current(10))?;
		}

		header = Some(id3v2_header);
	} else {
		data.seek(SeekFrom::Start(0))?;
	}

	Ok(ID3FindResults(header, id3v2))
}
