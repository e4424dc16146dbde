use super::frame::{
	BinaryFrame, CommentFrame, FRAME_ID_COMMENT, FRAME_ID_PICTURE, Frame, FrameFlags, FrameId,
	PictureFrame, TextFrame, UrlFrame,
};
use super::header::{Id3v2Header, Id3v2Version};
use super::synchsafe::{SynchsafeInteger, UnsynchronizedStream};
use super::tag::Id3v2Tag;
use crate::config::{ParseOptions, ParsingMode};
use crate::error::{Id3v2Error, Id3v2ErrorKind, Result};
use crate::field::{self, FieldClass};
use crate::macros::{parse_mode_choice, try_vec};
use crate::tag::{MimeType, Picture, PictureType};
use crate::util::text::{self, TextEncoding};

use std::io::{Cursor, Read};

use byteorder::{BigEndian, ReadBytesExt};

pub(crate) fn parse_id3v2<R>(
	bytes: &mut R,
	header: Id3v2Header,
	parse_options: ParseOptions,
) -> Result<Id3v2Tag>
where
	R: Read,
{
	log::debug!(
		"Parsing ID3v2 tag, size: {}, version: {:?}",
		header.size,
		header.version
	);

	let mut tag_bytes = bytes.take(u64::from(header.size - header.extended_size));

	let ret;
	if header.flags.unsynchronisation {
		// Unsynchronize the entire tag
		let mut unsynchronized_reader = UnsynchronizedStream::new(tag_bytes);
		ret = read_all_frames_into_tag(&mut unsynchronized_reader, header, parse_options)?;

		// Get the `Take` back from the `UnsynchronizedStream`
		tag_bytes = unsynchronized_reader.into_inner();
	} else {
		ret = read_all_frames_into_tag(&mut tag_bytes, header, parse_options)?;
	};

	// Throw away the rest of the tag (padding, bad frames)
	std::io::copy(&mut tag_bytes, &mut std::io::sink())?;
	Ok(ret)
}

fn read_all_frames_into_tag<R>(
	reader: &mut R,
	header: Id3v2Header,
	parse_options: ParseOptions,
) -> Result<Id3v2Tag>
where
	R: Read,
{
	let mut tag = Id3v2Tag::default();
	tag.original_version = header.version;
	tag.set_flags(header.flags);

	loop {
		match ParsedFrame::read(reader, header.version, parse_options)? {
			ParsedFrame::Next(frame) => {
				let frame_value_is_empty = frame.is_empty();
				if let Some(replaced_frame) = tag.insert(frame) {
					// Duplicate frames are not allowed. But if this occurs we try
					// to keep the frame with the non-empty content. Superfluous,
					// duplicate frames that follow the first frame are often empty.
					if frame_value_is_empty && !replaced_frame.is_empty() {
						log::warn!(
							"Restoring non-empty frame with ID \"{id}\" that has been replaced by \
							 an empty frame with the same ID",
							id = replaced_frame.id()
						);
						drop(tag.insert(replaced_frame));
					} else {
						log::warn!(
							"Replaced frame with ID \"{id}\" by a frame with the same ID",
							id = replaced_frame.id()
						);
					}
				}
			},
			// No frame content found or ignored due to errors, but we can expect more frames
			ParsedFrame::Skip { size } => {
				skip_frame(reader, size)?;
			},
			// No frame content found, and we can expect there are no more frames
			ParsedFrame::Eof => break,
		}
	}

	Ok(tag)
}

enum ParsedFrame {
	Next(Frame),
	Skip { size: u32 },
	Eof,
}

impl ParsedFrame {
	fn read<R>(reader: &mut R, version: Id3v2Version, parse_options: ParseOptions) -> Result<Self>
	where
		R: Read,
	{
		let mut size = 0u32;

		let parse_header_result = parse_header(reader, &mut size, version == Id3v2Version::V4);
		let (id, mut flags) = match parse_header_result {
			Ok(None) => {
				// Stop reading
				return Ok(Self::Eof);
			},
			Ok(Some(some)) => some,
			Err(err) => {
				match parse_options.parsing_mode {
					ParsingMode::Strict => return Err(err),
					ParsingMode::BestAttempt | ParsingMode::Relaxed => {
						log::warn!("Failed to read frame header, skipping: {}", err);

						// Skip this frame and continue reading
						return Ok(Self::Skip { size });
					},
				}
			},
		};

		if !parse_options.read_cover_art && id == FRAME_ID_PICTURE {
			return Ok(Self::Skip { size });
		}

		if size == 0 {
			if parse_options.parsing_mode == ParsingMode::Strict {
				return Err(Id3v2Error::new(Id3v2ErrorKind::EmptyFrame(id)).into());
			}

			log::debug!("Encountered a zero length frame, skipping");
			return Ok(Self::Skip { size });
		}

		// Encrypted frames are opaque: the whole content, including the
		// method symbol and any data length indicator, is carried verbatim
		// so it can be written back untouched.
		if flags.encryption.is_some() {
			let mut content = try_vec![0; size as usize];
			reader.read_exact(&mut content)?;

			return Ok(Self::Next(Frame::Binary(BinaryFrame {
				id,
				flags,
				data: content,
			})));
		}

		// Get the group identifier
		if let Some(group) = flags.grouping_identity.as_mut() {
			if size < 1 {
				return Err(Id3v2Error::new(Id3v2ErrorKind::BadFrameLength).into());
			}

			*group = reader.read_u8()?;
			size -= 1;
		}

		// Get the real data length
		if flags.data_length_indicator.is_some() || flags.compression {
			if size < 4 {
				return Err(Id3v2Error::new(Id3v2ErrorKind::BadFrameLength).into());
			}

			// For some reason, no one can follow the spec, so while a data length indicator is *written*
			// the flag **isn't always set**
			let len = reader.read_u32::<BigEndian>()?.unsynch();
			flags.data_length_indicator = Some(len);
			size -= 4;
		}

		// Frames must have at least 1 byte, *after* all of the additional data flags can provide
		if size == 0 {
			return Err(Id3v2Error::new(Id3v2ErrorKind::BadFrameLength).into());
		}

		// Read the raw content up front; every post-processing step below
		// works in memory so the outer reader always advances by exactly
		// `size` bytes, whatever a malformed frame contains.
		let mut content = try_vec![0; size as usize];
		reader.read_exact(&mut content)?;

		if flags.unsynchronisation {
			let mut unsynchronized_reader = UnsynchronizedStream::new(&content[..]);
			let mut synchronized = Vec::with_capacity(content.len());
			unsynchronized_reader.read_to_end(&mut synchronized)?;
			content = synchronized;
		}

		if flags.compression {
			content = handle_compression(&content)?;
			flags.compression = false;
		}

		// The flags describing the transport encoding no longer apply to the
		// expanded content; a rewrite must not claim otherwise
		flags.unsynchronisation = false;
		flags.data_length_indicator = None;

		match parse_content(&content, id, flags, parse_options) {
			Ok(Some(frame)) => Ok(Self::Next(frame)),
			Ok(None) => Ok(Self::Skip { size: 0 }),
			Err(err) => {
				if parse_options.parsing_mode == ParsingMode::Strict {
					return Err(err);
				}

				log::warn!("Failed to parse the content of a \"{id}\" frame, skipping: {err}");
				Ok(Self::Skip { size: 0 })
			},
		}
	}
}

#[cfg(feature = "id3v2_compression_support")]
fn handle_compression(content: &[u8]) -> Result<Vec<u8>> {
	let mut decoder = flate2::read::ZlibDecoder::new(content);

	let mut decompressed = Vec::new();
	decoder.read_to_end(&mut decompressed)?;

	Ok(decompressed)
}

#[cfg(not(feature = "id3v2_compression_support"))]
fn handle_compression(_: &[u8]) -> Result<Vec<u8>> {
	Err(Id3v2Error::new(Id3v2ErrorKind::CompressedFrameEncountered).into())
}

fn parse_header<R>(
	reader: &mut R,
	size: &mut u32,
	synchsafe: bool,
) -> Result<Option<(FrameId, FrameFlags)>>
where
	R: Read,
{
	let mut header = [0; 10];
	match reader.read_exact(&mut header) {
		Ok(_) => {},
		Err(_) => return Ok(None),
	}

	// Assume we just started reading padding
	if header[0] == 0 {
		return Ok(None);
	}

	*size = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);
	// unsynch the frame size if necessary
	if synchsafe {
		*size = size.unsynch();
	}

	let id = FrameId::new([header[0], header[1], header[2], header[3]])?;

	let flags = u16::from_be_bytes([header[8], header[9]]);
	let flags = if synchsafe {
		FrameFlags::parse_id3v24(flags)
	} else {
		FrameFlags::parse_id3v23(flags)
	};

	Ok(Some((id, flags)))
}

fn parse_content(
	content: &[u8],
	id: FrameId,
	flags: FrameFlags,
	parse_options: ParseOptions,
) -> Result<Option<Frame>> {
	if id.is_text() {
		let Some((&marker, rest)) = content.split_first() else {
			return Ok(None);
		};

		let encoding = verify_encoding(marker, parse_options.parsing_mode)?;
		let value = field::decode_field(rest, encoding, FieldClass::Text, parse_options);

		return Ok(Some(Frame::Text(TextFrame {
			id,
			flags,
			encoding,
			value,
		})));
	}

	if id.is_url() {
		let url = field::decode_field(content, TextEncoding::LegacyUnspecified, FieldClass::Url, parse_options);
		if url.is_empty() {
			return Ok(None);
		}

		return Ok(Some(Frame::Url(UrlFrame { id, flags, content: url })));
	}

	if id == FRAME_ID_COMMENT {
		return parse_comment(content, flags, parse_options);
	}

	if id == FRAME_ID_PICTURE {
		return parse_picture(content, flags, parse_options);
	}

	Ok(Some(Frame::Binary(BinaryFrame {
		id,
		flags,
		data: content.to_vec(),
	})))
}

fn parse_comment(
	content: &[u8],
	flags: FrameFlags,
	parse_options: ParseOptions,
) -> Result<Option<Frame>> {
	if content.len() < 5 {
		return Err(Id3v2Error::new(Id3v2ErrorKind::BadFrameLength).into());
	}

	let encoding = verify_encoding(content[0], parse_options.parsing_mode)?;
	let language = [content[1], content[2], content[3]];

	let mut reader = Cursor::new(&content[4..]);
	let (description_bytes, terminator_len) = text::read_to_terminator(&mut reader, encoding);
	let description_len = description_bytes.len() + terminator_len;

	let description = field::decode_field(
		&description_bytes,
		encoding,
		FieldClass::Text,
		parse_options,
	);
	let comment_content = field::decode_field(
		&content[4 + description_len..],
		encoding,
		FieldClass::Text,
		parse_options,
	);

	Ok(Some(Frame::Comment(CommentFrame {
		flags,
		encoding,
		language,
		description,
		content: comment_content,
	})))
}

fn parse_picture(
	content: &[u8],
	flags: FrameFlags,
	parse_options: ParseOptions,
) -> Result<Option<Frame>> {
	let mut reader = Cursor::new(content);

	let Some(encoding) = TextEncoding::from_marker(reader.read_u8()?) else {
		return Err(Id3v2Error::new(Id3v2ErrorKind::BadPictureFormat(String::from(
			"invalid encoding marker",
		)))
		.into());
	};

	let mime_type = text::decode_text(
		&mut reader,
		text::TextDecodeOptions::new()
			.encoding(TextEncoding::Latin1)
			.terminated(true),
	)?
	.text_or_none()
	.map(|mime_type_str| MimeType::from_str(&mime_type_str));

	let pic_type = PictureType::from_u8(reader.read_u8()?);

	let (description_bytes, _) = text::read_to_terminator(&mut reader, encoding);
	let description = match description_bytes.is_empty() {
		true => None,
		false => Some(field::decode_field(
			&description_bytes,
			encoding,
			FieldClass::Text,
			parse_options,
		)),
	};

	let mut data = Vec::new();
	reader.read_to_end(&mut data)?;

	Ok(Some(Frame::Picture(PictureFrame {
		flags,
		encoding,
		picture: Picture {
			pic_type,
			mime_type,
			description,
			data,
		},
	})))
}

fn verify_encoding(marker: u8, parse_mode: ParsingMode) -> Result<TextEncoding> {
	match TextEncoding::from_marker(marker) {
		Some(encoding) => Ok(encoding),
		None => {
			parse_mode_choice!(
				parse_mode,
				STRICT: Err(crate::error::TagError::new(crate::error::ErrorKind::TextDecode(
					"invalid text encoding marker",
				))),
				DEFAULT: {
					log::warn!("Invalid text encoding marker {marker}, assuming Latin-1");
					Ok(TextEncoding::Latin1)
				}
			)
		},
	}
}

fn skip_frame(reader: &mut impl Read, size: u32) -> Result<()> {
	log::trace!("Skipping frame of size {}", size);

	let size = u64::from(size);
	let mut reader = reader.take(size);
	let skipped = std::io::copy(&mut reader, &mut std::io::sink())?;
	debug_assert!(skipped <= size);

	Ok(())
}
