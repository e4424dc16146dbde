use crate::config::{EncodingOptions, WriteOptions};
use crate::error::{Id3v2Error, Id3v2ErrorKind, Result};
use crate::macros::err;
use crate::tag::Picture;
use crate::util::text::TextEncoding;

use std::fmt::{Display, Formatter};
use std::io::Write as _;

use byteorder::WriteBytesExt as _;

// The frame vocabulary of the tag model
pub(crate) const FRAME_ID_TITLE: FrameId = FrameId(*b"TIT2");
pub(crate) const FRAME_ID_ARTIST: FrameId = FrameId(*b"TPE1");
pub(crate) const FRAME_ID_ALBUM_ARTIST: FrameId = FrameId(*b"TPE2");
pub(crate) const FRAME_ID_ALBUM: FrameId = FrameId(*b"TALB");
pub(crate) const FRAME_ID_DISC: FrameId = FrameId(*b"TPOS");
pub(crate) const FRAME_ID_RECORDING_TIME: FrameId = FrameId(*b"TDRC");
pub(crate) const FRAME_ID_YEAR: FrameId = FrameId(*b"TYER");
pub(crate) const FRAME_ID_TRACK: FrameId = FrameId(*b"TRCK");
pub(crate) const FRAME_ID_GENRE: FrameId = FrameId(*b"TCON");
pub(crate) const FRAME_ID_COMMENT: FrameId = FrameId(*b"COMM");
pub(crate) const FRAME_ID_COMPOSER: FrameId = FrameId(*b"TCOM");
pub(crate) const FRAME_ID_ORIG_ARTIST: FrameId = FrameId(*b"TOPE");
pub(crate) const FRAME_ID_COPYRIGHT: FrameId = FrameId(*b"TCOP");
pub(crate) const FRAME_ID_URL: FrameId = FrameId(*b"WOAR");
pub(crate) const FRAME_ID_ENCODED_BY: FrameId = FrameId(*b"TENC");
pub(crate) const FRAME_ID_PICTURE: FrameId = FrameId(*b"APIC");

/// The language written into comment frames with no better information
///
/// "XXX" is the ID3v2.4 convention for an unknown language.
pub(crate) const UNKNOWN_LANGUAGE: [u8; 3] = *b"XXX";

/// An `ID3v2` frame ID: exactly four characters within `'A'..='Z'` or `'0'..='9'`
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct FrameId([u8; 4]);

impl FrameId {
	/// Attempts to create a `FrameId` from raw bytes
	///
	/// # Errors
	///
	/// * `id` contains invalid characters (must be `'A'..='Z'` or `'0'..='9'`)
	pub fn new(id: [u8; 4]) -> Result<Self> {
		if !id
			.iter()
			.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
		{
			return Err(Id3v2Error::new(Id3v2ErrorKind::BadFrameId(id.to_vec())).into());
		}

		Ok(Self(id))
	}

	/// The ID as a string
	pub fn as_str(&self) -> &str {
		// Restricted to ASCII on construction
		std::str::from_utf8(&self.0).unwrap()
	}

	pub(crate) fn as_bytes(self) -> [u8; 4] {
		self.0
	}

	/// Whether this is a "T..." text information frame ID (excluding the special TXXX)
	pub(crate) fn is_text(self) -> bool {
		self.0[0] == b'T' && self.0 != *b"TXXX"
	}

	/// Whether this is a "W..." URL frame ID (excluding the special WXXX)
	pub(crate) fn is_url(self) -> bool {
		self.0[0] == b'W' && self.0 != *b"WXXX"
	}
}

impl Display for FrameId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::fmt::Debug for FrameId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Various flags to describe the content of a frame
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct FrameFlags {
	/// Preserve frame on tag edit
	pub tag_alter_preservation: bool,
	/// Preserve frame on file edit
	pub file_alter_preservation: bool,
	/// Frame cannot be written to
	pub read_only: bool,
	/// The group identifier the frame belongs to
	pub grouping_identity: Option<u8>,
	/// Frame is zlib compressed
	///
	/// It is **required** `data_length_indicator` be set if this is set.
	pub compression: bool,
	/// Frame encryption method symbol
	///
	/// Since the encryption method is unknown, these frames pass through as
	/// opaque binary data.
	pub encryption: Option<u8>,
	/// Frame is unsynchronised
	///
	/// Unsynchronized data is read; this flag has no effect when writing.
	pub unsynchronisation: bool,
	/// Frame has a data length indicator
	///
	/// The data length indicator is the size of the frame if the flags were all zeroed out.
	pub data_length_indicator: Option<u32>,
}

impl FrameFlags {
	/// Parse the flags from an ID3v2.4 frame
	pub fn parse_id3v24(flags: u16) -> Self {
		FrameFlags {
			tag_alter_preservation: flags & 0x4000 == 0x4000,
			file_alter_preservation: flags & 0x2000 == 0x2000,
			read_only: flags & 0x1000 == 0x1000,
			grouping_identity: (flags & 0x0040 == 0x0040).then_some(0),
			compression: flags & 0x0008 == 0x0008,
			encryption: (flags & 0x0004 == 0x0004).then_some(0),
			unsynchronisation: flags & 0x0002 == 0x0002,
			data_length_indicator: (flags & 0x0001 == 0x0001).then_some(0),
		}
	}

	/// Parse the flags from an ID3v2.3 frame
	pub fn parse_id3v23(flags: u16) -> Self {
		FrameFlags {
			tag_alter_preservation: flags & 0x8000 == 0x8000,
			file_alter_preservation: flags & 0x4000 == 0x4000,
			read_only: flags & 0x2000 == 0x2000,
			grouping_identity: (flags & 0x0020 == 0x0020).then_some(0),
			compression: flags & 0x0080 == 0x0080,
			encryption: (flags & 0x0040 == 0x0040).then_some(0),
			unsynchronisation: false,
			data_length_indicator: None,
		}
	}

	/// Get the ID3v2.4 byte representation of the flags
	pub fn as_id3v24_bytes(&self) -> u16 {
		let mut flags = 0;

		if *self == FrameFlags::default() {
			return flags;
		}

		if self.tag_alter_preservation {
			flags |= 0x4000
		}

		if self.file_alter_preservation {
			flags |= 0x2000
		}

		if self.read_only {
			flags |= 0x1000
		}

		if self.grouping_identity.is_some() {
			flags |= 0x0040
		}

		if self.compression {
			flags |= 0x0008
		}

		if self.encryption.is_some() {
			flags |= 0x0004
		}

		if self.unsynchronisation {
			flags |= 0x0002
		}

		if self.data_length_indicator.is_some() {
			flags |= 0x0001
		}

		flags
	}

	/// Get the ID3v2.3 byte representation of the flags
	pub fn as_id3v23_bytes(&self) -> u16 {
		let mut flags = 0;

		if *self == FrameFlags::default() {
			return flags;
		}

		if self.tag_alter_preservation {
			flags |= 0x8000
		}

		if self.file_alter_preservation {
			flags |= 0x4000
		}

		if self.read_only {
			flags |= 0x2000
		}

		if self.grouping_identity.is_some() {
			flags |= 0x0020
		}

		if self.compression {
			flags |= 0x0080
		}

		if self.encryption.is_some() {
			flags |= 0x0040
		}

		flags
	}
}

/// A "T..." text information frame
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextFrame {
	/// The frame's ID
	pub id: FrameId,
	/// The frame's flags
	pub flags: FrameFlags,
	/// The encoding of the text
	pub encoding: TextEncoding,
	/// The text itself
	pub value: String,
}

impl TextFrame {
	/// Create a new [`TextFrame`]
	pub fn new(id: FrameId, encoding: TextEncoding, value: impl Into<String>) -> Self {
		Self {
			id,
			flags: FrameFlags::default(),
			encoding,
			value: value.into(),
		}
	}

	pub(crate) fn as_bytes(
		&self,
		write_options: WriteOptions,
		encoding_options: EncodingOptions,
	) -> Result<Vec<u8>> {
		let mut encoding = self.encoding;
		if write_options.use_id3v23 {
			encoding = encoding.to_id3v23();
		}

		let mut content = encoding.encode(&self.value, false, encoding_options.on_conflict)?;
		content.insert(0, encoding.marker());
		Ok(content)
	}
}

/// A "COMM" comment frame
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CommentFrame {
	/// The frame's flags
	pub flags: FrameFlags,
	/// The encoding of the description and content
	pub encoding: TextEncoding,
	/// ISO-639-2 language code (3 bytes)
	pub language: [u8; 3],
	/// The content descriptor, empty for an unspecific comment
	pub description: String,
	/// The comment itself
	pub content: String,
}

impl CommentFrame {
	/// Create a new unspecific [`CommentFrame`]
	pub fn new(encoding: TextEncoding, content: impl Into<String>) -> Self {
		Self {
			flags: FrameFlags::default(),
			encoding,
			language: UNKNOWN_LANGUAGE,
			description: String::new(),
			content: content.into(),
		}
	}

	pub(crate) fn as_bytes(
		&self,
		write_options: WriteOptions,
		encoding_options: EncodingOptions,
	) -> Result<Vec<u8>> {
		if !self.language.iter().all(u8::is_ascii_alphabetic) {
			return Err(Id3v2Error::new(Id3v2ErrorKind::InvalidLanguage(self.language)).into());
		}

		let mut encoding = self.encoding;
		if write_options.use_id3v23 {
			encoding = encoding.to_id3v23();
		}

		let policy = encoding_options.on_conflict;

		let mut content = vec![encoding.marker()];
		content.extend_from_slice(&self.language);
		content.extend_from_slice(&encoding.encode(&self.description, true, policy)?);
		content.extend_from_slice(&encoding.encode(&self.content, false, policy)?);
		Ok(content)
	}
}

/// A "W..." URL frame
///
/// URL content is not encodable: the format defines it as ISO-8859-1 with no
/// encoding marker, whatever the rest of the tag uses.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UrlFrame {
	/// The frame's ID
	pub id: FrameId,
	/// The frame's flags
	pub flags: FrameFlags,
	/// The URL itself
	pub content: String,
}

impl UrlFrame {
	/// Create a new [`UrlFrame`]
	pub fn new(id: FrameId, content: impl Into<String>) -> Self {
		Self {
			id,
			flags: FrameFlags::default(),
			content: content.into(),
		}
	}

	pub(crate) fn as_bytes(&self, encoding_options: EncodingOptions) -> Result<Vec<u8>> {
		TextEncoding::LegacyUnspecified.encode(&self.content, false, encoding_options.on_conflict)
	}
}

/// An "APIC" attached picture frame
///
/// This is simply a wrapper around [`Picture`] to include a [`TextEncoding`]
/// for the description.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PictureFrame {
	/// The frame's flags
	pub flags: FrameFlags,
	/// The encoding of the description
	pub encoding: TextEncoding,
	/// The picture itself
	pub picture: Picture,
}

impl PictureFrame {
	/// Create a new [`PictureFrame`]
	pub fn new(encoding: TextEncoding, picture: Picture) -> Self {
		Self {
			flags: FrameFlags::default(),
			encoding,
			picture,
		}
	}

	pub(crate) fn as_bytes(
		&self,
		write_options: WriteOptions,
		encoding_options: EncodingOptions,
	) -> Result<Vec<u8>> {
		let mut encoding = self.encoding;
		if write_options.use_id3v23 {
			encoding = encoding.to_id3v23();
		}

		let mut data = vec![encoding.marker()];

		if let Some(mime_type) = &self.picture.mime_type {
			data.write_all(mime_type.as_str().as_bytes())?;
		}
		data.write_u8(0)?;

		data.write_u8(self.picture.pic_type.as_u8())?;

		match &self.picture.description {
			Some(description) => data.extend_from_slice(&encoding.encode(
				description,
				true,
				encoding_options.on_conflict,
			)?),
			None => data.write_u8(0)?,
		}

		data.write_all(&self.picture.data)?;

		if data.len() as u64 > u64::from(u32::MAX) {
			err!(TooMuchData);
		}

		Ok(data)
	}
}

/// Binary data
///
/// This is used for unknown frames and for encrypted frames, which pass
/// through reads and writes untouched.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BinaryFrame {
	/// The frame's ID
	pub id: FrameId,
	/// The frame's flags
	pub flags: FrameFlags,
	/// The raw frame content
	pub data: Vec<u8>,
}

impl BinaryFrame {
	pub(crate) fn as_bytes(&self) -> Vec<u8> {
		self.data.clone()
	}
}

/// Represents an `ID3v2` frame
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Frame {
	/// Represents a "T..." (excluding TXXX) frame
	Text(TextFrame),
	/// Represents a "COMM" frame
	Comment(CommentFrame),
	/// Represents a "W..." (excluding WXXX) frame
	Url(UrlFrame),
	/// Represents an "APIC" frame
	Picture(PictureFrame),
	/// Binary data, covering unknown and encrypted frames
	Binary(BinaryFrame),
}

impl Frame {
	/// Get the ID of the frame
	pub fn id(&self) -> FrameId {
		match self {
			Frame::Text(frame) => frame.id,
			Frame::Comment(_) => FRAME_ID_COMMENT,
			Frame::Url(frame) => frame.id,
			Frame::Picture(_) => FRAME_ID_PICTURE,
			Frame::Binary(frame) => frame.id,
		}
	}

	/// Get the flags for the frame
	pub fn flags(&self) -> FrameFlags {
		match self {
			Frame::Text(frame) => frame.flags,
			Frame::Comment(frame) => frame.flags,
			Frame::Url(frame) => frame.flags,
			Frame::Picture(frame) => frame.flags,
			Frame::Binary(frame) => frame.flags,
		}
	}

	/// Check for empty content
	pub(crate) fn is_empty(&self) -> bool {
		match self {
			Frame::Text(text) => text.value.is_empty(),
			Frame::Comment(comment) => comment.content.is_empty(),
			Frame::Url(link) => link.content.is_empty(),
			Frame::Picture(picture) => picture.picture.data.is_empty(),
			Frame::Binary(binary) => binary.data.is_empty(),
		}
	}

	/// Used for errors in frame verification
	pub(crate) fn name(&self) -> &'static str {
		match self {
			Frame::Text(_) => "Text",
			Frame::Comment(_) => "Comment",
			Frame::Url(_) => "Url",
			Frame::Picture(_) => "Picture",
			Frame::Binary(_) => "Binary",
		}
	}

	pub(crate) fn as_bytes(
		&self,
		write_options: WriteOptions,
		encoding_options: EncodingOptions,
	) -> Result<Vec<u8>> {
		Ok(match self {
			Frame::Text(tif) => tif.as_bytes(write_options, encoding_options)?,
			Frame::Comment(comment) => comment.as_bytes(write_options, encoding_options)?,
			Frame::Url(link) => link.as_bytes(encoding_options)?,
			Frame::Picture(attached_picture) => {
				attached_picture.as_bytes(write_options, encoding_options)?
			},
			Frame::Binary(frame) => frame.as_bytes(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::{FRAME_ID_TITLE, FrameId, TextFrame};
	use crate::config::{EncodingOptions, WriteOptions};
	use crate::util::text::TextEncoding;

	#[test_log::test]
	fn frame_id_validation() {
		assert!(FrameId::new(*b"TIT2").is_ok());
		assert!(FrameId::new(*b"TPE1").is_ok());
		assert!(FrameId::new(*b"ti t").is_err());
		assert!(FrameId::new(*b"TP+1").is_err());
	}

	#[test_log::test]
	fn text_frame_bytes() {
		let frame = TextFrame::new(FRAME_ID_TITLE, TextEncoding::Latin1, "Foo");
		let bytes = frame
			.as_bytes(WriteOptions::new(), EncodingOptions::new())
			.unwrap();

		assert_eq!(bytes, [0x00, b'F', b'o', b'o']);
	}

	#[test_log::test]
	fn v23_substitutes_v24_encodings() {
		let frame = TextFrame::new(FRAME_ID_TITLE, TextEncoding::Utf8, "A");
		let bytes = frame
			.as_bytes(
				WriteOptions::new().use_id3v23(true),
				EncodingOptions::new(),
			)
			.unwrap();

		// UTF-16 marker, big endian BOM, big endian payload
		assert_eq!(bytes, [0x01, 0xFE, 0xFF, 0x00, b'A']);
	}
}
