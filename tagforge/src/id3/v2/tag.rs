use super::frame::{
	CommentFrame, FRAME_ID_ALBUM, FRAME_ID_ALBUM_ARTIST, FRAME_ID_ARTIST, FRAME_ID_COMPOSER,
	FRAME_ID_COPYRIGHT, FRAME_ID_DISC, FRAME_ID_ENCODED_BY, FRAME_ID_GENRE, FRAME_ID_ORIG_ARTIST,
	FRAME_ID_RECORDING_TIME, FRAME_ID_TITLE, FRAME_ID_TRACK, FRAME_ID_URL, FRAME_ID_YEAR, Frame,
	FrameId, PictureFrame, TextFrame, UrlFrame,
};
use super::header::{Id3v2TagFlags, Id3v2Version};
use crate::config::{EncodingOptions, WriteOptions};
use crate::field::{self, FieldClass};
use crate::genre;
use crate::tag::Tag;
use crate::util::text::TextEncoding;

/// An `ID3v2` tag: the ordered collection of frames for one tag version
///
/// The collection starts empty and is populated one field at a time. Setting
/// a field always removes every existing frame with that identifier before
/// adding the replacement, so a textual identifier can never occur twice.
/// Pictures are the exception: attaching is additive, and duplicates are not
/// collapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Id3v2Tag {
	pub(crate) original_version: Id3v2Version,
	flags: Id3v2TagFlags,
	pub(crate) frames: Vec<Frame>,
}

impl Default for Id3v2Tag {
	fn default() -> Self {
		Self {
			original_version: Id3v2Version::V4,
			flags: Id3v2TagFlags::default(),
			frames: Vec::new(),
		}
	}
}

impl Id3v2Tag {
	/// Create a new empty `Id3v2Tag`
	pub fn new() -> Self {
		Self::default()
	}

	/// The tag-level flags
	pub fn flags(&self) -> Id3v2TagFlags {
		self.flags
	}

	/// Set the tag-level flags
	pub fn set_flags(&mut self, flags: Id3v2TagFlags) {
		self.flags = flags;
	}

	/// The number of frames in the tag
	pub fn len(&self) -> usize {
		self.frames.len()
	}

	/// Whether the tag has no frames at all
	pub fn is_empty(&self) -> bool {
		self.frames.is_empty()
	}

	/// An iterator over the frames
	pub fn frames(&self) -> impl Iterator<Item = &Frame> {
		self.frames.iter()
	}

	/// Remove all frames with the given identifier, returning the first removed
	pub fn remove(&mut self, id: FrameId) -> Option<Frame> {
		let mut removed = None;

		// There should never be more than one match, but a tag we read may
		// have been written by something less careful.
		self.frames.retain(|frame| {
			if frame.id() == id {
				if removed.is_none() {
					removed = Some(frame.clone());
				}
				return false;
			}

			true
		});

		removed
	}

	/// Insert a frame, replacing any existing frames with the same identifier
	///
	/// Picture frames are additive and never replace anything. Binary
	/// frames are additive too: several opaque frames may legitimately
	/// share an identifier (PRIV frames keyed by owner, for one).
	///
	/// Returns the first frame that was replaced, if any.
	pub fn insert(&mut self, frame: Frame) -> Option<Frame> {
		if matches!(frame, Frame::Picture(_) | Frame::Binary(_)) {
			self.frames.push(frame);
			return None;
		}

		let replaced = self.remove(frame.id());
		self.frames.push(frame);
		replaced
	}

	/// Set a textual field: remove all frames with `id`, then add the value if non-empty
	pub fn set_text(&mut self, id: FrameId, value: Option<&str>, options: EncodingOptions) {
		self.remove(id);

		if let Some(value) = value {
			if value.trim().is_empty() {
				return;
			}

			let encoding = field::select_encoding(value, FieldClass::Text, options);
			self.frames
				.push(Frame::Text(TextFrame::new(id, encoding, value)));
		}
	}

	/// Build the frame set for a [`Tag`]
	///
	/// The frame set is always built fresh; nothing from a previously read
	/// tag survives except what the caller re-supplies (see
	/// [`Id3v2Tag::adopt_binary_frames`]).
	pub(crate) fn from_tag(
		tag: &Tag,
		write_options: WriteOptions,
		options: EncodingOptions,
	) -> Self {
		let mut id3v2 = Id3v2Tag::new();

		id3v2.set_text(FRAME_ID_TITLE, tag.title(), options);
		id3v2.set_text(FRAME_ID_ARTIST, tag.artist(), options);
		id3v2.set_text(FRAME_ID_ALBUM_ARTIST, tag.album_artist(), options);
		id3v2.set_text(FRAME_ID_ALBUM, tag.album(), options);
		id3v2.set_text(FRAME_ID_DISC, tag.disc_number(), options);
		id3v2.set_text(FRAME_ID_COMPOSER, tag.composer(), options);
		id3v2.set_text(FRAME_ID_ORIG_ARTIST, tag.orig_artist(), options);
		id3v2.set_text(FRAME_ID_COPYRIGHT, tag.copyright(), options);
		id3v2.set_text(FRAME_ID_ENCODED_BY, tag.encoded_by(), options);
		id3v2.set_text(FRAME_ID_GENRE, tag.genre(), options);

		// ID3v2.3 predates the TDRC timestamp frame
		let year_id = if write_options.use_id3v23 {
			FRAME_ID_YEAR
		} else {
			FRAME_ID_RECORDING_TIME
		};
		id3v2.set_text(year_id, tag.year(), options);

		let track = match (tag.track(), tag.track_total()) {
			(Some(track), Some(total)) => Some(format!("{track}/{total}")),
			(Some(track), None) => Some(track.to_owned()),
			// A total with no track number has nothing to attach to
			(None, _) => None,
		};
		id3v2.set_text(FRAME_ID_TRACK, track.as_deref(), options);

		if let Some(comment) = tag.comment() {
			let encoding = field::select_encoding(comment, FieldClass::Text, options);
			id3v2.insert(Frame::Comment(CommentFrame::new(encoding, comment)));
		}

		if let Some(url) = tag.url() {
			id3v2.insert(Frame::Url(UrlFrame::new(FRAME_ID_URL, url)));
		}

		for picture in tag.pictures() {
			let encoding = picture
				.description
				.as_deref()
				.map_or(TextEncoding::Latin1, |description| {
					field::select_encoding(description, FieldClass::Text, options)
				});
			id3v2.insert(Frame::Picture(PictureFrame::new(encoding, picture.clone())));
		}

		id3v2
	}

	/// Carry over the opaque frames of a previously read tag
	///
	/// Frames outside this crate's vocabulary (and encrypted frames) are
	/// preserved across a rewrite rather than dropped.
	pub(crate) fn adopt_binary_frames(&mut self, existing: Id3v2Tag) {
		for frame in existing.frames {
			if let Frame::Binary(_) = frame {
				self.insert(frame);
			}
		}
	}

	/// Expose the tag's contents as a [`Tag`]
	pub(crate) fn merge_into(self, tag: &mut Tag) {
		for frame in self.frames {
			match frame {
				Frame::Text(text) => merge_text_frame(tag, text),
				Frame::Comment(comment) => {
					// Unspecific comments only; commented-with-description
					// frames belong to other applications
					if tag.comment().is_none() && comment.description.is_empty() {
						tag.set_comment(comment.content);
					}
				},
				Frame::Url(url) => {
					if url.id == FRAME_ID_URL && tag.url().is_none() {
						tag.set_url(url.content);
					}
				},
				Frame::Picture(picture) => tag.push_picture(picture.picture),
				Frame::Binary(_) => {},
			}
		}
	}
}

fn merge_text_frame(tag: &mut Tag, frame: TextFrame) {
	let TextFrame { id, value, .. } = frame;

	match id {
		FRAME_ID_TITLE => tag.set_title(value),
		FRAME_ID_ARTIST => tag.set_artist(value),
		FRAME_ID_ALBUM_ARTIST => tag.set_album_artist(value),
		FRAME_ID_ALBUM => tag.set_album(value),
		FRAME_ID_DISC => tag.set_disc_number(value),
		FRAME_ID_COMPOSER => tag.set_composer(value),
		FRAME_ID_ORIG_ARTIST => tag.set_orig_artist(value),
		FRAME_ID_COPYRIGHT => tag.set_copyright(value),
		FRAME_ID_ENCODED_BY => tag.set_encoded_by(value),
		FRAME_ID_GENRE => tag.set_genre(normalize_genre(&value)),
		FRAME_ID_RECORDING_TIME => {
			// A TDRC timestamp starts with the year
			let year: String = value.chars().take_while(char::is_ascii_digit).collect();
			if year.len() == 4 {
				tag.set_year(year);
			}
		},
		FRAME_ID_YEAR => tag.set_year(value),
		FRAME_ID_TRACK => {
			match value.split_once('/') {
				Some((track, total)) => {
					tag.set_track(track);
					tag.set_track_total(total);
				},
				None => tag.set_track(value),
			}
		},
		_ => {},
	}
}

/// Map a TCON payload to a genre name
///
/// Older writers put a numeric table index in the frame, either bare ("17")
/// or in the ID3v2.3 reference style ("(17)"). Those are translated through
/// the genre table; anything else is taken as a literal name.
fn normalize_genre(value: &str) -> String {
	let candidate = value
		.strip_prefix('(')
		.and_then(|rest| rest.strip_suffix(')'))
		.unwrap_or(value);

	if let Ok(index) = candidate.parse::<u8>() {
		let name = genre::name_for_index(index);
		if !name.is_empty() {
			return name.to_owned();
		}
	}

	value.to_owned()
}

#[cfg(test)]
mod tests {
	use super::super::frame::{FRAME_ID_TITLE, Frame, TextFrame};
	use super::Id3v2Tag;
	use crate::config::{EncodingOptions, WriteOptions};
	use crate::tag::Tag;
	use crate::util::text::TextEncoding;

	#[test_log::test]
	fn set_text_is_remove_then_add() {
		let options = EncodingOptions::new();
		let mut id3v2 = Id3v2Tag::new();

		id3v2.set_text(FRAME_ID_TITLE, Some("A"), options);
		id3v2.set_text(FRAME_ID_TITLE, Some("B"), options);

		let titles = id3v2
			.frames()
			.filter(|frame| frame.id() == FRAME_ID_TITLE)
			.collect::<Vec<_>>();
		assert_eq!(titles.len(), 1);

		let Frame::Text(TextFrame { value, .. }) = titles[0] else {
			panic!("expected a text frame");
		};
		assert_eq!(value, "B");

		// Setting to nothing removes the frame without replacement
		id3v2.set_text(FRAME_ID_TITLE, None, options);
		assert!(id3v2.is_empty());
	}

	#[test_log::test]
	fn insert_replaces_duplicates() {
		let mut id3v2 = Id3v2Tag::new();

		// Simulate a sloppy writer: two TIT2 frames
		id3v2.frames.push(Frame::Text(TextFrame::new(
			FRAME_ID_TITLE,
			TextEncoding::Latin1,
			"one",
		)));
		id3v2.frames.push(Frame::Text(TextFrame::new(
			FRAME_ID_TITLE,
			TextEncoding::Latin1,
			"two",
		)));

		let replaced = id3v2.insert(Frame::Text(TextFrame::new(
			FRAME_ID_TITLE,
			TextEncoding::Latin1,
			"three",
		)));

		assert!(replaced.is_some());
		assert_eq!(id3v2.len(), 1);
	}

	#[test_log::test]
	fn genre_normalization() {
		assert_eq!(super::normalize_genre("Classical"), "Classical");
		assert_eq!(super::normalize_genre("17"), "Rock");
		assert_eq!(super::normalize_genre("(17)"), "Rock");
		assert_eq!(super::normalize_genre("(255)"), "(255)");
		assert_eq!(super::normalize_genre("Something Else"), "Something Else");
	}

	#[test_log::test]
	fn track_pair_round_trip() {
		let mut tag = Tag::new();
		tag.set_track("3");
		tag.set_track_total("11");

		let id3v2 = Id3v2Tag::from_tag(&tag, WriteOptions::new(), EncodingOptions::new());

		let mut read_back = Tag::new();
		id3v2.merge_into(&mut read_back);

		assert_eq!(read_back.track(), Some("3"));
		assert_eq!(read_back.track_total(), Some("11"));
	}

	#[test_log::test]
	fn empty_tag_assembles_no_frames() {
		let id3v2 = Id3v2Tag::from_tag(&Tag::new(), WriteOptions::new(), EncodingOptions::new());
		assert!(id3v2.is_empty());
	}
}
