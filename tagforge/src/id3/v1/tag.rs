use crate::genre::{self, GENRE_INVALID, GENRE_MAX};
use crate::tag::Tag;

/// The single-byte view of a [`Tag`], as stored in an ID3v1 trailer
///
/// All fields have been commented with their maximum sizes and any other
/// additional restrictions. Attempting to write a field greater than the
/// maximum size will **not** error, it will just be shrunk.
///
/// A v1.1 tag (28 byte comment + track number) is always written when a
/// track number is present.
#[derive(Default, Debug, PartialEq, Eq, Clone)]
pub struct Id3v1Tag {
	/// Track title, 30 bytes max
	pub title: Option<String>,
	/// Track artist, 30 bytes max
	pub artist: Option<String>,
	/// Album title, 30 bytes max
	pub album: Option<String>,
	/// Release year (max 9999)
	pub year: Option<u16>,
	/// A short comment
	///
	/// The number of bytes differs between versions, but not much.
	/// A V1 tag has 30 bytes available, a V1.1 tag only 28.
	pub comment: Option<String>,
	/// The track number, 1 byte max
	///
	/// The track number **cannot** be 0. Readers look for a null byte at
	/// the end of the comment to differentiate between V1 and V1.1.
	pub track_number: Option<u8>,
	/// The track's genre, an index into [`GENRES`](crate::genre::GENRES)
	pub genre: Option<u8>,
}

impl Id3v1Tag {
	/// Create a new empty `Id3v1Tag`
	pub fn new() -> Self {
		Self::default()
	}

	pub(crate) fn is_empty(&self) -> bool {
		self.title.is_none()
			&& self.artist.is_none()
			&& self.album.is_none()
			&& self.year.is_none()
			&& self.comment.is_none()
			&& self.track_number.is_none()
			&& self.genre.is_none()
	}

	/// Derive the single-byte tag from a [`Tag`]
	///
	/// Everything ID3v1 cannot hold is dropped here: pictures, the fields
	/// with no v1 slot, track totals. Text is shrunk to the field widths at
	/// encode time, not here, so the caller's `Tag` round-trips losslessly
	/// through the v2 path regardless.
	pub(crate) fn from_tag(tag: &Tag) -> Self {
		let genre = tag.genre().map(genre::index_for_name).and_then(|index| {
			if index == GENRE_INVALID {
				None
			} else {
				Some(index)
			}
		});

		Self {
			title: tag.title().map(str::to_owned),
			artist: tag.artist().map(str::to_owned),
			album: tag.album().map(str::to_owned),
			year: tag.year().and_then(|year| year.parse::<u16>().ok()),
			comment: tag.comment().map(str::to_owned),
			track_number: tag
				.track()
				.and_then(|track| track.parse::<u8>().ok())
				.filter(|track| *track != 0),
			genre,
		}
	}

	/// Fill the fields of `tag` this v1 tag has values for
	///
	/// Fields already present in `tag` (from the ID3v2 read) win; v1 only
	/// supplies what v2 left empty.
	pub(crate) fn merge_into(self, tag: &mut Tag) {
		if tag.title().is_none() {
			if let Some(title) = self.title {
				tag.set_title(title);
			}
		}

		if tag.artist().is_none() {
			if let Some(artist) = self.artist {
				tag.set_artist(artist);
			}
		}

		if tag.album().is_none() {
			if let Some(album) = self.album {
				tag.set_album(album);
			}
		}

		if tag.year().is_none() {
			if let Some(year) = self.year {
				tag.set_year(year.to_string());
			}
		}

		if tag.comment().is_none() {
			if let Some(comment) = self.comment {
				tag.set_comment(comment);
			}
		}

		if tag.track().is_none() {
			if let Some(track_number) = self.track_number {
				tag.set_track(track_number.to_string());
			}
		}

		if tag.genre().is_none() {
			if let Some(index) = self.genre {
				if index <= GENRE_MAX {
					tag.set_genre(genre::name_for_index(index));
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::Id3v1Tag;
	use crate::config::{EncodingOptions, ParseOptions, WriteOptions};
	use crate::tag::Tag;

	fn expected_tag() -> Id3v1Tag {
		Id3v1Tag {
			title: Some(String::from("Foo title")),
			artist: Some(String::from("Bar artist")),
			album: Some(String::from("Baz album")),
			year: Some(1984),
			comment: Some(String::from("Qux comment")),
			track_number: Some(1),
			genre: Some(32),
		}
	}

	fn assets_tag_bytes() -> [u8; 128] {
		let tag = expected_tag();
		super::super::write::encode(&tag, WriteOptions::new(), EncodingOptions::new()).unwrap()
	}

	#[test_log::test]
	fn id3v1_re_read() {
		let bytes = assets_tag_bytes();
		let parsed_tag = Id3v1Tag::parse(bytes, ParseOptions::new()).unwrap();

		assert_eq!(parsed_tag, expected_tag());
	}

	#[test_log::test]
	fn tag_to_id3v1() {
		let mut tag = Tag::new();
		tag.set_title("Foo title");
		tag.set_artist("Bar artist");
		tag.set_genre("Classical");
		tag.set_track("1");
		tag.set_year("1984");

		let id3v1_tag = Id3v1Tag::from_tag(&tag);

		assert_eq!(id3v1_tag.title.as_deref(), Some("Foo title"));
		assert_eq!(id3v1_tag.artist.as_deref(), Some("Bar artist"));
		assert_eq!(id3v1_tag.genre, Some(32));
		assert_eq!(id3v1_tag.track_number, Some(1));
		assert_eq!(id3v1_tag.year, Some(1984));
	}

	#[test_log::test]
	fn unknown_genre_becomes_sentinel() {
		let mut tag = Tag::new();
		tag.set_genre("Not A Genre");

		let id3v1_tag = Id3v1Tag::from_tag(&tag);
		assert_eq!(id3v1_tag.genre, None);

		// The writer puts 255 on disk for an absent genre
		let bytes =
			super::super::write::encode(&id3v1_tag, WriteOptions::new(), EncodingOptions::new())
				.unwrap();
		assert_eq!(bytes[127], 255);
	}

	#[test_log::test]
	fn id3v1_merge_prefers_existing() {
		let mut tag = Tag::new();
		tag.set_title("From v2");

		let mut v1 = expected_tag();
		v1.title = Some(String::from("From v1"));
		v1.merge_into(&mut tag);

		assert_eq!(tag.title(), Some("From v2"));
		assert_eq!(tag.artist(), Some("Bar artist"));
		assert_eq!(tag.genre(), Some("Classical"));
	}
}
