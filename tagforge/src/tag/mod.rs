//! The format-independent tag representation

mod picture;

pub use picture::{MimeType, Picture, PictureType};

// Generates the getter/setter/remover triple for each text field of `Tag`.
//
// Setting a value that is empty or whitespace-only is equivalent to removing
// the field; the strip-vs-write decision on save depends on this.
macro_rules! impl_accessor {
	($($name:ident => $display:literal,)+) => {
		paste::paste! {
			$(
				#[doc = "Returns the " $display]
				pub fn $name(&self) -> Option<&str> {
					self.$name.as_deref()
				}

				#[doc = "Sets the " $display]
				///
				/// An empty or whitespace-only value removes the field instead.
				pub fn [<set_ $name>](&mut self, value: impl Into<String>) {
					let value = value.into();
					if value.trim().is_empty() {
						self.$name = None;
					} else {
						self.$name = Some(value);
					}
				}

				#[doc = "Removes the " $display]
				pub fn [<remove_ $name>](&mut self) {
					self.$name = None
				}
			)+
		}
	}
}

/// A format-independent tag
///
/// This is the value exchanged with the calling application: an ordered set
/// of named, individually optional text fields plus any number of embedded
/// pictures. An entirely empty `Tag` is a valid state and means "no tag";
/// together with [`WriteOptions::strip_empty_tags`](crate::config::WriteOptions::strip_empty_tags)
/// it causes both on-disk tag versions to be removed on save.
///
/// The codec never retains a `Tag` (or any reference into one) across calls.
///
/// # Examples
///
/// ```rust
/// use tagforge::tag::Tag;
///
/// let mut tag = Tag::new();
/// assert!(tag.is_empty());
///
/// tag.set_title("Spoon");
/// tag.set_artist("Cibo Matto");
/// assert_eq!(tag.title(), Some("Spoon"));
/// assert!(!tag.is_empty());
/// ```
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Tag {
	pub(crate) title: Option<String>,
	pub(crate) artist: Option<String>,
	pub(crate) album_artist: Option<String>,
	pub(crate) album: Option<String>,
	pub(crate) disc_number: Option<String>,
	pub(crate) year: Option<String>,
	pub(crate) track: Option<String>,
	pub(crate) track_total: Option<String>,
	pub(crate) genre: Option<String>,
	pub(crate) comment: Option<String>,
	pub(crate) composer: Option<String>,
	pub(crate) orig_artist: Option<String>,
	pub(crate) copyright: Option<String>,
	pub(crate) url: Option<String>,
	pub(crate) encoded_by: Option<String>,
	pub(crate) pictures: Vec<Picture>,
}

impl Tag {
	/// Create a new empty `Tag`
	pub fn new() -> Self {
		Self::default()
	}

	impl_accessor! {
		title => "track title",
		artist => "track artist",
		album_artist => "album artist",
		album => "album title",
		disc_number => "disc number",
		year => "release year",
		track => "track number",
		track_total => "total track count",
		genre => "genre",
		comment => "comment",
		composer => "composer",
		orig_artist => "original artist",
		copyright => "copyright notice",
		url => "associated URL",
		encoded_by => "name of the encoder",
	}

	/// Attach a picture
	///
	/// Pictures are additive; attaching does not replace existing pictures,
	/// and duplicates are not collapsed.
	pub fn push_picture(&mut self, picture: Picture) {
		self.pictures.push(picture);
	}

	/// The attached pictures, in attachment order
	pub fn pictures(&self) -> &[Picture] {
		&self.pictures
	}

	/// Remove all attached pictures
	pub fn remove_pictures(&mut self) {
		self.pictures.clear();
	}

	/// Whether no field holds a usable value
	///
	/// A field set to a whitespace-only string does not count as present.
	/// This is the exact predicate behind the strip-when-empty decision on
	/// save: every user-visible field and every picture is considered,
	/// nothing else.
	pub fn is_empty(&self) -> bool {
		fn absent(field: &Option<String>) -> bool {
			field.as_deref().is_none_or(|value| value.trim().is_empty())
		}

		absent(&self.title)
			&& absent(&self.artist)
			&& absent(&self.album_artist)
			&& absent(&self.album)
			&& absent(&self.disc_number)
			&& absent(&self.year)
			&& absent(&self.track)
			&& absent(&self.track_total)
			&& absent(&self.genre)
			&& absent(&self.comment)
			&& absent(&self.composer)
			&& absent(&self.orig_artist)
			&& absent(&self.copyright)
			&& absent(&self.url)
			&& absent(&self.encoded_by)
			&& self.pictures.is_empty()
	}

	/// The number of fields holding a value, pictures included
	pub fn len(&self) -> usize {
		[
			&self.title,
			&self.artist,
			&self.album_artist,
			&self.album,
			&self.disc_number,
			&self.year,
			&self.track,
			&self.track_total,
			&self.genre,
			&self.comment,
			&self.composer,
			&self.orig_artist,
			&self.copyright,
			&self.url,
			&self.encoded_by,
		]
		.iter()
		.filter(|field| field.is_some())
		.count() + self.pictures.len()
	}

	/// Remove every field and picture
	pub fn clear(&mut self) {
		*self = Self::default();
	}
}

#[cfg(test)]
mod tests {
	use super::{Picture, PictureType, Tag};

	#[test_log::test]
	fn empty_tag() {
		let mut tag = Tag::new();
		assert!(tag.is_empty());
		assert_eq!(tag.len(), 0);

		// Whitespace-only values must not count as present
		tag.set_title("   ");
		assert!(tag.is_empty());
		assert_eq!(tag.title(), None);

		tag.set_title("Birthday Cake");
		assert!(!tag.is_empty());

		tag.remove_title();
		assert!(tag.is_empty());
	}

	#[test_log::test]
	fn pictures_are_additive() {
		let mut tag = Tag::new();

		let picture = Picture::new(PictureType::CoverFront, None, None, vec![1, 2, 3]);
		tag.push_picture(picture.clone());
		tag.push_picture(picture);

		assert_eq!(tag.pictures().len(), 2);
		assert!(!tag.is_empty());

		tag.remove_pictures();
		assert!(tag.is_empty());
	}
}
