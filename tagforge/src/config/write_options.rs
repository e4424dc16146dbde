/// Options to control which tag versions are written and how
///
/// This acts as a dumping ground for all sorts of format-specific settings. As such, this is best
/// used as an application global config that gets set once.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct WriteOptions {
	pub(crate) write_id3v1: bool,
	pub(crate) write_id3v2: bool,
	pub(crate) strip_empty_tags: bool,
	pub(crate) use_id3v23: bool,
	pub(crate) preferred_padding: Option<u32>,
}

impl WriteOptions {
	/// Default preferred padding size in bytes
	pub const DEFAULT_PREFERRED_PADDING: u32 = 1024;

	/// Creates a new `WriteOptions`, alias for `Default` implementation
	///
	/// See also: [`WriteOptions::default`]
	pub const fn new() -> Self {
		Self {
			write_id3v1: true,
			write_id3v2: true,
			strip_empty_tags: true,
			use_id3v23: false,
			preferred_padding: Some(Self::DEFAULT_PREFERRED_PADDING),
		}
	}

	/// Whether to write/update the ID3v1 tag
	///
	/// When disabled, an existing ID3v1 tag is stripped from the file on save.
	pub fn write_id3v1(mut self, write_id3v1: bool) -> Self {
		self.write_id3v1 = write_id3v1;
		self
	}

	/// Whether to write/update the ID3v2 tag
	///
	/// When disabled, an existing ID3v2 tag is stripped from the file on save.
	pub fn write_id3v2(mut self, write_id3v2: bool) -> Self {
		self.write_id3v2 = write_id3v2;
		self
	}

	/// Whether a fully empty [`Tag`](crate::tag::Tag) strips both versions
	///
	/// When enabled and no field of the tag holds a non-whitespace value,
	/// both tag versions are removed from the file regardless of the
	/// per-version write switches above.
	pub fn strip_empty_tags(mut self, strip_empty_tags: bool) -> Self {
		self.strip_empty_tags = strip_empty_tags;
		self
	}

	/// Whether to write ID3v2.3 instead of ID3v2.4
	///
	/// ID3v2.4-only text encodings are substituted with UTF-16 (see
	/// [`EncodingOptions`](crate::config::EncodingOptions)).
	pub fn use_id3v23(mut self, use_id3v23: bool) -> Self {
		self.use_id3v23 = use_id3v23;
		self
	}

	/// Set the preferred padding size in bytes
	///
	/// Padding after the ID3v2 frames lets the next size-neighbored update
	/// avoid rewriting the whole file. The actual padding size may differ.
	///
	/// # Examples
	///
	/// ```rust
	/// use tagforge::config::WriteOptions;
	///
	/// // I don't want padding under any circumstances!
	/// let options = WriteOptions::new().preferred_padding(0);
	/// ```
	pub fn preferred_padding(mut self, preferred_padding: u32) -> Self {
		match preferred_padding {
			0 => self.preferred_padding = None,
			_ => self.preferred_padding = Some(preferred_padding),
		}
		self
	}
}

impl Default for WriteOptions {
	/// The default implementation for `WriteOptions`
	///
	/// The defaults are as follows:
	///
	/// ```rust,ignore
	/// WriteOptions {
	///     write_id3v1: true,
	///     write_id3v2: true,
	///     strip_empty_tags: true,
	///     use_id3v23: false,
	///     preferred_padding: 1024,
	/// }
	/// ```
	fn default() -> Self {
		Self::new()
	}
}
