use crate::util::charset::{Charset, ConflictPolicy};

/// Which Unicode encoding to use when Unicode writing is enabled
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum UnicodeEncoding {
	/// UTF-16 with a byte order mark (most compatible)
	#[default]
	Utf16,
	/// UTF-8 (ID3v2.4 only; substituted with UTF-16 when writing ID3v2.3)
	Utf8,
}

/// How tag text is encoded on write
///
/// This is resolved from caller configuration once per call and never stored
/// on a [`Tag`](crate::tag::Tag).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct EncodingOptions {
	pub(crate) unicode: bool,
	pub(crate) unicode_encoding: UnicodeEncoding,
	pub(crate) iso_charset: Charset,
	pub(crate) on_conflict: ConflictPolicy,
}

impl EncodingOptions {
	/// Creates a new `EncodingOptions`, alias for `Default` implementation
	///
	/// See also: [`EncodingOptions::default`]
	pub const fn new() -> Self {
		Self {
			unicode: true,
			unicode_encoding: UnicodeEncoding::Utf16,
			iso_charset: Charset::Iso8859_1,
			on_conflict: ConflictPolicy::Transliterate,
		}
	}

	/// Whether to write Unicode text
	///
	/// When disabled, each field is first tried in the single-byte charset.
	/// A field that cannot be represented there losslessly is written as
	/// UTF-16 anyway; a tag never silently loses characters it could
	/// represent.
	///
	/// # Examples
	///
	/// ```rust
	/// use tagforge::config::EncodingOptions;
	///
	/// // Prefer single-byte output for maximum player compatibility
	/// let options = EncodingOptions::new().unicode(false);
	/// ```
	pub fn unicode(mut self, unicode: bool) -> Self {
		self.unicode = unicode;
		self
	}

	/// The Unicode encoding used when [`unicode`](Self::unicode) is enabled
	pub fn unicode_encoding(mut self, unicode_encoding: UnicodeEncoding) -> Self {
		self.unicode_encoding = unicode_encoding;
		self
	}

	/// The single-byte charset used for non-Unicode writing
	///
	/// The encoding marker written for this path is always the Latin-1
	/// marker, whatever the charset; that is how non-standard single-byte
	/// tags have always been produced in the wild.
	pub fn iso_charset(mut self, iso_charset: Charset) -> Self {
		self.iso_charset = iso_charset;
		self
	}

	/// What to do with characters the single-byte charset cannot represent
	///
	/// With [`ConflictPolicy::Reject`], the write fails with
	/// [`ErrorKind::UnsupportedCharacter`](crate::error::ErrorKind::UnsupportedCharacter)
	/// and the caller decides whether to retry with a lossier policy.
	pub fn on_conflict(mut self, on_conflict: ConflictPolicy) -> Self {
		self.on_conflict = on_conflict;
		self
	}
}

impl Default for EncodingOptions {
	/// The default implementation for `EncodingOptions`
	///
	/// The defaults are as follows:
	///
	/// ```rust,ignore
	/// EncodingOptions {
	///     unicode: true,
	///     unicode_encoding: UnicodeEncoding::Utf16,
	///     iso_charset: Charset::Iso8859_1,
	///     on_conflict: ConflictPolicy::Transliterate,
	/// }
	/// ```
	fn default() -> Self {
		Self::new()
	}
}
