use crate::util::charset::Charset;

/// How strict the parser is with malformed input
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Default)]
#[non_exhaustive]
pub enum ParsingMode {
	/// Fail on all malformed input
	Strict,
	/// Recover where recovery is well defined, logging each recovery
	#[default]
	BestAttempt,
	/// Skip anything that cannot be read, never failing the whole read
	Relaxed,
}

/// Options to control how tags are read
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct ParseOptions {
	pub(crate) parsing_mode: ParsingMode,
	pub(crate) fallback_charset: Option<Charset>,
	pub(crate) read_cover_art: bool,
}

impl Default for ParseOptions {
	/// The default implementation for `ParseOptions`
	///
	/// The defaults are as follows:
	///
	/// ```rust,ignore
	/// ParseOptions {
	///     parsing_mode: ParsingMode::BestAttempt,
	///     fallback_charset: None,
	///     read_cover_art: true,
	/// }
	/// ```
	fn default() -> Self {
		Self::new()
	}
}

impl ParseOptions {
	/// Default parsing mode
	pub const DEFAULT_PARSING_MODE: ParsingMode = ParsingMode::BestAttempt;

	/// Creates a new `ParseOptions`, alias for `Default` implementation
	///
	/// See also: [`ParseOptions::default`]
	#[must_use]
	pub const fn new() -> Self {
		Self {
			parsing_mode: Self::DEFAULT_PARSING_MODE,
			fallback_charset: None,
			read_cover_art: true,
		}
	}

	/// The parsing mode to use, see [`ParsingMode`] for details
	pub fn parsing_mode(mut self, parsing_mode: ParsingMode) -> Self {
		self.parsing_mode = parsing_mode;
		self
	}

	/// A charset to decode marker-less and Latin-1-marked text with
	///
	/// Plenty of old tags were written in a local single-byte codepage and
	/// labeled as ISO-8859-1. When this is set, text carrying the Latin-1
	/// marker (and all ID3v1 text) is decoded with this charset instead of
	/// strict ISO-8859-1. URL frame content is exempt; the format defines it
	/// as ISO-8859-1 and it is decoded that way regardless.
	pub fn fallback_charset(mut self, fallback_charset: Option<Charset>) -> Self {
		self.fallback_charset = fallback_charset;
		self
	}

	/// Whether or not to read attached pictures
	pub fn read_cover_art(mut self, read_cover_art: bool) -> Self {
		self.read_cover_art = read_cover_art;
		self
	}
}
