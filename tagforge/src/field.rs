//! Field-level text codec policy
//!
//! The encoding/decoding rules that sit between raw frame payloads and
//! [`Tag`](crate::tag::Tag) text: which encoding a field is written in given
//! the active [`EncodingOptions`], and how declared encodings, configured
//! fallbacks, and malformed payloads are handled on the way back in.

use crate::config::{EncodingOptions, ParseOptions, UnicodeEncoding};
use crate::util::charset;
use crate::util::text::{self, TextEncoding};

/// What kind of payload a field carries, for encoding purposes
///
/// URL-class fields are defined by the format as ISO-8859-1 with no encoding
/// marker. They bypass the configured policy entirely; this is a deliberate
/// exception, not an oversight.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum FieldClass {
	/// Ordinary encodable text
	Text,
	/// URL content (W-frames)
	Url,
}

/// Choose the on-disk encoding for one field's text
///
/// With Unicode disabled, the text is first tried against the single-byte
/// charset. If it fits losslessly it is written single-byte; if not, UTF-16
/// is forced regardless of the request. A tag must never silently lose
/// characters it could represent.
pub(crate) fn select_encoding(
	value: &str,
	class: FieldClass,
	options: EncodingOptions,
) -> TextEncoding {
	if class == FieldClass::Url {
		return TextEncoding::LegacyUnspecified;
	}

	if options.unicode {
		return match options.unicode_encoding {
			UnicodeEncoding::Utf16 => TextEncoding::Utf16,
			UnicodeEncoding::Utf8 => TextEncoding::Utf8,
		};
	}

	if charset::is_representable(value, options.iso_charset) {
		return TextEncoding::Latin1;
	}

	log::warn!(
		"Field text cannot be represented in {}, forcing UTF-16",
		options.iso_charset
	);
	TextEncoding::Utf16
}

/// Decode one field's payload into text
///
/// This never fails; a malformed payload degrades through the recovery path
/// below rather than poisoning the rest of the tag. Every recovery produces
/// exactly one log line.
pub(crate) fn decode_field(
	bytes: &[u8],
	declared: TextEncoding,
	class: FieldClass,
	options: ParseOptions,
) -> String {
	if class == FieldClass::Url {
		// Never routed through the fallback charset
		return finish(text::latin1_decode(bytes));
	}

	let decoded = match declared {
		TextEncoding::Latin1 | TextEncoding::LegacyUnspecified => {
			match options.fallback_charset {
				Some(fallback) => match charset::decode(bytes, fallback) {
					Ok(decoded) => Ok(decoded),
					Err(_) => {
						log::warn!(
							"Field is not valid {}, falling back to ISO-8859-1",
							fallback
						);
						Ok(text::latin1_decode(bytes))
					},
				},
				None => Ok(text::latin1_decode(bytes)),
			}
		},
		TextEncoding::Utf16 => match bytes.first_chunk::<2>() {
			Some([0xFE, 0xFF]) => text::utf16_decode_bytes(&bytes[2..], u16::from_be_bytes),
			Some([0xFF, 0xFE]) => text::utf16_decode_bytes(&bytes[2..], u16::from_le_bytes),
			// Tolerate encoders that never write a byte order mark; those
			// are big endian in practice.
			_ => text::utf16_decode_bytes(bytes, u16::from_be_bytes),
		},
		TextEncoding::Utf16Be => text::utf16_decode_bytes(bytes, u16::from_be_bytes),
		TextEncoding::Utf8 => text::utf8_decode(bytes.to_vec()),
	};

	match decoded {
		Ok(decoded) => finish(decoded),
		Err(_) => finish(recover(bytes, declared)),
	}
}

/// Last-resort decoding for a payload that failed its declared encoding
///
/// The same best-effort heuristic used for undecodable filenames: take the
/// bytes as UTF-8 if they happen to validate, otherwise substitute
/// replacement characters. One log line per attempt, success or not.
fn recover(bytes: &[u8], declared: TextEncoding) -> String {
	match std::str::from_utf8(bytes) {
		Ok(valid) => {
			log::info!(
				"Field declared as {:?} was not decodable, recovered as UTF-8",
				declared
			);
			valid.to_owned()
		},
		Err(_) => {
			log::error!(
				"Field declared as {:?} was not decodable in any attempted encoding, \
				 recovering with replacement characters",
				declared
			);
			String::from_utf8_lossy(bytes).into_owned()
		},
	}
}

fn finish(mut decoded: String) -> String {
	text::trim_end_nulls(&mut decoded);
	text::truncate_field(decoded)
}

/// Encode one field for the single-byte (ID3v1 / forced-ISO) path
///
/// Routes through the configured conflict policy rather than hard-failing.
///
/// # Errors
///
/// * The policy is [`ConflictPolicy::Reject`](charset::ConflictPolicy::Reject)
///   and a character cannot be represented
pub(crate) fn encode_single_byte(
	value: &str,
	options: EncodingOptions,
) -> crate::error::Result<Vec<u8>> {
	charset::encode(value, options.iso_charset, options.on_conflict)
}

#[cfg(test)]
mod tests {
	use super::FieldClass;
	use crate::config::{EncodingOptions, ParseOptions, UnicodeEncoding};
	use crate::util::charset::Charset;
	use crate::util::text::TextEncoding;

	#[test_log::test]
	fn unicode_off_downgrades_when_lossless() {
		let options = EncodingOptions::new().unicode(false);

		let encoding = super::select_encoding("plain ascii", FieldClass::Text, options);
		assert_eq!(encoding, TextEncoding::Latin1);
	}

	#[test_log::test]
	fn unicode_off_forces_utf16_when_lossy() {
		let options = EncodingOptions::new().unicode(false);

		let encoding = super::select_encoding("\u{4E16}\u{754C}", FieldClass::Text, options);
		assert_eq!(encoding, TextEncoding::Utf16);
	}

	#[test_log::test]
	fn urls_ignore_the_policy() {
		let options = EncodingOptions::new()
			.unicode(true)
			.unicode_encoding(UnicodeEncoding::Utf8);

		let encoding = super::select_encoding("https://example.com", FieldClass::Url, options);
		assert_eq!(encoding, TextEncoding::LegacyUnspecified);
	}

	#[test_log::test]
	fn invalid_utf8_recovers() {
		let bytes = [0x61, 0xFF, 0x62];

		let decoded = super::decode_field(
			&bytes,
			TextEncoding::Utf8,
			FieldClass::Text,
			ParseOptions::new(),
		);
		assert_eq!(decoded, "a\u{FFFD}b");
	}

	#[test_log::test]
	fn fallback_charset_applies_to_latin1_marker() {
		// "AB" encoded as UTF-16BE, declared Latin-1; a caller-configured
		// fallback charset overrides the strict interpretation
		let bytes = [0x00, 0x41, 0x00, 0x42];

		let options = ParseOptions::new().fallback_charset(Some(Charset::Utf16Be));
		let decoded = super::decode_field(&bytes, TextEncoding::Latin1, FieldClass::Text, options);
		assert_eq!(decoded, "AB");

		// URL fields are exempt from the fallback
		let url_bytes = b"http://x";
		let decoded =
			super::decode_field(url_bytes, TextEncoding::LegacyUnspecified, FieldClass::Url, options);
		assert_eq!(decoded, "http://x");
	}
}
