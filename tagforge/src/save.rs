//! Writing and reading both tag versions as one operation
//!
//! The write path is the state machine that decides, per tag version,
//! whether to write, update, or strip, and reports an independent outcome
//! for each. Failures are data, not panics: a batch caller must be able to
//! continue past a file that refuses to cooperate.

use crate::config::{EncodingOptions, ParseOptions, WriteOptions};
use crate::error::{ErrorKind, Result, TagError};
use crate::guard;
use crate::id3::v1::Id3v1Tag;
use crate::id3::v1::write::write_id3v1;
use crate::id3::v2::Id3v2Tag;
use crate::id3::v2::read::parse_id3v2;
use crate::id3::v2::write::write_id3v2;
use crate::id3::{FindId3v2Config, ID3FindResults, find_ape, find_id3v1, find_id3v2, find_lyrics3v2};
use crate::tag::Tag;
use crate::util::io::{FileLike, Length, Truncate};

use std::fmt::{Display, Formatter};
use std::fs::OpenOptions;
use std::io::{Cursor, Seek, SeekFrom, Write};
use std::path::Path;

/// Why a tag version could not be committed
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WriteFailure {
	/// The pre-flight check rejected the file; nothing was mutated
	CorruptFile,
	/// The file could not be opened for update; nothing was mutated
	NotWritable,
	/// A structural error, carrying the underlying error message
	Tag(String),
}

impl Display for WriteFailure {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::CorruptFile => write!(f, "file content is degenerate"),
			Self::NotWritable => write!(f, "file could not be opened for update"),
			Self::Tag(message) => write!(f, "{message}"),
		}
	}
}

/// The result of committing one tag version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
	/// The version was written or updated
	Written,
	/// The version was removed (or was already absent)
	Stripped,
	/// The version could not be committed; the sibling version was still attempted
	Failed(WriteFailure),
}

impl WriteOutcome {
	/// Whether this outcome is a failure
	pub fn is_failed(&self) -> bool {
		matches!(self, Self::Failed(_))
	}
}

/// The per-version outcomes of one [`save_to`] call
///
/// The two fields are fully independent: a failure on one version never
/// prevents the other from being attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagWriteReport {
	/// Outcome for the ID3v1 trailer
	pub v1: WriteOutcome,
	/// Outcome for the ID3v2 tag
	pub v2: WriteOutcome,
}

impl TagWriteReport {
	fn both(outcome: WriteOutcome) -> Self {
		Self {
			v1: outcome.clone(),
			v2: outcome,
		}
	}

	/// Whether neither version failed
	pub fn is_success(&self) -> bool {
		!self.v1.is_failed() && !self.v2.is_failed()
	}
}

/// Commit `tag` to `file`, returning independent outcomes for both versions
///
/// The sequence is fixed:
///
/// 1. The degenerate-file guard runs before anything is mutated.
/// 2. The ID3v2 tag is written, updated, or stripped at the head.
/// 3. Foreign tag formats (APE, Lyrics3v2) are removed from the tail,
///    regardless of how steps 2 and 4 fare.
/// 4. The ID3v1 trailer is finalized **last**. The head splice in step 2
///    shifts every byte after it, so committing the trailer any earlier
///    would corrupt it.
///
/// The two commits are separate file operations; a crash between them can
/// leave one version updated and the other not.
///
/// Calls are independent and reentrant for distinct files. No locking is
/// done here; concurrent saves against the *same* file must be serialized
/// by the caller.
pub fn save_to<F>(
	file: &mut F,
	tag: &Tag,
	write_options: WriteOptions,
	encoding_options: EncodingOptions,
) -> TagWriteReport
where
	F: FileLike,
	TagError: From<<F as Truncate>::Error>,
	TagError: From<<F as Length>::Error>,
{
	match guard::is_degenerate(file) {
		Ok(false) => {},
		Ok(true) => {
			log::warn!("File is entirely zero-filled, refusing to write");
			return TagWriteReport::both(WriteOutcome::Failed(WriteFailure::CorruptFile));
		},
		Err(err) => {
			log::error!("Pre-flight read failed: {err}");
			return TagWriteReport::both(WriteOutcome::Failed(WriteFailure::Tag(err.to_string())));
		},
	}

	let strip_all = write_options.strip_empty_tags && tag.is_empty();

	// The ID3v2 tag lives at the head of the file and is committed first;
	// see the ordering note above.
	let v2 = if strip_all || !write_options.write_id3v2 {
		strip_v2(file, write_options, encoding_options)
	} else {
		commit_v2(file, tag, write_options, encoding_options)
	};

	// Foreign tag formats are cleared on every write, even when a version
	// commit failed.
	if let Err(err) = strip_foreign_tags(file) {
		log::warn!("Failed to remove foreign tags: {err}");
	}

	let v1 = if strip_all || !write_options.write_id3v1 {
		strip_v1(file, write_options, encoding_options)
	} else {
		commit_v1(file, tag, write_options, encoding_options)
	};

	TagWriteReport { v1, v2 }
}

/// Commit `tag` to the file at `path`
///
/// See [`save_to`]. A file that cannot be opened for update reports
/// [`WriteFailure::NotWritable`] for both versions without being touched.
pub fn save_to_path<P: AsRef<Path>>(
	path: P,
	tag: &Tag,
	write_options: WriteOptions,
	encoding_options: EncodingOptions,
) -> TagWriteReport {
	let mut file = match OpenOptions::new().read(true).write(true).open(path) {
		Ok(file) => file,
		Err(err) => {
			log::warn!("Cannot open file for update: {err}");
			return TagWriteReport::both(WriteOutcome::Failed(WriteFailure::NotWritable));
		},
	};

	save_to(&mut file, tag, write_options, encoding_options)
}

/// Read both tag versions from `reader` into a single [`Tag`]
///
/// When both versions are present, ID3v2 wins per field and ID3v1 fills
/// whatever it left empty. A malformed ID3v2 tag is logged and skipped
/// rather than failing the whole read.
///
/// # Errors
///
/// * [`std::io::Error`]
/// * [`ParsingMode::Strict`](crate::config::ParsingMode::Strict) and a tag is malformed
pub fn read_from<R>(reader: &mut R, parse_options: ParseOptions) -> Result<Tag>
where
	R: std::io::Read + Seek,
{
	let mut tag = Tag::new();

	reader.rewind()?;
	match find_id3v2(reader, FindId3v2Config::READ_TAG) {
		Ok(ID3FindResults(Some(header), Some(bytes))) => {
			match parse_id3v2(&mut Cursor::new(bytes), header, parse_options) {
				Ok(id3v2) => id3v2.merge_into(&mut tag),
				Err(err) => {
					if parse_options.parsing_mode == crate::config::ParsingMode::Strict {
						return Err(err);
					}
					log::warn!("Failed to parse the ID3v2 tag, skipping: {err}");
				},
			}
		},
		Ok(_) => {},
		Err(err) => {
			if parse_options.parsing_mode == crate::config::ParsingMode::Strict {
				return Err(err);
			}
			log::warn!("Failed to read the ID3v2 tag, skipping: {err}");
		},
	}

	let ID3FindResults(_, id3v1) = find_id3v1(reader, true, parse_options)?;
	if let Some(id3v1) = id3v1 {
		id3v1.merge_into(&mut tag);
	}

	Ok(tag)
}

/// Read both tag versions from the file at `path`
///
/// See [`read_from`].
///
/// # Errors
///
/// * The file cannot be opened
/// * See [`read_from`]
pub fn read_from_path<P: AsRef<Path>>(path: P, parse_options: ParseOptions) -> Result<Tag> {
	let mut file = std::fs::File::open(path)?;
	read_from(&mut file, parse_options)
}

fn commit_v2<F>(
	file: &mut F,
	tag: &Tag,
	write_options: WriteOptions,
	encoding_options: EncodingOptions,
) -> WriteOutcome
where
	F: FileLike,
	TagError: From<<F as Truncate>::Error>,
	TagError: From<<F as Length>::Error>,
{
	let mut id3v2 = Id3v2Tag::from_tag(tag, write_options, encoding_options);

	// Opaque frames from an existing tag survive the rewrite
	match read_existing_v2(file) {
		Ok(Some(existing)) => id3v2.adopt_binary_frames(existing),
		Ok(None) => {},
		Err(err) => {
			log::warn!("Existing ID3v2 tag is unreadable, not preserving its frames: {err}");
		},
	}

	let stripped = id3v2.is_empty();

	if let Err(err) = rewind_and(file, |file| {
		write_id3v2(file, &id3v2, write_options, encoding_options)
	}) {
		log::error!("ID3v2 update failed: {err}");
		return WriteOutcome::Failed(WriteFailure::Tag(err.to_string()));
	}

	if stripped {
		WriteOutcome::Stripped
	} else {
		WriteOutcome::Written
	}
}

fn strip_v2<F>(
	file: &mut F,
	write_options: WriteOptions,
	encoding_options: EncodingOptions,
) -> WriteOutcome
where
	F: FileLike,
	TagError: From<<F as Truncate>::Error>,
	TagError: From<<F as Length>::Error>,
{
	if let Err(err) = rewind_and(file, |file| {
		write_id3v2(file, &Id3v2Tag::new(), write_options, encoding_options)
	}) {
		log::error!("ID3v2 strip failed: {err}");
		return WriteOutcome::Failed(WriteFailure::Tag(err.to_string()));
	}

	WriteOutcome::Stripped
}

fn commit_v1<F>(
	file: &mut F,
	tag: &Tag,
	write_options: WriteOptions,
	encoding_options: EncodingOptions,
) -> WriteOutcome
where
	F: FileLike,
	TagError: From<<F as Truncate>::Error>,
	TagError: From<<F as Length>::Error>,
{
	let id3v1 = Id3v1Tag::from_tag(tag);
	let stripped = id3v1.is_empty();

	if let Err(err) = rewind_and(file, |file| {
		write_id3v1(file, &id3v1, write_options, encoding_options)
	}) {
		log::error!("ID3v1 update failed: {err}");
		return WriteOutcome::Failed(WriteFailure::Tag(err.to_string()));
	}

	if stripped {
		WriteOutcome::Stripped
	} else {
		WriteOutcome::Written
	}
}

fn strip_v1<F>(
	file: &mut F,
	write_options: WriteOptions,
	encoding_options: EncodingOptions,
) -> WriteOutcome
where
	F: FileLike,
	TagError: From<<F as Truncate>::Error>,
	TagError: From<<F as Length>::Error>,
{
	if let Err(err) = rewind_and(file, |file| {
		write_id3v1(file, &Id3v1Tag::new(), write_options, encoding_options)
	}) {
		log::error!("ID3v1 strip failed: {err}");
		return WriteOutcome::Failed(WriteFailure::Tag(err.to_string()));
	}

	WriteOutcome::Stripped
}

fn read_existing_v2<F>(file: &mut F) -> Result<Option<Id3v2Tag>>
where
	F: FileLike,
	TagError: From<<F as Truncate>::Error>,
	TagError: From<<F as Length>::Error>,
{
	file.rewind()?;
	let ID3FindResults(header, bytes) = find_id3v2(file, FindId3v2Config::READ_TAG)?;

	let (Some(header), Some(bytes)) = (header, bytes) else {
		return Ok(None);
	};

	parse_id3v2(&mut Cursor::new(bytes), header, ParseOptions::default()).map(Some)
}

fn rewind_and<F, T>(file: &mut F, op: impl FnOnce(&mut F) -> Result<T>) -> Result<T>
where
	F: FileLike,
	TagError: From<<F as Truncate>::Error>,
	TagError: From<<F as Length>::Error>,
{
	file.rewind()?;
	op(file)
}

/// Remove any APE or Lyrics3v2 tags from the tail of the file
///
/// Neither format is supported here, and leaving one behind means two
/// different metadata sources disagreeing about the same file. An existing
/// ID3v1 trailer is preserved across the removal.
fn strip_foreign_tags<F>(file: &mut F) -> Result<()>
where
	F: FileLike,
	TagError: From<<F as Truncate>::Error>,
	TagError: From<<F as Length>::Error>,
{
	loop {
		let file_len = file.len()?;

		file.rewind()?;
		let ID3FindResults(v1_header, _) = find_id3v1(file, false, ParseOptions::default())?;
		let v1_len: u64 = if v1_header.is_some() { 128 } else { 0 };

		let tail = file_len - v1_len;
		let mut removed = false;

		if tail >= 15 {
			file.seek(SeekFrom::Start(tail))?;
			if let ID3FindResults(Some(()), size) = find_lyrics3v2(file)? {
				if u64::from(size) > tail {
					return Err(TagError::new(ErrorKind::SizeMismatch));
				}

				log::debug!("Removing a Lyrics3v2 tag of {size} bytes");
				remove_tail_region(file, tail - u64::from(size), u64::from(size), v1_len)?;
				removed = true;
			}
		}

		if !removed && tail >= 32 {
			file.seek(SeekFrom::Start(tail))?;
			if let ID3FindResults(Some(()), size) = find_ape(file)? {
				if u64::from(size) > tail {
					return Err(TagError::new(ErrorKind::SizeMismatch));
				}

				log::debug!("Removing an APE tag of {size} bytes");
				remove_tail_region(file, tail - u64::from(size), u64::from(size), v1_len)?;
				removed = true;
			}
		}

		if !removed {
			return Ok(());
		}
	}
}

/// Cut `[start, start + len)` out of the file, keeping a trailing ID3v1 tag
fn remove_tail_region<F>(file: &mut F, start: u64, len: u64, v1_len: u64) -> Result<()>
where
	F: FileLike,
	TagError: From<<F as Truncate>::Error>,
	TagError: From<<F as Length>::Error>,
{
	let mut trailer = vec![0u8; v1_len as usize];

	if v1_len > 0 {
		file.seek(SeekFrom::Start(start + len))?;
		std::io::Read::read_exact(file, &mut trailer)?;
	}

	file.truncate(start)?;

	if v1_len > 0 {
		file.seek(SeekFrom::End(0))?;
		file.write_all(&trailer)?;
	}

	Ok(())
}
