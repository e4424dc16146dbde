//! Pre-flight check for degenerate files
//!
//! Some metadata libraries enter an unbounded loop when handed a file that is
//! nothing but zero bytes, and a zero-filled file is a classic symptom of a
//! failed download or a corrupted filesystem anyway. The check below runs
//! before any write path touches the file.

use crate::error::Result;

use std::io::{Read, Seek};

const CHUNK_SIZE: usize = 4096;

/// Whether the file content is degenerate (entirely zero-filled)
///
/// The file is read once, sequentially, in fixed-size chunks, each compared
/// against an all-zero buffer of the same length. The first chunk containing
/// any non-zero byte proves the file healthy and short-circuits the scan. An
/// empty file is not degenerate; there is nothing wrong with tagging a file
/// that happens to have no content yet.
///
/// This is read-only and has no side effects beyond the read position, which
/// is rewound before returning.
///
/// # Errors
///
/// * [`std::io::Error`]
pub fn is_degenerate<R>(reader: &mut R) -> Result<bool>
where
	R: Read + Seek,
{
	reader.rewind()?;

	let zeroes = [0u8; CHUNK_SIZE];
	let mut chunk = [0u8; CHUNK_SIZE];
	let mut read_anything = false;

	let degenerate = loop {
		let read = reader.read(&mut chunk)?;
		if read == 0 {
			break read_anything;
		}

		read_anything = true;

		if chunk[..read] != zeroes[..read] {
			break false;
		}
	};

	reader.rewind()?;
	Ok(degenerate)
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;

	#[test_log::test]
	fn all_zero_file_is_degenerate() {
		// Any length, aligned to the chunk size or not
		for len in [1, 100, 4096, 4097, 10_000] {
			let mut reader = Cursor::new(vec![0u8; len]);
			assert!(super::is_degenerate(&mut reader).unwrap(), "length {len}");
		}
	}

	#[test_log::test]
	fn empty_file_is_not_degenerate() {
		let mut reader = Cursor::new(Vec::<u8>::new());
		assert!(!super::is_degenerate(&mut reader).unwrap());
	}

	#[test_log::test]
	fn any_nonzero_byte_is_healthy() {
		let mut content = vec![0u8; 10_000];
		content[9_999] = 1;

		let mut reader = Cursor::new(content);
		assert!(!super::is_degenerate(&mut reader).unwrap());

		// Position must be restored for the next consumer
		assert_eq!(reader.position(), 0);
	}
}
