use tagforge::config::{EncodingOptions, ParseOptions, WriteOptions};
use tagforge::tag::{Picture, PictureType, Tag};
use tagforge::{WriteFailure, WriteOutcome};

use std::io::{Cursor, Read, Seek, Write};

fn audio_stub() -> Cursor<Vec<u8>> {
	// A fake MPEG stream; the codec never inspects audio data
	let mut content = vec![0xFF, 0xFB, 0x90, 0x44];
	content.extend_from_slice(&[0xAA; 400]);
	Cursor::new(content)
}

fn filled_tag() -> Tag {
	let mut tag = Tag::new();
	tag.set_title("Foo title");
	tag.set_artist("Bar artist");
	tag.set_album("Baz album");
	tag.set_album_artist("Quux artist");
	tag.set_year("1984");
	tag.set_track("1");
	tag.set_track_total("12");
	tag.set_disc_number("1");
	tag.set_genre("Classical");
	tag.set_comment("Qux comment");
	tag.set_composer("Arvo");
	tag.set_orig_artist("Someone Else");
	tag.set_copyright("2084 Qux Records");
	tag.set_url("http://example.com/foo");
	tag.set_encoded_by("tagforge");
	tag
}

#[test_log::test]
fn round_trip_iso_fields() {
	let mut file = audio_stub();
	let tag = filled_tag();

	// Everything in `filled_tag` is ISO-8859-1 representable, so a
	// non-Unicode write must reproduce the tag exactly
	let report = tagforge::save_to(
		&mut file,
		&tag,
		WriteOptions::new(),
		EncodingOptions::new().unicode(false),
	);
	assert_eq!(report.v1, WriteOutcome::Written);
	assert_eq!(report.v2, WriteOutcome::Written);

	let read_back = tagforge::read_from(&mut file, ParseOptions::new()).unwrap();
	assert_eq!(read_back, tag);
}

#[test_log::test]
fn round_trip_unicode_fields() {
	let mut file = audio_stub();

	let mut tag = Tag::new();
	tag.set_title("\u{30bf}\u{30a4}\u{30c8}\u{30eb}");
	tag.set_artist("Bj\u{00f6}rk");

	let report = tagforge::save_to(&mut file, &tag, WriteOptions::new(), EncodingOptions::new());
	assert!(report.is_success());

	let read_back = tagforge::read_from(&mut file, ParseOptions::new()).unwrap();
	assert_eq!(read_back.title(), tag.title());
	assert_eq!(read_back.artist(), tag.artist());
}

#[test_log::test]
fn unicode_off_forces_utf16_for_unrepresentable_text() {
	let mut file = audio_stub();

	let mut tag = Tag::new();
	tag.set_title("\u{4E16}\u{754C}");

	let report = tagforge::save_to(
		&mut file,
		&tag,
		WriteOptions::new(),
		EncodingOptions::new().unicode(false),
	);
	assert!(report.is_success());

	// The TIT2 frame must carry the UTF-16 marker (0x01), not Latin-1
	let content = file.get_ref();
	let frame_pos = content
		.windows(4)
		.position(|window| window == b"TIT2")
		.expect("expected a TIT2 frame");
	assert_eq!(content[frame_pos + 10], 0x01);

	// And nothing was mangled along the way
	let read_back = tagforge::read_from(&mut file, ParseOptions::new()).unwrap();
	assert_eq!(read_back.title(), tag.title());
}

#[test_log::test]
fn strip_when_empty_strips_both_versions() {
	let mut file = audio_stub();

	// Put both versions in place first
	let report = tagforge::save_to(
		&mut file,
		&filled_tag(),
		WriteOptions::new(),
		EncodingOptions::new(),
	);
	assert!(report.is_success());

	// Both write switches are on, but the empty tag must win
	let report = tagforge::save_to(
		&mut file,
		&Tag::new(),
		WriteOptions::new().write_id3v1(true).write_id3v2(true),
		EncodingOptions::new(),
	);
	assert_eq!(report.v1, WriteOutcome::Stripped);
	assert_eq!(report.v2, WriteOutcome::Stripped);

	let content = file.get_ref();
	assert_ne!(&content[..3], b"ID3");
	assert!(content.len() < 132 || &content[content.len() - 128..][..3] != b"TAG");

	let read_back = tagforge::read_from(&mut file, ParseOptions::new()).unwrap();
	assert!(read_back.is_empty());
}

#[test_log::test]
fn version_write_switches_are_independent() {
	let mut file = audio_stub();

	let report = tagforge::save_to(
		&mut file,
		&filled_tag(),
		WriteOptions::new().write_id3v1(false),
		EncodingOptions::new(),
	);
	assert_eq!(report.v1, WriteOutcome::Stripped);
	assert_eq!(report.v2, WriteOutcome::Written);

	let content = file.get_ref();
	assert_eq!(&content[..3], b"ID3");
	assert!(&content[content.len() - 128..][..3] != b"TAG");
}

#[test_log::test]
fn v2_failure_does_not_discard_v1_result() {
	let mut file = audio_stub();

	// The URL field always takes the single-byte path; a URL outside
	// ISO-8859-1 under the reject policy fails the ID3v2 commit. ID3v1 has
	// no URL slot, so its commit proceeds.
	let mut tag = Tag::new();
	tag.set_title("Foo title");
	tag.set_url("http://example.com/\u{2192}");

	let report = tagforge::save_to(
		&mut file,
		&tag,
		WriteOptions::new(),
		EncodingOptions::new()
			.unicode(false)
			.on_conflict(tagforge::util::charset::ConflictPolicy::Reject),
	);

	assert_eq!(report.v1, WriteOutcome::Written);
	assert!(matches!(report.v2, WriteOutcome::Failed(WriteFailure::Tag(_))));
	assert!(!report.is_success());

	// v1 must really be there
	let read_back = tagforge::read_from(&mut file, ParseOptions::new()).unwrap();
	assert_eq!(read_back.title(), Some("Foo title"));
}

#[test_log::test]
fn degenerate_file_is_rejected_untouched() {
	for len in [64usize, 4096, 5000] {
		let mut file = Cursor::new(vec![0u8; len]);

		let report = tagforge::save_to(
			&mut file,
			&filled_tag(),
			WriteOptions::new(),
			EncodingOptions::new(),
		);

		assert_eq!(
			report.v1,
			WriteOutcome::Failed(WriteFailure::CorruptFile),
			"length {len}"
		);
		assert_eq!(report.v2, WriteOutcome::Failed(WriteFailure::CorruptFile));

		// Not a single byte may have changed
		assert_eq!(file.get_ref(), &vec![0u8; len]);
	}
}

#[test_log::test]
fn foreign_tags_are_removed_on_write() {
	let mut file = audio_stub();

	// Write v1 + v2 first so the APE tag ends up between audio and the trailer
	let report = tagforge::save_to(
		&mut file,
		&filled_tag(),
		WriteOptions::new(),
		EncodingOptions::new(),
	);
	assert!(report.is_success());

	// Splice a minimal APE tag (footer only, no items) in front of the trailer
	let mut ape_footer = Vec::new();
	ape_footer.extend_from_slice(b"APETAGEX");
	ape_footer.extend_from_slice(&2000u32.to_le_bytes()); // version
	ape_footer.extend_from_slice(&32u32.to_le_bytes()); // size: footer only
	ape_footer.extend_from_slice(&0u32.to_le_bytes()); // item count
	ape_footer.extend_from_slice(&0u32.to_le_bytes()); // flags
	ape_footer.extend_from_slice(&[0u8; 8]); // reserved

	let content = file.get_mut();
	let insert_at = content.len() - 128;
	content.splice(insert_at..insert_at, ape_footer);

	let report = tagforge::save_to(
		&mut file,
		&filled_tag(),
		WriteOptions::new(),
		EncodingOptions::new(),
	);
	assert!(report.is_success());

	let content = file.get_ref();
	assert!(
		!content.windows(8).any(|window| window == b"APETAGEX"),
		"APE tag should have been removed"
	);

	// The trailer is still the last 128 bytes
	assert_eq!(&content[content.len() - 128..][..3], b"TAG");
}

#[test_log::test]
fn unknown_frames_survive_a_rewrite() {
	// A hand-built ID3v2.4 tag holding a single TXXX frame, which is outside
	// this crate's vocabulary and must be carried through rewrites
	let frame_content = b"\x00my description\x00my value";
	let mut tag_bytes = Vec::new();
	tag_bytes.extend_from_slice(&[b'I', b'D', b'3', 4, 0, 0]);
	tag_bytes.extend_from_slice(&[0, 0, 0, (10 + frame_content.len()) as u8]);
	tag_bytes.extend_from_slice(b"TXXX");
	tag_bytes.extend_from_slice(&[0, 0, 0, frame_content.len() as u8]);
	tag_bytes.extend_from_slice(&[0, 0]);
	tag_bytes.extend_from_slice(frame_content);

	let mut content = tag_bytes;
	content.extend_from_slice(&audio_stub().into_inner());
	let mut file = Cursor::new(content);

	let report = tagforge::save_to(
		&mut file,
		&filled_tag(),
		WriteOptions::new(),
		EncodingOptions::new(),
	);
	assert!(report.is_success());

	let content = file.get_ref();
	assert!(
		content.windows(4).any(|window| window == b"TXXX"),
		"the TXXX frame should have been preserved"
	);
	assert!(
		content.windows(14).any(|window| window == b"my description"),
		"the TXXX content should have been preserved"
	);

	// And the rewritten tag must not duplicate the known frames
	let title_frames = content
		.windows(4)
		.filter(|window| window == b"TIT2")
		.count();
	assert_eq!(title_frames, 1);

	let read_back = tagforge::read_from(&mut file, ParseOptions::new()).unwrap();
	assert_eq!(read_back.title(), Some("Foo title"));
}

#[test_log::test]
fn pictures_round_trip() {
	let mut file = audio_stub();

	let mut tag = Tag::new();
	tag.set_title("With art");
	tag.push_picture(Picture::new(
		PictureType::CoverFront,
		Some(tagforge::tag::MimeType::Png),
		Some(String::from("front")),
		vec![0x89, b'P', b'N', b'G', 0, 1, 2, 3],
	));
	tag.push_picture(Picture::new(
		PictureType::CoverBack,
		Some(tagforge::tag::MimeType::Jpeg),
		None,
		vec![0xFF, 0xD8, 9, 9],
	));

	let report = tagforge::save_to(&mut file, &tag, WriteOptions::new(), EncodingOptions::new());
	assert!(report.is_success());

	let read_back = tagforge::read_from(&mut file, ParseOptions::new()).unwrap();
	assert_eq!(read_back.pictures().len(), 2);
	assert_eq!(read_back.pictures()[0].description.as_deref(), Some("front"));
	assert_eq!(read_back.pictures()[1].pic_type, PictureType::CoverBack);
	assert_eq!(read_back.pictures()[1].data, vec![0xFF, 0xD8, 9, 9]);
}

#[test_log::test]
fn id3v23_output_re_reads() {
	let mut file = audio_stub();
	let tag = filled_tag();

	let report = tagforge::save_to(
		&mut file,
		&tag,
		WriteOptions::new().use_id3v23(true),
		EncodingOptions::new(),
	);
	assert!(report.is_success());

	// Version byte in the tag header
	assert_eq!(file.get_ref()[3], 3);

	let read_back = tagforge::read_from(&mut file, ParseOptions::new()).unwrap();
	assert_eq!(read_back.title(), tag.title());
	assert_eq!(read_back.year(), tag.year());
	assert_eq!(read_back.track_total(), tag.track_total());
}

#[test_log::test]
fn save_to_file_on_disk() {
	let mut temp_file = tempfile::tempfile().unwrap();
	temp_file.write_all(&audio_stub().into_inner()).unwrap();
	temp_file.rewind().unwrap();

	let tag = filled_tag();
	let report = tagforge::save_to(
		&mut temp_file,
		&tag,
		WriteOptions::new(),
		EncodingOptions::new(),
	);
	assert!(report.is_success());

	temp_file.rewind().unwrap();
	let read_back = tagforge::read_from(&mut temp_file, ParseOptions::new()).unwrap();
	assert_eq!(read_back, tag);

	// The audio data must still be at the tail, in front of the trailer
	temp_file.rewind().unwrap();
	let mut content = Vec::new();
	temp_file.read_to_end(&mut content).unwrap();
	let audio = audio_stub().into_inner();
	let audio_start = content.len() - 128 - audio.len();
	assert_eq!(&content[audio_start..content.len() - 128], &audio[..]);
}

#[test_log::test]
fn not_writable_reports_both_versions() {
	let temp_dir = tempfile::tempdir().unwrap();
	let path = temp_dir.path().join("missing").join("file.mp3");

	let report = tagforge::save_to_path(
		&path,
		&filled_tag(),
		WriteOptions::new(),
		EncodingOptions::new(),
	);

	assert_eq!(report.v1, WriteOutcome::Failed(WriteFailure::NotWritable));
	assert_eq!(report.v2, WriteOutcome::Failed(WriteFailure::NotWritable));
}
