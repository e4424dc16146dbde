//! The fixed ID3v1 genre table
//!
//! ID3v1 stores the genre as a single byte index into a predefined table.
//! The original specification defined 80 entries; Winamp extended the list
//! twice, ending at index 191. The same indices appear inside ID3v2 `TCON`
//! frames, so the table is shared by both versions.

/// The largest index with a named entry in [`GENRES`]
pub const GENRE_MAX: u8 = 191;

/// The "no genre" sentinel written to ID3v1 tags with no genre set
pub const GENRE_INVALID: u8 = 255;

/// The name returned for defined-but-unnamed slots between
/// [`GENRE_MAX`] and [`GENRE_INVALID`]
pub const GENRE_UNKNOWN: &str = "Unknown";

/// The ID3v1 genre list
pub static GENRES: [&str; 192] = [
	"Blues",
	"Classic Rock",
	"Country",
	"Dance",
	"Disco",
	"Funk",
	"Grunge",
	"Hip-Hop",
	"Jazz",
	"Metal",
	"New Age",
	"Oldies",
	"Other",
	"Pop",
	"R&B",
	"Rap",
	"Reggae",
	"Rock",
	"Techno",
	"Industrial",
	"Alternative",
	"Ska",
	"Death Metal",
	"Pranks",
	"Soundtrack",
	"Euro-Techno",
	"Ambient",
	"Trip-Hop",
	"Vocal",
	"Jazz+Funk",
	"Fusion",
	"Trance",
	"Classical",
	"Instrumental",
	"Acid",
	"House",
	"Game",
	"Sound Clip",
	"Gospel",
	"Noise",
	"AlternRock",
	"Bass",
	"Soul",
	"Punk",
	"Space",
	"Meditative",
	"Instrumental Pop",
	"Instrumental Rock",
	"Ethnic",
	"Gothic",
	"Darkwave",
	"Techno-Industrial",
	"Electronic",
	"Pop-Folk",
	"Eurodance",
	"Dream",
	"Southern Rock",
	"Comedy",
	"Cult",
	"Gangsta",
	"Top 40",
	"Christian Rap",
	"Pop/Funk",
	"Jungle",
	"Native American",
	"Cabaret",
	"New Wave",
	"Psychadelic",
	"Rave",
	"Showtunes",
	"Trailer",
	"Lo-Fi",
	"Tribal",
	"Acid Punk",
	"Acid Jazz",
	"Polka",
	"Retro",
	"Musical",
	"Rock & Roll",
	"Hard Rock",
	"Folk",
	"Folk-Rock",
	"National Folk",
	"Swing",
	"Fast Fusion",
	"Bebob",
	"Latin",
	"Revival",
	"Celtic",
	"Bluegrass",
	"Avantgarde",
	"Gothic Rock",
	"Progressive Rock",
	"Psychedelic Rock",
	"Symphonic Rock",
	"Slow Rock",
	"Big Band",
	"Chorus",
	"Easy Listening",
	"Acoustic",
	"Humour",
	"Speech",
	"Chanson",
	"Opera",
	"Chamber Music",
	"Sonata",
	"Symphony",
	"Booty Bass",
	"Primus",
	"Porn Groove",
	"Satire",
	"Slow Jam",
	"Club",
	"Tango",
	"Samba",
	"Folklore",
	"Ballad",
	"Power Ballad",
	"Rhythmic Soul",
	"Freestyle",
	"Duet",
	"Punk Rock",
	"Drum Solo",
	"A Cappella",
	"Euro-House",
	"Dance Hall",
	"Goa",
	"Drum & Bass",
	"Club-House",
	"Hardcore",
	"Terror",
	"Indie",
	"BritPop",
	"Negerpunk",
	"Polsk Punk",
	"Beat",
	"Christian Gangsta Rap",
	"Heavy Metal",
	"Black Metal",
	"Crossover",
	"Contemporary Christian",
	"Christian Rock",
	"Merengue",
	"Salsa",
	"Thrash Metal",
	"Anime",
	"JPop",
	"Synthpop",
	"Abstract",
	"Art Rock",
	"Baroque",
	"Bhangra",
	"Big Beat",
	"Breakbeat",
	"Chillout",
	"Downtempo",
	"Dub",
	"EBM",
	"Eclectic",
	"Electro",
	"Electroclash",
	"Emo",
	"Experimental",
	"Garage",
	"Global",
	"IDM",
	"Illbient",
	"Industro-Goth",
	"Jam Band",
	"Krautrock",
	"Leftfield",
	"Lounge",
	"Math Rock",
	"New Romantic",
	"Nu-Breakz",
	"Post-Punk",
	"Post-Rock",
	"Psytrance",
	"Shoegaze",
	"Space Rock",
	"Trop Rock",
	"World Music",
	"Neoclassical",
	"Audiobook",
	"Audio Theatre",
	"Neue Deutsche Welle",
	"Podcast",
	"Indie Rock",
	"G-Funk",
	"Dubstep",
	"Garage Rock",
	"Psybient",
];

/// The genre name for an index
///
/// Indices follow a three-state convention that must hold exactly:
///
/// * `0..=191` — the named table entry
/// * `192..=254` — a defined but unnamed slot, [`GENRE_UNKNOWN`]
/// * `255` — no genre at all, the empty string
///
/// # Examples
///
/// ```rust
/// use tagforge::genre;
///
/// assert_eq!(genre::name_for_index(0), "Blues");
/// assert_eq!(genre::name_for_index(192), "Unknown");
/// assert_eq!(genre::name_for_index(255), "");
/// ```
pub fn name_for_index(index: u8) -> &'static str {
	match index {
		i if i <= GENRE_MAX => GENRES[usize::from(i)],
		GENRE_INVALID => "",
		_ => GENRE_UNKNOWN,
	}
}

/// The index for a genre name, or [`GENRE_INVALID`] if the name is not in the table
///
/// Matching is case-insensitive but otherwise exact; there is no partial or
/// fuzzy matching.
///
/// # Examples
///
/// ```rust
/// use tagforge::genre;
///
/// assert_eq!(genre::index_for_name("Classical"), 32);
/// assert_eq!(genre::index_for_name("cLaSsIcAl"), 32);
/// assert_eq!(genre::index_for_name("Not A Genre"), genre::GENRE_INVALID);
/// ```
pub fn index_for_name(name: &str) -> u8 {
	for (i, genre) in GENRES.iter().enumerate() {
		if genre.eq_ignore_ascii_case(name) {
			return i as u8;
		}
	}

	GENRE_INVALID
}

#[cfg(test)]
mod tests {
	use super::{GENRE_INVALID, GENRE_MAX, GENRE_UNKNOWN};

	#[test_log::test]
	fn name_boundaries() {
		for i in 0..=GENRE_MAX {
			assert_ne!(super::name_for_index(i), GENRE_UNKNOWN);
			assert!(!super::name_for_index(i).is_empty());
		}

		// 191 is the last real entry, 192 is the first unnamed slot
		assert_eq!(super::name_for_index(GENRE_MAX), "Psybient");
		assert_eq!(super::name_for_index(GENRE_MAX + 1), GENRE_UNKNOWN);

		for i in (GENRE_MAX + 1)..GENRE_INVALID {
			assert_eq!(super::name_for_index(i), GENRE_UNKNOWN);
		}

		assert_eq!(super::name_for_index(GENRE_INVALID), "");
	}

	#[test_log::test]
	fn index_lookup() {
		assert_eq!(super::index_for_name("Blues"), 0);
		assert_eq!(super::index_for_name("hard rock"), 79);
		assert_eq!(super::index_for_name("PSYBIENT"), 191);

		// Exact matching only
		assert_eq!(super::index_for_name("Psy"), GENRE_INVALID);
		assert_eq!(super::index_for_name(""), GENRE_INVALID);
	}
}
