/// The tag's identifier, always the first 3 bytes of the 128 byte trailer
pub(crate) const ID3V1_TAG_MARKER: [u8; 3] = [b'T', b'A', b'G'];
