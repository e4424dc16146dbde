//! ID3v2 items
//!
//! # A warning about ID3v2
//!
//! ID3v2 is an extremely complex format, and this crate implements the
//! frame vocabulary its [`Tag`](crate::tag::Tag) model needs. Frames
//! outside that vocabulary are carried as opaque [`BinaryFrame`]s and
//! survive rewrites untouched.

pub(crate) mod frame;
pub(crate) mod header;
pub(crate) mod read;
pub mod synchsafe;
pub(crate) mod tag;
pub(crate) mod write;

pub use frame::{
	BinaryFrame, CommentFrame, Frame, FrameFlags, FrameId, PictureFrame, TextFrame, UrlFrame,
};
pub use header::{Id3v2TagFlags, Id3v2Version};
pub use tag::Id3v2Tag;
