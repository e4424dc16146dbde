//! Options to control how tags are read and written
//!
//! Everything here is a plain value struct resolved by the caller per call;
//! the codec holds no process-wide mutable state.

mod encoding_options;
mod parse_options;
mod write_options;

pub use encoding_options::{EncodingOptions, UnicodeEncoding};
pub use parse_options::{ParseOptions, ParsingMode};
pub use write_options::WriteOptions;
