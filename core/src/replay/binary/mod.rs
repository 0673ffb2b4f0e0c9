//! Binary replay format

mod reader;
mod writer;

pub use reader::ReplayReader;
pub use writer::ReplayWriter;

/// File magic
pub const REPLAY_MAGIC: [u8; 4] = *b"HMRP";

/// Current format version
pub const REPLAY_VERSION: u16 = 1;
