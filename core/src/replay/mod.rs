//! Input recording and looped playback
//!
//! A recording is a snapshot of the whole game memory block followed by one
//! [`InputFrame`](handmade_shared::InputFrame) per tick:
//!
//! ```text
//! magic "HMRP" | version u16 | reserved u16 | memory size u64
//! memory dump (memory size bytes)
//! input frame records, until end of file
//! ```
//!
//! All integers are little-endian. Ending a recording starts playback, which
//! restores the snapshot and feeds the recorded inputs back in a loop.

pub mod binary;
mod session;

pub use binary::{REPLAY_MAGIC, REPLAY_VERSION, ReplayReader, ReplayWriter};
pub use session::{InputReplay, ReplayMode};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("replay I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a replay file")]
    BadMagic,

    #[error("unsupported replay version {0}")]
    UnsupportedVersion(u16),

    #[error("replay holds {found} bytes of game memory, expected {expected}")]
    MemorySizeMismatch { expected: u64, found: u64 },
}
