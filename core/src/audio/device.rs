//! Audio device contract

use thiserror::Error;

/// Hardware cursor positions, in bytes from the start of the device ring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursors {
    /// Byte currently being played
    pub play: u32,
    /// First byte that is safe to overwrite
    pub write: u32,
}

/// Transient device failures. None of these are fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SoundDeviceError {
    #[error("failed to query device cursors: {0}")]
    CursorQuery(String),

    #[error("failed to lock {len} bytes at offset {offset}")]
    Lock { offset: u32, len: u32 },

    #[error("audio device unavailable")]
    Unavailable,

    #[error("audio stream error: {0}")]
    Stream(String),
}

/// A circular output buffer that plays on its own.
///
/// Any backend that can report its cursors and hand out up to two writable
/// spans is interchangeable.
pub trait SoundDevice {
    /// Ring size in bytes.
    fn buffer_size(&self) -> u32;

    /// Current play and write cursors.
    fn current_cursors(&mut self) -> Result<Cursors, SoundDeviceError>;

    /// Lock `len` bytes starting at `offset` and pass the writable spans to
    /// `fill`. The second span is empty unless the region wraps past the end
    /// of the ring. The region is unlocked when `fill` returns.
    fn lock_region(
        &mut self,
        offset: u32,
        len: u32,
        fill: &mut dyn FnMut(&mut [u8], &mut [u8]),
    ) -> Result<(), SoundDeviceError>;

    /// Start the device playing from its current cursor.
    fn start_playback(&mut self) -> Result<(), SoundDeviceError>;
}
