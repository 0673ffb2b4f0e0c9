//! Audio output synchronization
//!
//! The platform owns a circular device buffer that plays autonomously. Once
//! per tick, [`AudioSyncEngine`] decides which bytes of that buffer to fill
//! so playback stays fed without drifting ahead:
//!
//! 1. [`AudioSyncEngine::plan`] turns the device cursors and frame timing into a [`WritePlan`]
//! 2. The game module synthesizes `plan.sample_count()` stereo frames
//! 3. [`AudioSyncEngine::commit`] copies them into the device ring
//!
//! [`TimeMarkRing`] keeps the recent cursor history for the sync display.

mod buffer;
mod device;
mod marks;
mod sync;

pub use buffer::SoundBuffer;
pub use device::{Cursors, SoundDevice, SoundDeviceError};
pub use marks::{DebugTimeMark, TimeMarkRing, draw_sync_display};
pub use sync::{AudioDeviceState, AudioSyncEngine, WritePlan};

/// Channels per sample frame.
pub const CHANNELS: u32 = 2;

/// Bytes per sample frame: two 16-bit channels.
pub const BYTES_PER_SAMPLE: u32 = CHANNELS * std::mem::size_of::<i16>() as u32;
