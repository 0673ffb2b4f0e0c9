//! Handmade Core - timing and synchronization for the platform layer
//!
//! This crate holds everything in the platform loop that doesn't touch the
//! OS directly, so it can be driven by simulated devices in tests.
//!
//! # Architecture
//!
//! - [`ring`] - Wrapping arithmetic over the audio device ring
//! - [`ClockSource`] - Monotonic time, real or simulated
//! - [`DoubleBufferedInput`] - Old/new input snapshots with edge counting
//! - [`AudioSyncEngine`] - Decides each tick's write into the device ring
//! - [`FramePacer`] - Holds ticks to a fixed rate
//! - [`GameCodeLoader`] - Hot reload of the game library with a no-op stub
//! - [`HandmadeLoop`] - One tick of all of the above, in order

pub mod audio;
pub mod clock;
pub mod config;
pub mod frame_buffer;
pub mod input;
pub mod memory;
pub mod reload;
pub mod replay;
pub mod ring;
pub mod runtime;
#[cfg(test)]
pub mod test_utils;

pub use audio::{
    AudioDeviceState, AudioSyncEngine, Cursors, DebugTimeMark, SoundBuffer, SoundDevice,
    SoundDeviceError, TimeMarkRing, WritePlan,
};
pub use clock::{ClockSource, SystemClock, Timestamp};
pub use config::PlatformConfig;
pub use frame_buffer::FrameBuffer;
pub use input::{DoubleBufferedInput, GamepadReading};
pub use memory::{GameMemoryRegion, MemoryError};
pub use reload::{GAME_LIBRARY_NAME, GameCode, GameCodeLoader, GameModule, ReloadError};
pub use replay::{InputReplay, ReplayError, ReplayMode};
pub use ring::SoundRing;
pub use runtime::{
    FrameOutcome, FramePacer, FrameStats, HandmadeLoop, LoopState, PacerConfig, StartupError,
    TickReport,
};
