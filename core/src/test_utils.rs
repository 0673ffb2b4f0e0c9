//! Shared test doubles for the frame loop

use std::cell::Cell;
use std::time::Duration;

use handmade_shared::InputFrame;

use crate::audio::{Cursors, SoundBuffer, SoundDevice, SoundDeviceError};
use crate::clock::{ClockSource, Timestamp};
use crate::frame_buffer::FrameBuffer;
use crate::memory::GameMemoryRegion;
use crate::reload::GameModule;

// ============================================================================
// Manual Clock
// ============================================================================

/// Deterministic clock with one tick per nanosecond.
///
/// Time only moves when a test advances it, when `sleep` is called, or by
/// `auto_advance` on every `now()` so spin-waits terminate.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
    auto_advance: u64,
    oversleep: u64,
    pub sleeps: Vec<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auto_advance(mut self, step: Duration) -> Self {
        self.auto_advance = step.as_nanos() as u64;
        self
    }

    /// Every sleep wakes up this much later than requested.
    pub fn with_oversleep(mut self, extra: Duration) -> Self {
        self.oversleep = extra.as_nanos() as u64;
        self
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by.as_nanos() as u64);
    }

    pub fn peek(&self) -> Timestamp {
        Timestamp::from_ticks(self.now.get())
    }
}

impl ClockSource for ManualClock {
    fn now(&self) -> Timestamp {
        let t = self.now.get();
        self.now.set(t + self.auto_advance);
        Timestamp::from_ticks(t)
    }

    fn frequency(&self) -> u64 {
        1_000_000_000
    }

    fn sleep(&mut self, duration: Duration) {
        self.sleeps.push(duration);
        self.now
            .set(self.now.get() + duration.as_nanos() as u64 + self.oversleep);
    }
}

// ============================================================================
// Simulated Sound Device
// ============================================================================

/// In-memory circular device. The play cursor only moves when the test
/// calls [`SimulatedSoundDevice::advance`]; the write cursor leads it by a
/// fixed latency.
#[derive(Debug, Clone)]
pub struct SimulatedSoundDevice {
    pub buffer: Vec<u8>,
    pub play: u32,
    pub latency: u32,
    pub fail_cursors: bool,
    pub fail_lock: bool,
    pub playing: bool,
    /// `(offset, len)` of every successful lock
    pub locks: Vec<(u32, u32)>,
}

impl SimulatedSoundDevice {
    pub fn new(size: u32, latency: u32) -> Self {
        Self {
            buffer: vec![0xAA; size as usize],
            play: 0,
            latency,
            fail_cursors: false,
            fail_lock: false,
            playing: false,
            locks: Vec::new(),
        }
    }

    pub fn advance(&mut self, bytes: u32) {
        let size = self.buffer.len() as u64;
        self.play = ((self.play as u64 + bytes as u64) % size) as u32;
    }
}

impl SoundDevice for SimulatedSoundDevice {
    fn buffer_size(&self) -> u32 {
        self.buffer.len() as u32
    }

    fn current_cursors(&mut self) -> Result<Cursors, SoundDeviceError> {
        if self.fail_cursors {
            return Err(SoundDeviceError::CursorQuery("simulated failure".into()));
        }
        let size = self.buffer.len() as u64;
        Ok(Cursors {
            play: self.play,
            write: ((self.play as u64 + self.latency as u64) % size) as u32,
        })
    }

    fn lock_region(
        &mut self,
        offset: u32,
        len: u32,
        fill: &mut dyn FnMut(&mut [u8], &mut [u8]),
    ) -> Result<(), SoundDeviceError> {
        let size = self.buffer.len() as u32;
        if self.fail_lock || offset >= size || len > size {
            return Err(SoundDeviceError::Lock { offset, len });
        }
        let first = len.min(size - offset) as usize;
        let second = len as usize - first;
        let (front, back) = self.buffer.split_at_mut(offset as usize);
        fill(&mut back[..first], &mut front[..second]);
        self.locks.push((offset, len));
        Ok(())
    }

    fn start_playback(&mut self) -> Result<(), SoundDeviceError> {
        self.playing = true;
        Ok(())
    }
}

// ============================================================================
// Recording Game Module
// ============================================================================

/// Game double that counts calls and writes a recognizable pattern.
#[derive(Debug, Default)]
pub struct RecordingGame {
    pub updates: u32,
    pub sound_calls: u32,
    pub requested_frames: Vec<u32>,
    pub seen_seconds: Vec<f32>,
    pub fill_value: i16,
}

impl GameModule for RecordingGame {
    fn update_and_render(
        &mut self,
        memory: &mut GameMemoryRegion,
        input: &InputFrame,
        buffer: &mut FrameBuffer,
    ) {
        self.updates += 1;
        self.seen_seconds.push(input.seconds_to_advance);
        let bytes = memory.as_bytes_mut();
        if let Some(first) = bytes.first_mut() {
            *first = first.wrapping_add(1);
        }
        buffer.fill(0x0000_00FF);
    }

    fn get_sound_samples(&mut self, _memory: &mut GameMemoryRegion, sound: &mut SoundBuffer) {
        self.sound_calls += 1;
        self.requested_frames.push(sound.sample_count());
        let value = self.fill_value;
        sound.samples_mut().fill(value);
    }
}
