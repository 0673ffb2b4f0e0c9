//! Per-tick audio write planning

use tracing::{debug, warn};

use super::BYTES_PER_SAMPLE;
use super::device::{Cursors, SoundDevice, SoundDeviceError};
use crate::ring::SoundRing;

/// Device-side audio bookkeeping, created once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDeviceState {
    pub samples_per_second: u32,
    pub bytes_per_sample: u32,
    /// Device ring size in bytes
    pub buffer_size: u32,
    /// Sample frames written since the last resync. Only taken modulo
    /// `buffer_size` when used as an offset.
    pub running_sample_index: u64,
    /// Extra bytes written past the expected flip to absorb cursor jitter
    pub safety_bytes: u32,
}

impl AudioDeviceState {
    /// State for a stereo 16-bit ring holding `buffer_seconds` of audio.
    pub fn new(samples_per_second: u32, buffer_seconds: f32, safety_bytes: u32) -> Self {
        let bytes_per_sample = BYTES_PER_SAMPLE;
        let frames = ((samples_per_second as f32 * buffer_seconds) as u32).max(1);
        Self {
            samples_per_second,
            bytes_per_sample,
            buffer_size: frames * bytes_per_sample,
            running_sample_index: 0,
            safety_bytes: safety_bytes / bytes_per_sample * bytes_per_sample,
        }
    }

    pub fn bytes_per_second(&self) -> u32 {
        self.samples_per_second * self.bytes_per_sample
    }

    /// Bytes the device consumes during one tick of `target_seconds_per_frame`.
    pub fn bytes_per_frame(&self, target_seconds_per_frame: f32) -> u32 {
        (self.bytes_per_second() as f64 * target_seconds_per_frame as f64) as u32
    }

    /// `fraction` of one tick's bytes, rounded down to whole sample frames.
    pub fn safety_bytes_for(
        samples_per_second: u32,
        target_seconds_per_frame: f32,
        fraction: f32,
    ) -> u32 {
        let bytes_per_second = samples_per_second as f64 * BYTES_PER_SAMPLE as f64;
        let bytes = bytes_per_second * target_seconds_per_frame as f64 * fraction as f64;
        // `as` saturates, so NaN and negative fractions land on zero.
        let bytes = bytes as u32;
        bytes / BYTES_PER_SAMPLE * BYTES_PER_SAMPLE
    }
}

/// Where and how much to write this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WritePlan {
    /// Cursors the plan was computed from
    pub cursors: Cursors,
    /// Next unwritten byte
    pub byte_to_lock: u32,
    pub bytes_to_write: u32,
    /// Predicted play cursor at the moment of the next flip
    pub frame_flip_byte: u32,
    /// Anchor the target was computed from: `frame_flip_byte` when latency
    /// is low, the write cursor otherwise
    pub sound_flip_byte: u32,
    /// Whether `frame_flip_byte` fell inside `[play, write]` and was used
    pub low_latency: bool,
    pub target_cursor: u32,
    pub bytes_per_sample: u32,
}

impl WritePlan {
    /// Whole stereo frames the game must synthesize.
    pub fn sample_count(&self) -> u32 {
        self.bytes_to_write / self.bytes_per_sample
    }

    /// True if the flip anchor was predicted rather than the write cursor.
    pub fn is_low_latency(&self) -> bool {
        self.low_latency
    }
}

/// Decides each tick's write into the device ring.
#[derive(Debug)]
pub struct AudioSyncEngine {
    state: AudioDeviceState,
    ring: SoundRing,
    sound_is_valid: bool,
    failure_streak: u32,
    resync_count: u64,
}

impl AudioSyncEngine {
    pub fn new(state: AudioDeviceState) -> Self {
        let ring = SoundRing::new(state.buffer_size);
        Self {
            state,
            ring,
            sound_is_valid: false,
            failure_streak: 0,
            resync_count: 0,
        }
    }

    pub fn state(&self) -> &AudioDeviceState {
        &self.state
    }

    pub fn ring(&self) -> SoundRing {
        self.ring
    }

    pub fn running_sample_index(&self) -> u64 {
        self.state.running_sample_index
    }

    /// Whether the running index is anchored to real cursors.
    pub fn is_valid(&self) -> bool {
        self.sound_is_valid
    }

    /// Times the writer fell behind playback and was re-anchored.
    pub fn resync_count(&self) -> u64 {
        self.resync_count
    }

    pub fn set_safety_bytes(&mut self, safety_bytes: u32) {
        let bps = self.state.bytes_per_sample;
        self.state.safety_bytes = safety_bytes / bps * bps;
    }

    /// Zero the whole device ring. Done once before playback starts.
    pub fn clear(&self, device: &mut dyn SoundDevice) -> Result<(), SoundDeviceError> {
        device.lock_region(0, self.state.buffer_size, &mut |first, second| {
            first.fill(0);
            second.fill(0);
        })
    }

    /// Compute this tick's write.
    ///
    /// Returns `None` if the cursor query failed. The running index is then
    /// re-anchored on the next successful query.
    pub fn plan(
        &mut self,
        cursors: Result<Cursors, SoundDeviceError>,
        seconds_since_flip: f32,
        target_seconds_per_frame: f32,
    ) -> Option<WritePlan> {
        let cursors = match cursors {
            Ok(c) if c.play < self.state.buffer_size && c.write < self.state.buffer_size => c,
            Ok(c) => {
                let err = SoundDeviceError::CursorQuery(format!(
                    "cursors {}/{} outside {}-byte ring",
                    c.play, c.write, self.state.buffer_size
                ));
                self.invalidate(&err);
                return None;
            }
            Err(err) => {
                self.invalidate(&err);
                return None;
            }
        };

        if !self.sound_is_valid {
            self.anchor_to(cursors.write);
            self.sound_is_valid = true;
            if self.failure_streak > 0 {
                debug!("Sound recovered after {} failed ticks", self.failure_streak);
            }
            self.failure_streak = 0;
        }

        let bps = self.state.bytes_per_sample;
        let mut byte_to_lock = self.byte_to_lock();

        let seconds_to_flip = (target_seconds_per_frame - seconds_since_flip).max(0.0);
        let bytes_to_flip = (seconds_to_flip as f64 * self.state.bytes_per_second() as f64) as u32;
        let frame_flip_byte = self.ring.add(cursors.play, bytes_to_flip);

        let low_latency = self.ring.between(cursors.play, cursors.write, frame_flip_byte);
        let sound_flip_byte = if low_latency {
            frame_flip_byte
        } else {
            cursors.write
        };

        let bytes_per_frame = self.state.bytes_per_frame(target_seconds_per_frame);
        let target_cursor = self
            .ring
            .add(sound_flip_byte, bytes_per_frame.saturating_add(self.state.safety_bytes));

        let mut bytes_to_write = self.ring.diff(byte_to_lock, target_cursor);

        if !self.ring.between(cursors.play, target_cursor, byte_to_lock) {
            let past_target = self.ring.diff(target_cursor, byte_to_lock);
            let behind_play = self.ring.diff(byte_to_lock, cursors.play);
            if past_target < behind_play {
                // Earlier ticks already wrote beyond this tick's target.
                bytes_to_write = 0;
            } else {
                // Playback overtook the writer, so the next unwritten byte is
                // already behind the play cursor.
                warn!(
                    "Audio writer fell behind playback (lock {}, play {}), resyncing",
                    byte_to_lock, cursors.play
                );
                self.anchor_to(cursors.write);
                self.resync_count += 1;
                byte_to_lock = self.byte_to_lock();
                bytes_to_write = if self.ring.between(cursors.play, target_cursor, byte_to_lock) {
                    self.ring.diff(byte_to_lock, target_cursor)
                } else {
                    0
                };
            }
        }

        Some(WritePlan {
            cursors,
            byte_to_lock,
            bytes_to_write,
            frame_flip_byte,
            sound_flip_byte,
            low_latency,
            target_cursor,
            bytes_per_sample: bps,
        })
    }

    /// Copy synthesized frames into the device ring at the planned offset.
    ///
    /// `samples` holds interleaved stereo values. At most
    /// `plan.sample_count()` frames are copied. Returns the frames actually
    /// written, which is also how far the running index advances.
    pub fn commit(
        &mut self,
        device: &mut dyn SoundDevice,
        plan: &WritePlan,
        samples: &[i16],
    ) -> Result<u32, SoundDeviceError> {
        let bps = self.state.bytes_per_sample;
        let source: &[u8] = bytemuck::cast_slice(samples);
        let available = source.len() as u32 / bps * bps;
        let len = (plan.sample_count() * bps).min(available);
        if len == 0 {
            return Ok(0);
        }

        let source = &source[..len as usize];
        let mut copied = 0usize;
        let result = device.lock_region(plan.byte_to_lock, len, &mut |first, second| {
            let (head, tail) = source.split_at(first.len().min(source.len()));
            first[..head.len()].copy_from_slice(head);
            let wrapped = tail.len().min(second.len());
            second[..wrapped].copy_from_slice(&tail[..wrapped]);
            copied = head.len() + wrapped;
        });

        match result {
            Ok(()) => {
                let frames = copied as u32 / bps;
                self.state.running_sample_index += frames as u64;
                Ok(frames)
            }
            Err(err) => {
                self.invalidate(&err);
                Err(err)
            }
        }
    }

    fn byte_to_lock(&self) -> u32 {
        let bytes = self.state.running_sample_index * self.state.bytes_per_sample as u64;
        (bytes % self.state.buffer_size as u64) as u32
    }

    fn anchor_to(&mut self, write_cursor: u32) {
        self.state.running_sample_index = (write_cursor / self.state.bytes_per_sample) as u64;
    }

    fn invalidate(&mut self, err: &SoundDeviceError) {
        if self.failure_streak == 0 {
            warn!("Skipping audio write: {}", err);
        }
        self.failure_streak = self.failure_streak.saturating_add(1);
        self.sound_is_valid = false;
    }
}
