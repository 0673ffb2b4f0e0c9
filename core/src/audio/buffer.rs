//! Sample staging buffer

use handmade_shared::GameSoundBuffer;

use super::CHANNELS;
use crate::memory::MemoryError;

/// Interleaved stereo samples the game fills each tick before they are
/// copied into the device ring.
#[derive(Debug, Clone)]
pub struct SoundBuffer {
    samples_per_second: u32,
    sample_count: u32,
    samples: Vec<i16>,
}

impl SoundBuffer {
    /// Reserve room for `max_frames` stereo frames up front.
    pub fn new(samples_per_second: u32, max_frames: u32) -> Result<Self, MemoryError> {
        let len = max_frames as usize * CHANNELS as usize;
        let mut samples = Vec::new();
        samples
            .try_reserve_exact(len)
            .map_err(|_| MemoryError::Allocation {
                requested: len * std::mem::size_of::<i16>(),
            })?;
        samples.resize(len, 0);
        Ok(Self {
            samples_per_second,
            sample_count: 0,
            samples,
        })
    }

    pub fn samples_per_second(&self) -> u32 {
        self.samples_per_second
    }

    pub fn capacity_frames(&self) -> u32 {
        (self.samples.len() / CHANNELS as usize) as u32
    }

    /// Frames requested for the current tick.
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Request `frames` for this tick, clamped to capacity. Returns the count used.
    pub fn prepare(&mut self, frames: u32) -> u32 {
        self.sample_count = frames.min(self.capacity_frames());
        self.sample_count
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples[..self.sample_count as usize * CHANNELS as usize]
    }

    pub fn samples_mut(&mut self) -> &mut [i16] {
        &mut self.samples[..self.sample_count as usize * CHANNELS as usize]
    }

    /// Raw view for the game module, covering only the requested frames.
    pub fn as_abi(&mut self) -> GameSoundBuffer {
        GameSoundBuffer {
            samples_per_second: self.samples_per_second,
            sample_count: self.sample_count,
            samples: self.samples.as_mut_ptr(),
        }
    }
}
