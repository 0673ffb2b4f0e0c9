//! Raw views exchanged with the game module
//!
//! All pointers are owned by the platform. They are valid for the duration of
//! a single entry-point call and nothing more.

use crate::input::InputFrame;

/// Exported name of the update-and-render entry point.
pub const UPDATE_AND_RENDER_SYMBOL: &[u8] = b"game_update_and_render\0";

/// Exported name of the sound synthesis entry point.
pub const GET_SOUND_SAMPLES_SYMBOL: &[u8] = b"game_get_sound_samples\0";

/// Advance the simulation by one tick and draw into the frame buffer.
pub type GameUpdateAndRenderFn = unsafe extern "C" fn(
    memory: *mut GameMemory,
    input: *const InputFrame,
    buffer: *mut GameOffscreenBuffer,
);

/// Fill `sound.sample_count` interleaved stereo frames.
pub type GameGetSoundSamplesFn =
    unsafe extern "C" fn(memory: *mut GameMemory, sound: *mut GameSoundBuffer);

/// Game memory lent to the module.
///
/// `permanent_storage` keeps its contents across hot reloads. It is zeroed
/// once at startup, so any type that is valid when zeroed can live there.
/// `transient_storage` is scratch space.
#[repr(C)]
#[derive(Debug)]
pub struct GameMemory {
    pub is_initialized: bool,
    pub permanent_storage_size: u64,
    pub permanent_storage: *mut u8,
    pub transient_storage_size: u64,
    pub transient_storage: *mut u8,
}

/// Back buffer the module renders into.
///
/// Pixels are 32-bit `0x00RRGGBB` words stored little-endian, so the byte
/// order in memory is B, G, R, padding.
#[repr(C)]
#[derive(Debug)]
pub struct GameOffscreenBuffer {
    pub memory: *mut u8,
    pub width: u32,
    pub height: u32,
    pub pitch: u32,
    pub bytes_per_pixel: u32,
}

/// Output buffer for one tick's worth of audio.
///
/// `samples` holds `sample_count * 2` interleaved stereo 16-bit values. The
/// module must fill every one of them.
#[repr(C)]
#[derive(Debug)]
pub struct GameSoundBuffer {
    pub samples_per_second: u32,
    pub sample_count: u32,
    pub samples: *mut i16,
}

impl GameMemory {
    /// Borrow the permanent storage as a byte slice.
    ///
    /// # Safety
    ///
    /// `permanent_storage` must point to `permanent_storage_size` writable
    /// bytes that nothing else accesses for the returned lifetime.
    pub unsafe fn permanent_mut(&mut self) -> &mut [u8] {
        if self.permanent_storage.is_null() {
            return &mut [];
        }
        // SAFETY: upheld by the caller.
        unsafe {
            std::slice::from_raw_parts_mut(
                self.permanent_storage,
                self.permanent_storage_size as usize,
            )
        }
    }
}

impl GameOffscreenBuffer {
    /// Borrow the pixel rows as bytes.
    ///
    /// # Safety
    ///
    /// `memory` must point to `height * pitch` writable bytes that nothing
    /// else accesses for the returned lifetime.
    pub unsafe fn bytes_mut(&mut self) -> &mut [u8] {
        if self.memory.is_null() {
            return &mut [];
        }
        // SAFETY: upheld by the caller.
        unsafe {
            std::slice::from_raw_parts_mut(self.memory, (self.height * self.pitch) as usize)
        }
    }
}

impl GameSoundBuffer {
    /// Borrow the interleaved samples.
    ///
    /// # Safety
    ///
    /// `samples` must point to `sample_count * 2` writable values that nothing
    /// else accesses for the returned lifetime.
    pub unsafe fn samples_mut(&mut self) -> &mut [i16] {
        if self.samples.is_null() {
            return &mut [];
        }
        // SAFETY: upheld by the caller.
        unsafe { std::slice::from_raw_parts_mut(self.samples, self.sample_count as usize * 2) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_views_are_empty() {
        let mut memory = GameMemory {
            is_initialized: false,
            permanent_storage_size: 64,
            permanent_storage: std::ptr::null_mut(),
            transient_storage_size: 0,
            transient_storage: std::ptr::null_mut(),
        };
        let mut sound = GameSoundBuffer {
            samples_per_second: 48_000,
            sample_count: 10,
            samples: std::ptr::null_mut(),
        };
        unsafe {
            assert!(memory.permanent_mut().is_empty());
            assert!(sound.samples_mut().is_empty());
        }
    }

    #[test]
    fn test_sound_view_covers_both_channels() {
        let mut samples = vec![0i16; 8];
        let mut sound = GameSoundBuffer {
            samples_per_second: 48_000,
            sample_count: 4,
            samples: samples.as_mut_ptr(),
        };
        let view = unsafe { sound.samples_mut() };
        assert_eq!(view.len(), 8);
    }

    #[test]
    fn test_symbol_names_are_nul_terminated() {
        assert_eq!(UPDATE_AND_RENDER_SYMBOL.last(), Some(&0));
        assert_eq!(GET_SOUND_SAMPLES_SYMBOL.last(), Some(&0));
    }
}
