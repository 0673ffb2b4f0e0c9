//! Handmade Game - the hot-reloadable game module
//!
//! Built as a `cdylib` and loaded by the platform at runtime. The module keeps
//! no state of its own: everything persistent lives in [`GameState`] at the
//! start of the platform's permanent storage, so a rebuilt library picks up
//! exactly where the previous one left off.

mod game;
mod render;
mod sound;
mod world;

use handmade_shared::{GameMemory, GameOffscreenBuffer, GameSoundBuffer, InputFrame};

pub use game::GameState;
use render::Bitmap;

/// The `GameState` view over permanent storage, or `None` if it can't hold one.
///
/// # Safety
///
/// `memory` must describe a valid permanent storage block that nothing else
/// accesses while the returned reference is alive.
unsafe fn game_state(memory: &mut GameMemory) -> Option<&mut GameState> {
    let ptr = memory.permanent_storage.cast::<GameState>();
    if ptr.is_null()
        || (memory.permanent_storage_size as usize) < size_of::<GameState>()
        || !ptr.is_aligned()
    {
        return None;
    }
    if !memory.is_initialized {
        // SAFETY: checked non-null, aligned and large enough above.
        unsafe { ptr.write(GameState::default()) };
        memory.is_initialized = true;
    }
    // SAFETY: as above, and initialized.
    Some(unsafe { &mut *ptr })
}

/// # Safety
///
/// All pointers must be valid for the duration of the call, as set up by the
/// platform.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn game_update_and_render(
    memory: *mut GameMemory,
    input: *const InputFrame,
    buffer: *mut GameOffscreenBuffer,
) {
    // SAFETY: upheld by the caller.
    let (Some(memory), Some(input), Some(buffer)) =
        (unsafe { memory.as_mut() }, unsafe { input.as_ref() }, unsafe {
            buffer.as_mut()
        })
    else {
        return;
    };
    let (width, height, pitch) = (buffer.width, buffer.height, buffer.pitch);
    // SAFETY: upheld by the caller.
    let Some(state) = (unsafe { game_state(memory) }) else {
        return;
    };
    let mut bitmap = Bitmap {
        // SAFETY: upheld by the caller.
        memory: unsafe { buffer.bytes_mut() },
        width,
        height,
        pitch,
    };
    state.update_and_render(input, &mut bitmap);
}

/// # Safety
///
/// All pointers must be valid for the duration of the call, as set up by the
/// platform.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn game_get_sound_samples(
    memory: *mut GameMemory,
    sound: *mut GameSoundBuffer,
) {
    // SAFETY: upheld by the caller.
    let (Some(memory), Some(sound)) = (unsafe { memory.as_mut() }, unsafe { sound.as_mut() })
    else {
        return;
    };
    let samples_per_second = sound.samples_per_second;
    // SAFETY: upheld by the caller.
    let samples = unsafe { sound.samples_mut() };
    // SAFETY: upheld by the caller.
    match unsafe { game_state(memory) } {
        Some(state) => state.get_sound_samples(samples_per_second, samples),
        None => samples.fill(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handmade_shared::{GameGetSoundSamplesFn, GameUpdateAndRenderFn};

    // u64 words keep the block aligned for GameState.
    fn memory_block(words: usize) -> (Vec<u64>, GameMemory) {
        let mut block = vec![0u64; words];
        let memory = GameMemory {
            is_initialized: false,
            permanent_storage_size: (words * 8) as u64,
            permanent_storage: block.as_mut_ptr().cast(),
            transient_storage_size: 0,
            transient_storage: std::ptr::null_mut(),
        };
        (block, memory)
    }

    #[test]
    fn test_entry_points_match_abi() {
        let _: GameUpdateAndRenderFn = game_update_and_render;
        let _: GameGetSoundSamplesFn = game_get_sound_samples;
    }

    #[test]
    fn test_update_initializes_state_once() {
        let (block, mut memory) = memory_block(64);
        let mut pixels = vec![0u8; 64 * 64 * 4];
        let mut buffer = GameOffscreenBuffer {
            memory: pixels.as_mut_ptr(),
            width: 64,
            height: 64,
            pitch: 256,
            bytes_per_pixel: 4,
        };
        let mut input = InputFrame {
            seconds_to_advance: 0.5,
            ..Default::default()
        };
        input.keyboard_mut().is_connected = true;
        input.keyboard_mut().buttons.move_right.ended_down = true;

        unsafe { game_update_and_render(&mut memory, &input, &mut buffer) };
        assert!(memory.is_initialized);
        let state = unsafe { &*block.as_ptr().cast::<GameState>() };
        assert_eq!(state.player_x, 150.0 + 32.0);

        unsafe { game_update_and_render(&mut memory, &input, &mut buffer) };
        let state = unsafe { &*block.as_ptr().cast::<GameState>() };
        assert_eq!(state.player_x, 150.0 + 64.0);
        assert!(pixels.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_too_small_storage_is_left_alone() {
        let (_block, mut memory) = memory_block(1);
        let mut samples = vec![5i16; 16];
        let mut sound = GameSoundBuffer {
            samples_per_second: 48_000,
            sample_count: 8,
            samples: samples.as_mut_ptr(),
        };
        unsafe { game_get_sound_samples(&mut memory, &mut sound) };
        assert!(!memory.is_initialized);
        assert!(samples.iter().all(|&s| s == 0));
    }

    #[test]
    fn test_sound_advances_phase_in_state() {
        let (block, mut memory) = memory_block(64);
        let mut samples = vec![0i16; 200];
        let mut sound = GameSoundBuffer {
            samples_per_second: 48_000,
            sample_count: 100,
            samples: samples.as_mut_ptr(),
        };
        unsafe { game_get_sound_samples(&mut memory, &mut sound) };
        let state = unsafe { &*block.as_ptr().cast::<GameState>() };
        assert!(state.tone_phase > 0.0);
        assert!(samples.iter().any(|&s| s != 0));
    }

    #[test]
    fn test_null_pointers_are_ignored() {
        unsafe {
            game_update_and_render(
                std::ptr::null_mut(),
                std::ptr::null(),
                std::ptr::null_mut(),
            );
            game_get_sound_samples(std::ptr::null_mut(), std::ptr::null_mut());
        }
    }
}
