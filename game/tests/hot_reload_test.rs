//! Integration test for hot reloading the built game library
//!
//! Loads the `cdylib` produced alongside this test through the platform's
//! loader, calls through its entry points, then swaps in a broken build and
//! a good one again.

use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use handmade_core::{
    FrameBuffer, GAME_LIBRARY_NAME, GameCodeLoader, GameMemoryRegion, GameModule, ReloadError,
    SoundBuffer,
};
use handmade_shared::InputFrame;

/// The game library cargo built for this test run.
fn built_game_library() -> PathBuf {
    let file_name = format!("{}{}{}", DLL_PREFIX, GAME_LIBRARY_NAME, DLL_SUFFIX);
    let exe = std::env::current_exe().unwrap();
    let deps = exe.parent().unwrap();
    let profile = deps.parent().unwrap();
    for dir in [deps, profile] {
        let exact = dir.join(&file_name);
        if exact.is_file() {
            return exact;
        }
    }
    // deps/ may carry a hashed name
    let prefix = format!("{}{}", DLL_PREFIX, GAME_LIBRARY_NAME);
    std::fs::read_dir(deps)
        .unwrap()
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .find(|path| {
            let name = path.file_name().unwrap().to_string_lossy();
            name.starts_with(&prefix) && name.ends_with(DLL_SUFFIX)
        })
        .unwrap_or_else(|| panic!("{} not found next to {}", file_name, exe.display()))
}

/// Bump the modification time past anything the filesystem already recorded.
fn touch(path: &Path, seconds_ahead: u64) {
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() + Duration::from_secs(seconds_ahead))
        .unwrap();
}

fn moving_right() -> InputFrame {
    let mut input = InputFrame {
        seconds_to_advance: 1.0 / 30.0,
        ..Default::default()
    };
    input.keyboard_mut().is_connected = true;
    input.keyboard_mut().buttons.move_right.ended_down = true;
    input
}

#[test]
fn test_reload_swaps_and_survives_broken_build() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join(format!("{}{}{}", DLL_PREFIX, GAME_LIBRARY_NAME, DLL_SUFFIX));
    let temp_dir = dir.path().join("loaded");
    std::fs::create_dir(&temp_dir).unwrap();
    let built = built_game_library();
    std::fs::copy(&built, &source).unwrap();

    let mut loader = GameCodeLoader::new(&source, &temp_dir);
    assert!(!loader.is_loaded());
    assert!(loader.poll().unwrap(), "first poll should load the library");
    assert!(loader.is_loaded());
    assert!(!loader.poll().unwrap(), "unchanged library should not reload");

    let mut memory = GameMemoryRegion::new(1 << 20, 1 << 20).unwrap();
    let mut buffer = FrameBuffer::new(64, 64);
    let mut sound = SoundBuffer::new(48_000, 1600).unwrap();
    let input = moving_right();

    // Entry points run and the initialized flag comes back across the ABI.
    loader.game().update_and_render(&mut memory, &input, &mut buffer);
    assert!(memory.is_initialized());
    assert!(buffer.bytes().iter().any(|&b| b != 0));
    sound.prepare(1600);
    loader.game().get_sound_samples(&mut memory, &mut sound);
    assert!(sound.samples().iter().any(|&s| s != 0));
    let state_after_first_tick = memory.permanent()[..64].to_vec();

    // A broken build keeps the running code.
    std::fs::write(&source, b"not a shared library").unwrap();
    touch(&source, 10);
    assert!(matches!(loader.poll(), Err(ReloadError::Load { .. })));
    assert!(loader.is_loaded());

    buffer.fill(0);
    loader.game().update_and_render(&mut memory, &input, &mut buffer);
    assert!(buffer.bytes().iter().any(|&b| b != 0));
    assert_ne!(&memory.permanent()[..64], &state_after_first_tick[..]);

    // A fixed build is swapped in and picks up the same memory.
    std::fs::copy(&built, &source).unwrap();
    touch(&source, 20);
    let before_reload = memory.permanent()[..64].to_vec();
    assert!(loader.poll().unwrap());
    assert!(loader.is_loaded());
    assert_eq!(&memory.permanent()[..64], &before_reload[..]);

    loader.game().update_and_render(&mut memory, &input, &mut buffer);
    assert!(memory.is_initialized());
    assert_ne!(&memory.permanent()[..64], &before_reload[..]);
}
