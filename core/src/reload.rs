//! Hot-reloadable game code
//!
//! The game lives in a shared library that can be rebuilt while the platform
//! runs. [`GameCodeLoader`] polls the library's modification time between
//! frames. On a change it copies the library to a fresh temporary file, loads
//! the copy and resolves both entry points. The running code is replaced
//! only after that succeeds; on any failure the previous code keeps running.
//!
//! Until a load succeeds the loader holds [`GameCode::Stub`], which renders
//! nothing and outputs silence.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use handmade_shared::{
    GET_SOUND_SAMPLES_SYMBOL, GameGetSoundSamplesFn, GameUpdateAndRenderFn, InputFrame,
    UPDATE_AND_RENDER_SYMBOL,
};
use libloading::Library;
use thiserror::Error;

use crate::audio::SoundBuffer;
use crate::frame_buffer::FrameBuffer;
use crate::memory::GameMemoryRegion;

/// Base name of the game library, without platform prefix or extension.
pub const GAME_LIBRARY_NAME: &str = "handmade_game";

#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("failed to read metadata of {path}: {source}")]
    Metadata {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to load {path}: {source}")]
    Load {
        path: PathBuf,
        source: libloading::Error,
    },

    #[error("{path} does not export `{symbol}`")]
    MissingSymbol { path: PathBuf, symbol: String },
}

/// The two calls the frame loop makes into game code each tick.
pub trait GameModule {
    fn update_and_render(
        &mut self,
        memory: &mut GameMemoryRegion,
        input: &InputFrame,
        buffer: &mut FrameBuffer,
    );

    fn get_sound_samples(&mut self, memory: &mut GameMemoryRegion, sound: &mut SoundBuffer);
}

/// A successfully loaded and validated library copy.
pub struct LoadedGame {
    library: Option<Library>,
    temp_path: PathBuf,
    update_and_render: GameUpdateAndRenderFn,
    get_sound_samples: GameGetSoundSamplesFn,
}

impl LoadedGame {
    /// Copy `source` to `temp_path`, load the copy and resolve both entry points.
    pub fn load(source: &Path, temp_path: PathBuf) -> Result<Self, ReloadError> {
        std::fs::copy(source, &temp_path).map_err(|e| ReloadError::Copy {
            from: source.to_path_buf(),
            to: temp_path.clone(),
            source: e,
        })?;

        // SAFETY: the library is built from this workspace and has no
        // load-time side effects beyond Rust's own initialization.
        let library = match unsafe { Library::new(&temp_path) } {
            Ok(library) => library,
            Err(e) => {
                remove_temp(&temp_path);
                return Err(ReloadError::Load {
                    path: temp_path,
                    source: e,
                });
            }
        };

        let resolved = unsafe {
            let update = library
                .get::<GameUpdateAndRenderFn>(UPDATE_AND_RENDER_SYMBOL)
                .map(|symbol| *symbol);
            let sound = library
                .get::<GameGetSoundSamplesFn>(GET_SOUND_SAMPLES_SYMBOL)
                .map(|symbol| *symbol);
            (update, sound)
        };

        match resolved {
            (Ok(update_and_render), Ok(get_sound_samples)) => Ok(Self {
                library: Some(library),
                temp_path,
                update_and_render,
                get_sound_samples,
            }),
            (update, _) => {
                let symbol = if update.is_err() {
                    UPDATE_AND_RENDER_SYMBOL
                } else {
                    GET_SOUND_SAMPLES_SYMBOL
                };
                drop(library);
                remove_temp(&temp_path);
                Err(ReloadError::MissingSymbol {
                    path: source.to_path_buf(),
                    symbol: symbol_name(symbol),
                })
            }
        }
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }
}

impl Drop for LoadedGame {
    fn drop(&mut self) {
        // Unload before deleting, some platforms refuse to remove a loaded library.
        drop(self.library.take());
        remove_temp(&self.temp_path);
    }
}

impl std::fmt::Debug for LoadedGame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedGame")
            .field("temp_path", &self.temp_path)
            .finish_non_exhaustive()
    }
}

/// Game code as the frame loop sees it.
#[derive(Debug, Default)]
pub enum GameCode {
    Loaded(LoadedGame),
    #[default]
    Stub,
}

impl GameCode {
    pub fn is_loaded(&self) -> bool {
        matches!(self, GameCode::Loaded(_))
    }
}

impl GameModule for GameCode {
    fn update_and_render(
        &mut self,
        memory: &mut GameMemoryRegion,
        input: &InputFrame,
        buffer: &mut FrameBuffer,
    ) {
        let GameCode::Loaded(game) = self else {
            return;
        };
        let mut abi_memory = memory.as_abi();
        let mut abi_buffer = buffer.as_abi();
        // SAFETY: the views point at platform-owned memory that outlives the
        // call, and the library stays loaded while `game` exists.
        unsafe { (game.update_and_render)(&mut abi_memory, input, &mut abi_buffer) };
        memory.sync_from_abi(&abi_memory);
    }

    fn get_sound_samples(&mut self, memory: &mut GameMemoryRegion, sound: &mut SoundBuffer) {
        let GameCode::Loaded(game) = self else {
            sound.samples_mut().fill(0);
            return;
        };
        let mut abi_memory = memory.as_abi();
        let mut abi_sound = sound.as_abi();
        // SAFETY: as above.
        unsafe { (game.get_sound_samples)(&mut abi_memory, &mut abi_sound) };
        memory.sync_from_abi(&abi_memory);
    }
}

/// Watches the game library on disk and owns the current [`GameCode`].
#[derive(Debug)]
pub struct GameCodeLoader {
    source_path: PathBuf,
    temp_dir: PathBuf,
    last_write_time: Option<SystemTime>,
    load_counter: u32,
    code: GameCode,
}

impl GameCodeLoader {
    /// Watch `source_path`, placing loaded copies in `temp_dir`.
    pub fn new(source_path: impl Into<PathBuf>, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            temp_dir: temp_dir.into(),
            last_write_time: None,
            load_counter: 0,
            code: GameCode::Stub,
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn code(&self) -> &GameCode {
        &self.code
    }

    pub fn game(&mut self) -> &mut GameCode {
        &mut self.code
    }

    pub fn is_loaded(&self) -> bool {
        self.code.is_loaded()
    }

    /// Reload if the library changed since the last successful load.
    ///
    /// Call between frames only. Returns `Ok(true)` when new code was
    /// swapped in. On error the previous code stays in place.
    pub fn poll(&mut self) -> Result<bool, ReloadError> {
        let modified = std::fs::metadata(&self.source_path)
            .and_then(|meta| meta.modified())
            .map_err(|e| ReloadError::Metadata {
                path: self.source_path.clone(),
                source: e,
            })?;

        if self.last_write_time == Some(modified) {
            return Ok(false);
        }

        let temp_path = self.next_temp_path();
        match LoadedGame::load(&self.source_path, temp_path) {
            Ok(game) => {
                tracing::info!(
                    "Loaded game code from {} (copy {})",
                    self.source_path.display(),
                    game.temp_path().display()
                );
                self.code = GameCode::Loaded(game);
                self.last_write_time = Some(modified);
                Ok(true)
            }
            Err(e) => {
                // Missing entry points: wait for the next build.
                if matches!(e, ReloadError::MissingSymbol { .. }) {
                    self.last_write_time = Some(modified);
                }
                Err(e)
            }
        }
    }

    /// Poll and log failures instead of returning them.
    pub fn poll_and_log(&mut self) -> bool {
        match self.poll() {
            Ok(reloaded) => reloaded,
            Err(ReloadError::Metadata { .. }) if self.is_loaded() => false,
            Err(e) => {
                tracing::warn!("Game code reload failed: {}", e);
                false
            }
        }
    }

    fn next_temp_path(&mut self) -> PathBuf {
        self.load_counter += 1;
        let stem = self
            .source_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| GAME_LIBRARY_NAME.to_string());
        let mut name = format!("{}_{}_{}", stem, self.load_counter, std::process::id());
        if let Some(ext) = self.source_path.extension() {
            name.push('.');
            name.push_str(&ext.to_string_lossy());
        }
        self.temp_dir.join(name)
    }
}

/// Default library location: next to the running executable.
pub fn default_library_path() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.with_file_name(libloading::library_filename(GAME_LIBRARY_NAME)))
}

fn remove_temp(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        tracing::debug!("Could not remove {}: {}", path.display(), e);
    }
}

fn symbol_name(symbol: &[u8]) -> String {
    String::from_utf8_lossy(symbol.strip_suffix(&[0]).unwrap_or(symbol)).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SoundBuffer;
    use handmade_shared::InputFrame;

    // ============================================================================
    // Stub
    // ============================================================================

    #[test]
    fn test_stub_is_a_noop() {
        let mut memory = GameMemoryRegion::new(256, 256).unwrap();
        let mut buffer = FrameBuffer::new(8, 8);
        let mut sound = SoundBuffer::new(48_000, 64).unwrap();
        sound.prepare(64);
        sound.samples_mut().fill(123);

        let mut code = GameCode::Stub;
        code.update_and_render(&mut memory, &InputFrame::default(), &mut buffer);
        code.get_sound_samples(&mut memory, &mut sound);

        assert!(memory.as_bytes().iter().all(|&b| b == 0));
        assert!(!memory.is_initialized());
        assert!(buffer.bytes().iter().all(|&b| b == 0));
        assert!(sound.samples().iter().all(|&s| s == 0));
    }

    // ============================================================================
    // Loader
    // ============================================================================

    #[test]
    fn test_missing_library_keeps_stub() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = GameCodeLoader::new(dir.path().join("missing.so"), dir.path());
        assert!(matches!(loader.poll(), Err(ReloadError::Metadata { .. })));
        assert!(!loader.poll_and_log());
        assert!(!loader.is_loaded());
    }

    #[test]
    fn test_invalid_library_is_rejected_and_copy_removed() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("garbage.so");
        std::fs::write(&source, b"not a shared library").unwrap();
        let temp_dir = dir.path().join("loaded");
        std::fs::create_dir(&temp_dir).unwrap();

        let mut loader = GameCodeLoader::new(&source, &temp_dir);
        assert!(matches!(loader.poll(), Err(ReloadError::Load { .. })));
        assert!(!loader.is_loaded());
        assert_eq!(std::fs::read_dir(&temp_dir).unwrap().count(), 0);
    }

    #[test]
    fn test_copy_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("game.so");
        std::fs::write(&source, b"x").unwrap();
        let mut loader = GameCodeLoader::new(&source, dir.path().join("no-such-dir"));
        assert!(matches!(loader.poll(), Err(ReloadError::Copy { .. })));
        assert!(!loader.is_loaded());
    }

    #[test]
    fn test_temp_names_are_unique() {
        let mut loader = GameCodeLoader::new("/tmp/libhandmade_game.so", "/tmp");
        let first = loader.next_temp_path();
        let second = loader.next_temp_path();
        assert_ne!(first, second);
        let name = first.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("libhandmade_game_1_"));
        assert!(name.ends_with(".so"));
    }

    #[test]
    fn test_symbol_name_strips_nul() {
        assert_eq!(symbol_name(UPDATE_AND_RENDER_SYMBOL), "game_update_and_render");
    }
}
