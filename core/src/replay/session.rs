//! Record / playback state machine

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use handmade_shared::InputFrame;
use tracing::info;

use super::ReplayError;
use super::binary::{ReplayReader, ReplayWriter};
use crate::memory::GameMemoryRegion;

/// What the replay system is doing this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayMode {
    Idle,
    Recording,
    Playing,
}

enum ReplayState {
    Idle,
    Recording(ReplayWriter<BufWriter<File>>),
    Playing(ReplayReader<BufReader<File>>),
}

/// One replay slot backed by a file.
///
/// Each toggle advances `Idle -> Recording -> Playing -> Idle`.
pub struct InputReplay {
    path: PathBuf,
    state: ReplayState,
}

impl InputReplay {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: ReplayState::Idle,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> ReplayMode {
        match self.state {
            ReplayState::Idle => ReplayMode::Idle,
            ReplayState::Recording(_) => ReplayMode::Recording,
            ReplayState::Playing(_) => ReplayMode::Playing,
        }
    }

    /// Advance to the next mode. On error the slot drops back to idle.
    pub fn toggle(&mut self, memory: &mut GameMemoryRegion) -> Result<ReplayMode, ReplayError> {
        let state = std::mem::replace(&mut self.state, ReplayState::Idle);
        self.state = match state {
            ReplayState::Idle => self.begin_recording(memory)?,
            ReplayState::Recording(writer) => {
                let frames = writer.frames_written();
                writer.finish()?;
                info!("Recorded {} frames to {}", frames, self.path.display());
                self.begin_playback(memory)?
            }
            ReplayState::Playing(_) => {
                info!("Stopped replay playback");
                ReplayState::Idle
            }
        };
        Ok(self.mode())
    }

    /// Stop whatever is happening without starting the next mode.
    pub fn stop(&mut self) {
        if let ReplayState::Recording(writer) = std::mem::replace(&mut self.state, ReplayState::Idle)
            && let Err(e) = writer.finish()
        {
            tracing::warn!("Failed to finish replay recording: {}", e);
        }
    }

    /// Record this tick's input, or replace it with the recorded one.
    ///
    /// At the end of the recording, memory is restored from the snapshot and
    /// playback starts over from the first frame.
    pub fn process(
        &mut self,
        memory: &mut GameMemoryRegion,
        input: &mut InputFrame,
    ) -> Result<(), ReplayError> {
        match &mut self.state {
            ReplayState::Idle => Ok(()),
            ReplayState::Recording(writer) => Ok(writer.write_frame(input)?),
            ReplayState::Playing(reader) => {
                let frame = match reader.next_frame()? {
                    Some(frame) => Some(frame),
                    None => {
                        reader.restore_memory(memory)?;
                        reader.next_frame()?
                    }
                };
                if let Some(frame) = frame {
                    *input = frame;
                }
                Ok(())
            }
        }
    }

    fn begin_recording(&self, memory: &GameMemoryRegion) -> Result<ReplayState, ReplayError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = ReplayWriter::new(BufWriter::new(File::create(&self.path)?));
        writer.write_header(memory.as_bytes())?;
        info!("Recording input to {}", self.path.display());
        Ok(ReplayState::Recording(writer))
    }

    fn begin_playback(&self, memory: &mut GameMemoryRegion) -> Result<ReplayState, ReplayError> {
        let file = BufReader::new(File::open(&self.path)?);
        let mut reader = ReplayReader::open(file, memory.total_size() as u64)?;
        reader.restore_memory(memory)?;
        info!("Playing back input from {}", self.path.display());
        Ok(ReplayState::Playing(reader))
    }
}

impl std::fmt::Debug for InputReplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputReplay")
            .field("path", &self.path)
            .field("mode", &self.mode())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_mouse(x: i32) -> InputFrame {
        InputFrame {
            mouse_x: x,
            ..Default::default()
        }
    }

    #[test]
    fn test_toggle_cycles_modes() {
        let dir = tempfile::tempdir().unwrap();
        let mut memory = GameMemoryRegion::new(16, 16).unwrap();
        let mut replay = InputReplay::new(dir.path().join("loop.hmi"));

        assert_eq!(replay.mode(), ReplayMode::Idle);
        assert_eq!(replay.toggle(&mut memory).unwrap(), ReplayMode::Recording);
        assert_eq!(replay.toggle(&mut memory).unwrap(), ReplayMode::Playing);
        assert_eq!(replay.toggle(&mut memory).unwrap(), ReplayMode::Idle);
    }

    #[test]
    fn test_playback_loops_and_restores_memory() {
        let dir = tempfile::tempdir().unwrap();
        let mut memory = GameMemoryRegion::new(16, 16).unwrap();
        memory.as_bytes_mut()[0] = 42;
        let mut replay = InputReplay::new(dir.path().join("loop.hmi"));

        replay.toggle(&mut memory).unwrap();
        for x in 1..=3 {
            let mut input = frame_with_mouse(x);
            replay.process(&mut memory, &mut input).unwrap();
            memory.as_bytes_mut()[0] += 1;
        }
        assert_eq!(memory.as_bytes()[0], 45);

        replay.toggle(&mut memory).unwrap();
        assert_eq!(memory.as_bytes()[0], 42);

        let mut seen = Vec::new();
        for _ in 0..5 {
            let mut input = frame_with_mouse(-1);
            replay.process(&mut memory, &mut input).unwrap();
            seen.push(input.mouse_x);
            memory.as_bytes_mut()[0] += 1;
        }
        assert_eq!(seen, vec![1, 2, 3, 1, 2]);
        // restored at the loop point, then advanced twice
        assert_eq!(memory.as_bytes()[0], 44);
    }

    #[test]
    fn test_idle_leaves_input_alone() {
        let mut memory = GameMemoryRegion::new(8, 0).unwrap();
        let mut replay = InputReplay::new("unused.hmi");
        let mut input = frame_with_mouse(7);
        replay.process(&mut memory, &mut input).unwrap();
        assert_eq!(input.mouse_x, 7);
    }

    #[test]
    fn test_stop_finishes_recording() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stop.hmi");
        let mut memory = GameMemoryRegion::new(8, 0).unwrap();
        let mut replay = InputReplay::new(&path);
        replay.toggle(&mut memory).unwrap();
        replay.process(&mut memory, &mut InputFrame::default()).unwrap();
        replay.stop();
        assert_eq!(replay.mode(), ReplayMode::Idle);
        assert!(std::fs::metadata(&path).unwrap().len() > 8);
    }
}
