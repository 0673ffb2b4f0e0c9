//! Per-tick sequencing of input, game code, audio and pacing

use std::path::PathBuf;

use handmade_shared::InputFrame;
use thiserror::Error;
use tracing::{debug, trace, warn};

use super::pacer::{FrameOutcome, FramePacer, LoopState, PacerConfig};
use super::stats::FrameStats;
use crate::audio::{
    AudioDeviceState, AudioSyncEngine, SoundBuffer, SoundDevice, TimeMarkRing, WritePlan,
    draw_sync_display,
};
use crate::clock::{ClockSource, cycle_counter};
use crate::config::PlatformConfig;
use crate::frame_buffer::FrameBuffer;
use crate::input::DoubleBufferedInput;
use crate::memory::{GameMemoryRegion, MemoryError};
use crate::reload::GameModule;
use crate::replay::{InputReplay, ReplayMode};

/// Failures that stop the platform before the first frame.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error("clock source reports a frequency of zero")]
    NoClockFrequency,

    #[error("game update rate must be a positive number of Hz, got {0}")]
    InvalidUpdateRate(f32),
}

/// What happened during one [`HandmadeLoop::run_frame`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub paused: bool,
    pub frame: FrameOutcome,
    pub plan: Option<WritePlan>,
    pub frames_written: u32,
}

/// The platform's application context: everything one tick touches.
pub struct HandmadeLoop<C: ClockSource> {
    clock: C,
    frequency: u64,
    pacer: FramePacer,
    input: DoubleBufferedInput,
    audio: AudioSyncEngine,
    sound: SoundBuffer,
    memory: GameMemoryRegion,
    frame_buffer: FrameBuffer,
    time_marks: TimeMarkRing,
    replay: InputReplay,
    sync_display: bool,
    last_cycles: u64,
}

impl<C: ClockSource> HandmadeLoop<C> {
    /// Allocate everything up front. Any failure here is fatal.
    pub fn new(
        clock: C,
        config: &PlatformConfig,
        game_update_hz: f32,
        replay_path: impl Into<PathBuf>,
    ) -> Result<Self, StartupError> {
        let frequency = clock.frequency();
        if frequency == 0 {
            return Err(StartupError::NoClockFrequency);
        }
        if !game_update_hz.is_finite() || game_update_hz <= 0.0 {
            return Err(StartupError::InvalidUpdateRate(game_update_hz));
        }

        let pacer = FramePacer::new(
            PacerConfig {
                game_update_hz,
                sleep_is_granular: config.timing.sleep_is_granular,
                spin_wait: config.timing.spin_wait,
            },
            clock.now(),
        );

        let audio_config = &config.audio;
        let safety_bytes = AudioDeviceState::safety_bytes_for(
            audio_config.samples_per_second,
            pacer.target_seconds_per_frame(),
            audio_config.safety_frame_fraction,
        );
        let state = AudioDeviceState::new(
            audio_config.samples_per_second,
            audio_config.buffer_seconds,
            safety_bytes,
        );
        let sound = SoundBuffer::new(
            state.samples_per_second,
            state.buffer_size / state.bytes_per_sample,
        )?;
        debug!(
            "Audio ring {} bytes, safety {} bytes, {:.2} Hz logic",
            state.buffer_size,
            state.safety_bytes,
            1.0 / pacer.target_seconds_per_frame()
        );

        let memory = GameMemoryRegion::new(
            config.memory.permanent_bytes(),
            config.memory.transient_bytes(),
        )?;

        let mut input = DoubleBufferedInput::new();
        input.begin_frame();

        Ok(Self {
            clock,
            frequency,
            pacer,
            input,
            audio: AudioSyncEngine::new(state),
            sound,
            memory,
            frame_buffer: FrameBuffer::new(config.video.width, config.video.height),
            time_marks: TimeMarkRing::new(config.debug.time_mark_count),
            replay: InputReplay::new(replay_path),
            sync_display: config.debug.sync_display,
            last_cycles: cycle_counter(),
        })
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn pacer(&self) -> &FramePacer {
        &self.pacer
    }

    pub fn audio(&self) -> &AudioSyncEngine {
        &self.audio
    }

    pub fn memory(&self) -> &GameMemoryRegion {
        &self.memory
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.frame_buffer
    }

    pub fn time_marks(&self) -> &TimeMarkRing {
        &self.time_marks
    }

    /// Last tick's snapshot and the one being filled for this tick.
    pub fn input_mut(&mut self) -> (&InputFrame, &mut InputFrame) {
        self.input.split_mut()
    }

    pub fn state(&self) -> LoopState {
        self.pacer.state()
    }

    pub fn is_stopped(&self) -> bool {
        self.pacer.is_stopped()
    }

    pub fn toggle_pause(&mut self) {
        self.pacer.toggle_pause();
        debug!("Loop state: {:?}", self.pacer.state());
    }

    pub fn stop(&mut self) {
        self.replay.stop();
        self.pacer.stop();
    }

    /// Reallocate the back buffer for a new window size. Zero sizes
    /// (minimized windows) keep the current buffer.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        debug!("Resizing back buffer to {}x{}", width, height);
        self.frame_buffer.resize(width, height);
    }

    pub fn replay_mode(&self) -> ReplayMode {
        self.replay.mode()
    }

    /// Advance the replay slot: idle, recording, looping playback.
    pub fn toggle_replay(&mut self) -> ReplayMode {
        match self.replay.toggle(&mut self.memory) {
            Ok(mode) => mode,
            Err(e) => {
                warn!("Input replay failed: {}", e);
                ReplayMode::Idle
            }
        }
    }

    /// Zero the device ring and start it playing.
    pub fn start_audio(&mut self, device: &mut dyn SoundDevice) {
        if let Err(e) = self.audio.clear(device) {
            warn!("Failed to clear sound buffer: {}", e);
        }
        if let Err(e) = device.start_playback() {
            warn!("Failed to start sound playback: {}", e);
        }
    }

    /// Update the game, write this tick's audio and wait out the frame budget.
    ///
    /// Call after OS events for this tick have been pumped into
    /// [`Self::input_mut`]. The back buffer is ready to present afterwards.
    pub fn run_frame(
        &mut self,
        game: &mut dyn GameModule,
        device: &mut dyn SoundDevice,
    ) -> TickReport {
        if self.pacer.state() != LoopState::Running {
            let frame = self.pacer.wait_for_frame_end(&mut self.clock);
            return TickReport {
                paused: true,
                frame,
                plan: None,
                frames_written: 0,
            };
        }

        let target = self.pacer.target_seconds_per_frame();
        let new_input = self.input.new_frame_mut();
        new_input.seconds_to_advance = target;
        if let Err(e) = self.replay.process(&mut self.memory, new_input) {
            warn!("Input replay failed, stopping: {}", e);
            self.replay.stop();
        }

        game.update_and_render(&mut self.memory, self.input.new_frame(), &mut self.frame_buffer);

        let cursors = device.current_cursors();
        let seconds_since_flip = self.pacer.seconds_since_flip(&self.clock);
        let plan = self.audio.plan(cursors, seconds_since_flip, target);

        let mut frames_written = 0;
        if let Some(plan) = &plan {
            self.sound.prepare(plan.sample_count());
            game.get_sound_samples(&mut self.memory, &mut self.sound);
            frames_written = self
                .audio
                .commit(device, plan, self.sound.samples())
                .unwrap_or(0);
            self.time_marks.record_output(plan);
        }

        let frame = self.pacer.wait_for_frame_end(&mut self.clock);

        if self.sync_display {
            draw_sync_display(
                &mut self.frame_buffer,
                &self.time_marks,
                self.audio.state().buffer_size,
            );
        }

        TickReport {
            paused: false,
            frame,
            plan,
            frames_written,
        }
    }

    /// Close the tick after the back buffer was presented.
    ///
    /// Records the flip, starts the next timing window and swaps the input
    /// snapshots so the next tick's events land in a fresh one.
    pub fn end_frame(&mut self, device: &mut dyn SoundDevice) -> FrameStats {
        self.pacer.mark_flip(self.clock.now());
        if let Ok(cursors) = device.current_cursors() {
            self.time_marks.record_flip(cursors);
        }

        let seconds = self.pacer.end_frame(self.clock.now(), self.frequency);
        let cycles = cycle_counter();
        let stats = FrameStats::measure(seconds, cycles.wrapping_sub(self.last_cycles));
        self.last_cycles = cycles;
        trace!("{}", stats);

        self.input.swap();
        self.input.begin_frame();
        stats
    }
}
