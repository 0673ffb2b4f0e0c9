//! Fixed-rate frame pacing

use std::time::Duration;

use tracing::warn;

use crate::clock::{ClockSource, Timestamp};

/// Loop lifecycle. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    /// Events are still pumped but the game is not updated
    Paused,
    Stopped,
}

/// Pacing configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PacerConfig {
    /// Game logic rate in Hz
    pub game_update_hz: f32,
    /// Whether OS sleeps can be trusted at millisecond granularity
    pub sleep_is_granular: bool,
    /// Busy-wait the remainder of the frame after sleeping
    pub spin_wait: bool,
}

impl PacerConfig {
    /// Run logic at half the monitor refresh rate.
    pub fn for_monitor(monitor_refresh_hz: u32) -> Self {
        Self {
            game_update_hz: monitor_refresh_hz.max(2) as f32 / 2.0,
            ..Self::default()
        }
    }
}

impl Default for PacerConfig {
    fn default() -> Self {
        Self {
            game_update_hz: 30.0,
            sleep_is_granular: true,
            spin_wait: true,
        }
    }
}

/// How a frame's deadline went.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    OnTime,
    /// Work alone exceeded the frame budget
    Missed { work_seconds: f32 },
}

/// Holds each tick to `1 / game_update_hz` seconds.
///
/// There is no catch-up: a late frame is logged and the next one starts
/// immediately, and the game still advances one fixed tick.
#[derive(Debug, Clone)]
pub struct FramePacer {
    config: PacerConfig,
    target_seconds_per_frame: f32,
    state: LoopState,
    last_counter: Timestamp,
    flip_counter: Timestamp,
    missed_frames: u64,
    missed_sleeps: u64,
}

impl FramePacer {
    pub fn new(config: PacerConfig, now: Timestamp) -> Self {
        let target_seconds_per_frame = 1.0 / config.game_update_hz.max(1.0);
        Self {
            config,
            target_seconds_per_frame,
            state: LoopState::Running,
            last_counter: now,
            flip_counter: now,
            missed_frames: 0,
            missed_sleeps: 0,
        }
    }

    pub fn config(&self) -> &PacerConfig {
        &self.config
    }

    pub fn target_seconds_per_frame(&self) -> f32 {
        self.target_seconds_per_frame
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_stopped(&self) -> bool {
        self.state == LoopState::Stopped
    }

    /// Toggle between `Running` and `Paused`. No effect once stopped.
    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            LoopState::Running => LoopState::Paused,
            LoopState::Paused => LoopState::Running,
            LoopState::Stopped => LoopState::Stopped,
        };
    }

    pub fn stop(&mut self) {
        self.state = LoopState::Stopped;
    }

    /// Frames whose work alone exceeded the budget.
    pub fn missed_frames(&self) -> u64 {
        self.missed_frames
    }

    /// Sleeps that woke past the deadline.
    pub fn missed_sleeps(&self) -> u64 {
        self.missed_sleeps
    }

    pub fn frame_start(&self) -> Timestamp {
        self.last_counter
    }

    /// Time since the last frame was handed to the display.
    pub fn seconds_since_flip<C: ClockSource + ?Sized>(&self, clock: &C) -> f32 {
        clock.elapsed_seconds(self.flip_counter, clock.now())
    }

    /// Sleep, then spin, until the frame budget is used up.
    ///
    /// If the work already overran, log one missed frame and return at once
    /// without sleeping.
    pub fn wait_for_frame_end<C: ClockSource + ?Sized>(&mut self, clock: &mut C) -> FrameOutcome {
        let target = self.target_seconds_per_frame;
        let work_seconds = clock.elapsed_seconds(self.last_counter, clock.now());

        if work_seconds >= target {
            self.missed_frames += 1;
            warn!(
                "Missed frame: work took {:.2}ms, budget is {:.2}ms",
                work_seconds * 1000.0,
                target * 1000.0
            );
            return FrameOutcome::Missed { work_seconds };
        }

        if self.config.sleep_is_granular {
            let sleep_ms = (1000.0 * (target - work_seconds)) as u64;
            if sleep_ms > 0 {
                clock.sleep(Duration::from_millis(sleep_ms));
            }
        }

        let after_sleep = clock.elapsed_seconds(self.last_counter, clock.now());
        if after_sleep > target {
            self.missed_sleeps += 1;
            warn!(
                "Missed sleep: woke {:.2}ms late",
                (after_sleep - target) * 1000.0
            );
        }

        if self.config.spin_wait {
            while clock.elapsed_seconds(self.last_counter, clock.now()) < target {
                std::hint::spin_loop();
            }
        }

        FrameOutcome::OnTime
    }

    /// Record the moment the frame was presented.
    pub fn mark_flip(&mut self, now: Timestamp) {
        self.flip_counter = now;
    }

    /// Close the frame's timing window and open the next one.
    ///
    /// Returns the seconds the whole frame took.
    pub fn end_frame(&mut self, now: Timestamp, frequency: u64) -> f32 {
        let seconds = crate::clock::seconds_elapsed(self.last_counter, now, frequency);
        self.last_counter = now;
        seconds
    }
}
