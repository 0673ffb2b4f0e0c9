//! Frame loop orchestration
//!
//! Drives one fixed-rate tick at a time. The platform pumps OS events into
//! the input snapshot, then calls [`HandmadeLoop::run_frame`], presents the
//! back buffer and finishes with [`HandmadeLoop::end_frame`].

mod game_loop;
mod pacer;
mod stats;

pub use game_loop::{HandmadeLoop, StartupError, TickReport};
pub use pacer::{FrameOutcome, FramePacer, LoopState, PacerConfig};
pub use stats::FrameStats;
