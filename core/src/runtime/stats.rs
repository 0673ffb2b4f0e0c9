//! Per-frame timing statistics

/// Timing of one complete frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub ms_per_frame: f32,
    pub fps: f32,
    pub mega_cycles_per_frame: f32,
}

impl FrameStats {
    pub fn measure(seconds: f32, cycles: u64) -> Self {
        let fps = if seconds > 0.0 { 1.0 / seconds } else { 0.0 };
        Self {
            ms_per_frame: seconds * 1000.0,
            fps,
            mega_cycles_per_frame: cycles as f32 / 1_000_000.0,
        }
    }
}

impl std::fmt::Display for FrameStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.2}ms/f, {:.2}f/s, {:.2}mc/f",
            self.ms_per_frame, self.fps, self.mega_cycles_per_frame
        )
    }
}
