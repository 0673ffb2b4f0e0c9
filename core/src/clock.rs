//! Monotonic clock sampling
//!
//! [`ClockSource`] is the seam between the frame loop and real time. The
//! system implementation reads [`std::time::Instant`]; tests drive a manual
//! clock instead.

use std::time::{Duration, Instant};

/// Opaque monotonic timestamp in clock ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn from_ticks(ticks: u64) -> Self {
        Self(ticks)
    }

    pub fn ticks(self) -> u64 {
        self.0
    }
}

/// A monotonic, high-resolution time source.
pub trait ClockSource {
    /// Current timestamp.
    fn now(&self) -> Timestamp;

    /// Ticks per second. Queried once at startup and cached by callers.
    fn frequency(&self) -> u64;

    /// Suspend the calling thread for roughly `duration`.
    fn sleep(&mut self, duration: Duration);

    /// Seconds between two timestamps of this clock.
    fn elapsed_seconds(&self, start: Timestamp, end: Timestamp) -> f32 {
        seconds_elapsed(start, end, self.frequency())
    }
}

/// `(end - start) / frequency`, saturating at zero if `end` precedes `start`.
pub fn seconds_elapsed(start: Timestamp, end: Timestamp, frequency: u64) -> f32 {
    if frequency == 0 {
        return 0.0;
    }
    (end.0.saturating_sub(start.0) as f64 / frequency as f64) as f32
}

/// Raw CPU cycle counter, for coarse profiling only.
pub fn cycle_counter() -> u64 {
    #[cfg(target_arch = "x86_64")]
    {
        // SAFETY: rdtsc has no preconditions on x86_64.
        unsafe { std::arch::x86_64::_rdtsc() }
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        use std::sync::OnceLock;
        static START: OnceLock<Instant> = OnceLock::new();
        START.get_or_init(Instant::now).elapsed().as_nanos() as u64
    }
}

/// Wall clock backed by [`Instant`], one tick per nanosecond.
#[derive(Debug, Clone)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub const FREQUENCY: u64 = 1_000_000_000;

    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSource for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.epoch.elapsed().as_nanos() as u64)
    }

    fn frequency(&self) -> u64 {
        Self::FREQUENCY
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
