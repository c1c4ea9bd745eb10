use std::time::{Duration, Instant};

use crate::{clock::tick_source::TickSource, types::FrameIndex};

/// A fixed-rate tick source driven by elapsed time.
///
/// Time can be fed deterministically with [`TimeClock::advance`] or polled
/// from the wall clock with [`TimeClock::update`]. Starting a stopped clock
/// throws away any partial interval it had accumulated.
pub struct TimeClock {
    frame_duration: Duration,
    accumulated: Duration,
    elapsed_frames: FrameIndex,
    start_frame: FrameIndex,
    running: bool,
    last_instant: Option<Instant>,
}

impl TimeClock {
    /// Creates a stopped clock ticking `tick_rate` times per second
    pub fn new(tick_rate: u32) -> Self {
        Self {
            frame_duration: Duration::from_nanos(1_000_000_000 / u64::from(tick_rate.max(1))),
            accumulated: Duration::ZERO,
            elapsed_frames: 0,
            start_frame: 0,
            running: false,
            last_instant: None,
        }
    }

    pub fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    /// Advances by the wall-clock time since the previous update
    pub fn update(&mut self, now: Instant) -> Vec<FrameIndex> {
        let elapsed = match self.last_instant {
            Some(last_instant) => now.saturating_duration_since(last_instant),
            None => Duration::ZERO,
        };
        self.last_instant = Some(now);
        self.advance(elapsed)
    }
}

impl TickSource for TimeClock {
    fn elapsed_frame_count(&self) -> FrameIndex {
        self.elapsed_frames.saturating_add(self.start_frame)
    }

    fn start_frame(&self) -> FrameIndex {
        self.start_frame
    }

    fn set_start_frame(&mut self, start_frame: FrameIndex) {
        self.start_frame = start_frame;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn set_running(&mut self, running: bool) {
        if running && !self.running {
            self.accumulated = Duration::ZERO;
            self.last_instant = None;
        }
        self.running = running;
    }

    fn advance(&mut self, elapsed: Duration) -> Vec<FrameIndex> {
        if !self.running {
            return Vec::new();
        }
        self.accumulated += elapsed;

        let mut ticks = Vec::new();
        while self.accumulated >= self.frame_duration {
            self.accumulated -= self.frame_duration;
            self.elapsed_frames = self.elapsed_frames.saturating_add(1);
            ticks.push(self.elapsed_frame_count());
        }
        ticks
    }
}
