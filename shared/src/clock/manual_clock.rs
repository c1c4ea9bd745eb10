use std::time::Duration;

use crate::{clock::tick_source::TickSource, types::FrameIndex};

/// A tick source that only moves when told to
pub struct ManualClock {
    elapsed_frames: FrameIndex,
    start_frame: FrameIndex,
    running: bool,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            elapsed_frames: 0,
            start_frame: 0,
            running: true,
        }
    }

    /// Fires one tick, unless stopped.
    pub fn step(&mut self) -> Option<FrameIndex> {
        if !self.running {
            return None;
        }
        self.elapsed_frames = self.elapsed_frames.saturating_add(1);
        Some(self.elapsed_frame_count())
    }

    /// Sets the elapsed frame count (excluding the start frame). Fires a tick
    /// when the count changes.
    pub fn set_elapsed_frames(&mut self, elapsed_frames: FrameIndex) -> Option<FrameIndex> {
        if self.elapsed_frames == elapsed_frames {
            return None;
        }
        self.elapsed_frames = elapsed_frames;
        Some(self.elapsed_frame_count())
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for ManualClock {
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
        self.running = running;
    }

    // Time passing does not move a manual clock
    fn advance(&mut self, _elapsed: Duration) -> Vec<FrameIndex> {
        Vec::new()
    }
}
