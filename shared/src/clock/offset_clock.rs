use std::time::Duration;

use crate::{clock::tick_source::TickSource, types::FrameIndex};

/// Reports another tick source's frames shifted by a fixed offset.
///
/// A negative offset gives a clock that trails its inner clock, e.g. for
/// rendering interpolated frames behind the simulation. With
/// `skip_negative_frames` set, ticks that land below zero are swallowed.
pub struct OffsetClock<C: TickSource> {
    inner: C,
    offset: FrameIndex,
    skip_negative_frames: bool,
}

impl<C: TickSource> OffsetClock<C> {
    pub fn new(inner: C, offset: FrameIndex, skip_negative_frames: bool) -> Self {
        Self {
            inner,
            offset,
            skip_negative_frames,
        }
    }

    pub fn offset(&self) -> FrameIndex {
        self.offset
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.inner
    }
}

impl<C: TickSource> TickSource for OffsetClock<C> {
    fn elapsed_frame_count(&self) -> FrameIndex {
        self.inner.elapsed_frame_count().saturating_add(self.offset)
    }

    fn start_frame(&self) -> FrameIndex {
        self.inner.start_frame()
    }

    fn set_start_frame(&mut self, start_frame: FrameIndex) {
        self.inner.set_start_frame(start_frame);
    }

    fn is_running(&self) -> bool {
        self.inner.is_running()
    }

    fn set_running(&mut self, running: bool) {
        self.inner.set_running(running);
    }

    fn advance(&mut self, elapsed: Duration) -> Vec<FrameIndex> {
        let offset = self.offset;
        let skip_negative_frames = self.skip_negative_frames;
        self.inner
            .advance(elapsed)
            .into_iter()
            .map(|frame_index| frame_index.saturating_add(offset))
            .filter(|frame_index| !skip_negative_frames || *frame_index >= 0)
            .collect()
    }
}
