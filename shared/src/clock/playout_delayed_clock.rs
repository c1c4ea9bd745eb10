use std::time::Duration;

use log::{debug, trace, warn};

use crate::{
    clock::{frame_ready_info::FrameReadyInfo, tick_source::TickSource},
    constants::FIRST_FRAME_INDEX,
    frame_buffer::FrameBuffer,
    types::{FrameIndex, PeerId},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayoutState {
    /// Waiting for the executable frontier to get `playout_delay` frames ahead.
    /// The driving tick source is paused.
    Buffering,
    /// Executing one frame per tick of the driving source
    Buffered,
}

/// Drives the simulation from per-frame readiness signals.
///
/// Each frame needs `peer_count` readiness signals. The highest executable
/// frame only ever moves forward through frames that are ready and whose
/// predecessors are all ready. The clock waits (Buffering) until that
/// frontier is `playout_delay` frames ahead, then steps once per tick of
/// the driving source (Buffered) until it catches up with the frontier, at
/// which point it buffers again.
///
/// Ticks report the frame count after stepping, so a tick of `t` means
/// frame `t - 1` may now execute.
pub struct PlayoutDelayedClock<C: TickSource> {
    inner: C,
    state: PlayoutState,
    running: bool,
    playout_delay: FrameIndex,
    peer_count: u8,
    first_frame_index: FrameIndex,
    elapsed_frame_count: FrameIndex,
    highest_executable_frame: FrameIndex,
    // false while `highest_executable_frame` is still the initial sentinel
    has_executable_frame: bool,
    frame_ready: FrameBuffer<FrameReadyInfo>,
}

impl<C: TickSource> PlayoutDelayedClock<C> {
    pub fn new(inner: C, playout_delay: FrameIndex, peer_count: u8, frame_buffer: usize) -> Self {
        let playout_delay = playout_delay.max(0);
        let mut clock = Self {
            inner,
            state: PlayoutState::Buffering,
            running: true,
            playout_delay,
            peer_count,
            first_frame_index: FIRST_FRAME_INDEX,
            elapsed_frame_count: FIRST_FRAME_INDEX,
            highest_executable_frame: initial_highest_frame(FIRST_FRAME_INDEX, playout_delay),
            has_executable_frame: false,
            frame_ready: FrameBuffer::new(FIRST_FRAME_INDEX, frame_buffer),
        };
        clock.inner.stop();
        clock
    }

    /// Restarts the clock at `first_frame_index`. Frames before it count as
    /// ready, which lets a peer join a session that is already running.
    pub fn set_first_frame_index(&mut self, first_frame_index: FrameIndex) {
        self.first_frame_index = first_frame_index;
        self.elapsed_frame_count = first_frame_index;
        self.highest_executable_frame = initial_highest_frame(first_frame_index, self.playout_delay);
        self.has_executable_frame = false;
        self.frame_ready.reset(first_frame_index);
        self.state = PlayoutState::Buffering;
        self.inner.stop();
    }

    pub fn first_frame_index(&self) -> FrameIndex {
        self.first_frame_index
    }

    pub fn state(&self) -> PlayoutState {
        self.state
    }

    pub fn playout_delay(&self) -> FrameIndex {
        self.playout_delay
    }

    pub fn peer_count(&self) -> u8 {
        self.peer_count
    }

    /// Before any frame is ready this is `first_frame_index - 1 - playout_delay`,
    /// saturated at `i32::MIN + playout_delay`
    pub fn highest_executable_frame(&self) -> FrameIndex {
        self.highest_executable_frame
    }

    pub fn frame_ready_info(&self, frame_index: FrameIndex) -> Option<&FrameReadyInfo> {
        self.frame_ready.get(frame_index)
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Records one more readiness signal for the frame
    pub fn mark_frame_ready(&mut self, frame_index: FrameIndex) {
        self.record_ready(frame_index, None);
    }

    /// Records that `peer_id` is ready for the frame. Repeated signals from
    /// the same peer for the same frame count once.
    pub fn mark_peer_ready(&mut self, frame_index: FrameIndex, peer_id: PeerId) {
        self.record_ready(frame_index, Some(peer_id));
    }

    /// Handles one tick of the driving source. Returns the new elapsed frame
    /// count if the clock stepped.
    pub fn on_inner_tick(&mut self) -> Option<FrameIndex> {
        if self.state == PlayoutState::Buffering && !self.try_resume() {
            return None;
        }

        if self.has_executable_frame && self.highest_executable_frame >= self.elapsed_frame_count {
            let executed = self.elapsed_frame_count;
            self.elapsed_frame_count = executed.saturating_add(1);
            // the executed record stays so its successor can still see it
            if let Some(stale) = executed.checked_sub(1) {
                self.frame_ready.purge_through(stale);
            }
            Some(self.elapsed_frame_count)
        } else {
            debug!(
                "playout buffer drained at frame {}, buffering",
                self.elapsed_frame_count
            );
            self.state = PlayoutState::Buffering;
            self.inner.stop();
            None
        }
    }

    fn record_ready(&mut self, frame_index: FrameIndex, peer_id: Option<PeerId>) {
        let peer_count = self.peer_count;

        if let Err(error) = self.frame_ready.get_or_insert_with(frame_index, FrameReadyInfo::new) {
            if frame_index < self.frame_ready.base() {
                trace!("ignoring readiness for executed frame {}", frame_index);
            } else {
                warn!("dropping readiness signal: {}", error);
            }
            return;
        }

        let prior_ready = if frame_index == self.first_frame_index {
            true
        } else if frame_index.saturating_sub(1) < self.frame_ready.base() {
            false
        } else {
            match self
                .frame_ready
                .get_or_insert_with(frame_index - 1, FrameReadyInfo::new)
            {
                Ok(prior) => prior.is_executable(peer_count),
                Err(_) => false,
            }
        };

        let Some(info) = self.frame_ready.get_mut(frame_index) else {
            return;
        };
        match peer_id {
            Some(peer_id) => {
                if !info.insert_peer(peer_id) {
                    return;
                }
            }
            None => info.increment(),
        }
        if prior_ready {
            info.set_all_prior_frames_ready();
        }
        if !info.is_executable(peer_count) {
            return;
        }

        if !self.has_executable_frame || frame_index > self.highest_executable_frame {
            self.highest_executable_frame = frame_index;
            self.has_executable_frame = true;
        }
        let mut next = frame_index;
        while next < FrameIndex::MAX {
            next += 1;
            match self.frame_ready.get_mut(next) {
                Some(info) if info.has_all_peers(peer_count) => {
                    info.set_all_prior_frames_ready();
                    if next > self.highest_executable_frame {
                        self.highest_executable_frame = next;
                    }
                }
                _ => break,
            }
        }
        trace!(
            "frame {} ready, highest executable frame is {}",
            frame_index,
            self.highest_executable_frame
        );

        if self.state == PlayoutState::Buffering {
            self.try_resume();
        }
    }

    fn try_resume(&mut self) -> bool {
        if !self.has_executable_frame {
            return false;
        }
        // widened so a frontier near i32::MIN still needs the full delay
        let buffered_through =
            i64::from(self.highest_executable_frame) - i64::from(self.playout_delay);
        if buffered_through < i64::from(self.elapsed_frame_count) {
            return false;
        }
        debug!(
            "playout buffer filled through frame {}, resuming at frame {}",
            self.highest_executable_frame, self.elapsed_frame_count
        );
        self.state = PlayoutState::Buffered;
        self.inner.set_running(self.running);
        true
    }
}

impl<C: TickSource> TickSource for PlayoutDelayedClock<C> {
    fn elapsed_frame_count(&self) -> FrameIndex {
        self.elapsed_frame_count
    }

    fn start_frame(&self) -> FrameIndex {
        self.first_frame_index
    }

    fn set_start_frame(&mut self, start_frame: FrameIndex) {
        self.set_first_frame_index(start_frame);
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn set_running(&mut self, running: bool) {
        self.running = running;
        self.inner
            .set_running(running && self.state == PlayoutState::Buffered);
    }

    fn advance(&mut self, elapsed: Duration) -> Vec<FrameIndex> {
        let mut ticks = Vec::new();
        for _ in self.inner.advance(elapsed) {
            match self.on_inner_tick() {
                Some(tick) => ticks.push(tick),
                None => break,
            }
        }
        ticks
    }
}

/// `first - 1 - delay`, saturating at `i32::MIN + delay` instead of wrapping
fn initial_highest_frame(first_frame_index: FrameIndex, playout_delay: FrameIndex) -> FrameIndex {
    first_frame_index
        .checked_sub(1)
        .and_then(|frame_index| frame_index.checked_sub(playout_delay))
        .unwrap_or(FrameIndex::MIN.saturating_add(playout_delay))
}
