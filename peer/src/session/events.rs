use std::{mem, vec::IntoIter};

use lockstep_shared::FrameIndex;

use crate::error::NetworkError;

/// Everything a session produced during one tick
pub struct SessionEvents<S> {
    started: Option<FrameIndex>,
    executed_frames: Vec<(FrameIndex, S)>,
    errors: Vec<NetworkError>,
    empty: bool,
}

impl<S> SessionEvents<S> {
    pub(crate) fn new() -> Self {
        Self {
            started: None,
            executed_frames: Vec::new(),
            errors: Vec::new(),
            empty: true,
        }
    }

    // Public

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: SessionEvent<S>>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: SessionEvent<S>>(&self) -> bool {
        V::has(self)
    }

    // Crate-public

    pub(crate) fn push_start(&mut self, start_frame: FrameIndex) {
        self.started = Some(start_frame);
        self.empty = false;
    }

    pub(crate) fn push_executed_frame(&mut self, frame_index: FrameIndex, state: S) {
        self.executed_frames.push((frame_index, state));
        self.empty = false;
    }

    pub(crate) fn push_error(&mut self, error: NetworkError) {
        self.errors.push(error);
        self.empty = false;
    }
}

// Event Trait
pub trait SessionEvent<S> {
    type Iter;

    fn iter(events: &mut SessionEvents<S>) -> Self::Iter;

    fn has(events: &SessionEvents<S>) -> bool;
}

// StartEvent, the frame the synchronized simulation starts at
pub struct StartEvent;
impl<S> SessionEvent<S> for StartEvent {
    type Iter = std::option::IntoIter<FrameIndex>;

    fn iter(events: &mut SessionEvents<S>) -> Self::Iter {
        events.started.take().into_iter()
    }

    fn has(events: &SessionEvents<S>) -> bool {
        events.started.is_some()
    }
}

// ExecuteFrameEvent, each executed frame with the state it produced
pub struct ExecuteFrameEvent;
impl<S> SessionEvent<S> for ExecuteFrameEvent {
    type Iter = IntoIter<(FrameIndex, S)>;

    fn iter(events: &mut SessionEvents<S>) -> Self::Iter {
        mem::take(&mut events.executed_frames).into_iter()
    }

    fn has(events: &SessionEvents<S>) -> bool {
        !events.executed_frames.is_empty()
    }
}

// NetworkErrorEvent
pub struct NetworkErrorEvent;
impl<S> SessionEvent<S> for NetworkErrorEvent {
    type Iter = IntoIter<NetworkError>;

    fn iter(events: &mut SessionEvents<S>) -> Self::Iter {
        mem::take(&mut events.errors).into_iter()
    }

    fn has(events: &SessionEvents<S>) -> bool {
        !events.errors.is_empty()
    }
}
