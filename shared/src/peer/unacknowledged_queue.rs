use std::collections::{btree_map, BTreeMap};

use crate::types::FrameIndex;

/// One outbound input awaiting acknowledgment
#[derive(Clone, Debug, PartialEq)]
pub struct UnacknowledgedData<I> {
    pub frame_index: FrameIndex,
    pub input: I,
}

/// Outbound inputs ordered by frame, with cached bounds.
///
/// `min` and `max` are either both `None` (empty) or both keys that are
/// present in the queue.
pub struct UnacknowledgedQueue<I> {
    entries: BTreeMap<FrameIndex, UnacknowledgedData<I>>,
    min: Option<FrameIndex>,
    max: Option<FrameIndex>,
}

impl<I> UnacknowledgedQueue<I> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            min: None,
            max: None,
        }
    }

    pub fn min(&self) -> Option<FrameIndex> {
        self.min
    }

    pub fn max(&self) -> Option<FrameIndex> {
        self.max
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, frame_index: FrameIndex) -> Option<&UnacknowledgedData<I>> {
        self.entries.get(&frame_index)
    }

    /// Oldest first
    pub fn iter(&self) -> btree_map::Values<'_, FrameIndex, UnacknowledgedData<I>> {
        self.entries.values()
    }

    /// Appends after the newest entry (at frame 0 when empty) and returns the
    /// frame it was stored at
    pub fn enqueue(&mut self, input: I) -> FrameIndex {
        let frame_index = self.max.map_or(0, |max| max.saturating_add(1));
        self.set(input, frame_index);
        frame_index
    }

    /// Stores input at an explicit frame, returning the input it replaced
    pub fn set(&mut self, input: I, frame_index: FrameIndex) -> Option<I> {
        let previous = self
            .entries
            .insert(frame_index, UnacknowledgedData { frame_index, input });
        self.refresh_bounds();
        previous.map(|data| data.input)
    }

    /// Drops every entry at or below `frame_index`, returning how many were
    /// removed
    pub fn acknowledge_frame_and_older(&mut self, frame_index: FrameIndex) -> usize {
        let before = self.entries.len();
        if frame_index == FrameIndex::MAX {
            self.entries.clear();
        } else {
            self.entries = self.entries.split_off(&(frame_index + 1));
        }
        self.refresh_bounds();
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.refresh_bounds();
    }

    fn refresh_bounds(&mut self) {
        self.min = self.entries.keys().next().copied();
        self.max = self.entries.keys().next_back().copied();
    }
}

impl<I> Default for UnacknowledgedQueue<I> {
    fn default() -> Self {
        Self::new()
    }
}
