use thiserror::Error;

use crate::{constants::MAX_FRAME_WINDOW, types::FrameIndex};

/// Errors that can occur when addressing a FrameBuffer slot
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameBufferError {
    /// The frame has already been purged from the buffer
    #[error("Frame {frame_index} is older than the retained window starting at frame {base}")]
    FrameTooOld { frame_index: FrameIndex, base: FrameIndex },

    /// Storing the frame would grow the buffer past its maximum capacity
    #[error("Frame {frame_index} is beyond the retained window of {max_capacity} frames starting at frame {base}")]
    FrameTooNew {
        frame_index: FrameIndex,
        base: FrameIndex,
        max_capacity: usize,
    },
}

/// A ring of per-frame records, indexed by `frame % capacity`.
///
/// Every stored frame lies in `[base, base + capacity)`. Frames below `base`
/// have been purged and can no longer be stored. Storing a frame past the end
/// doubles the capacity until it fits, up to `max_capacity`.
pub struct FrameBuffer<T> {
    slots: Vec<Option<(FrameIndex, T)>>,
    base: FrameIndex,
    len: usize,
    max_capacity: usize,
}

impl<T> FrameBuffer<T> {
    pub fn new(base: FrameIndex, capacity: usize) -> Self {
        Self::with_max_capacity(base, capacity, MAX_FRAME_WINDOW)
    }

    pub fn with_max_capacity(base: FrameIndex, capacity: usize, max_capacity: usize) -> Self {
        let max_capacity = max_capacity.max(1).next_power_of_two();
        let capacity = capacity.clamp(1, max_capacity).next_power_of_two();
        Self {
            slots: Self::empty_slots(capacity),
            base,
            len: 0,
            max_capacity,
        }
    }

    pub fn base(&self) -> FrameIndex {
        self.base
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, frame_index: FrameIndex) -> bool {
        self.get(frame_index).is_some()
    }

    pub fn get(&self, frame_index: FrameIndex) -> Option<&T> {
        match &self.slots[self.slot_index(frame_index)] {
            Some((index, value)) if *index == frame_index => Some(value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, frame_index: FrameIndex) -> Option<&mut T> {
        let slot = self.slot_index(frame_index);
        match &mut self.slots[slot] {
            Some((index, value)) if *index == frame_index => Some(value),
            _ => None,
        }
    }

    /// Stores a value for the frame, returning whatever was there before.
    pub fn insert(&mut self, frame_index: FrameIndex, value: T) -> Result<Option<T>, FrameBufferError> {
        self.reserve(frame_index)?;
        let slot = self.slot_index(frame_index);
        let previous = self.slots[slot].replace((frame_index, value));
        if previous.is_none() {
            self.len += 1;
        }
        Ok(previous.map(|(_, value)| value))
    }

    pub fn get_or_insert_with<F: FnOnce() -> T>(
        &mut self,
        frame_index: FrameIndex,
        create: F,
    ) -> Result<&mut T, FrameBufferError> {
        self.reserve(frame_index)?;
        let slot = self.slot_index(frame_index);
        let entry = &mut self.slots[slot];
        if entry.is_none() {
            self.len += 1;
        }
        let (_, value) = entry.get_or_insert_with(|| (frame_index, create()));
        Ok(value)
    }

    pub fn remove(&mut self, frame_index: FrameIndex) -> Option<T> {
        let slot = self.slot_index(frame_index);
        match &self.slots[slot] {
            Some((index, _)) if *index == frame_index => {}
            _ => return None,
        }
        self.len -= 1;
        self.slots[slot].take().map(|(_, value)| value)
    }

    /// Drops every frame at or below `frame_index` and moves the window
    /// start past it.
    pub fn purge_through(&mut self, frame_index: FrameIndex) {
        if frame_index < self.base {
            return;
        }
        let new_base = frame_index.saturating_add(1);
        let distance = i64::from(new_base) - i64::from(self.base);
        if distance >= self.capacity() as i64 {
            self.clear();
        } else {
            for index in self.base..new_base {
                self.remove(index);
            }
        }
        self.base = new_base;
    }

    /// Empties the buffer and restarts its window at `base`.
    pub fn reset(&mut self, base: FrameIndex) {
        self.clear();
        self.base = base;
    }

    pub fn iter(&self) -> impl Iterator<Item = (FrameIndex, &T)> {
        self.slots
            .iter()
            .filter_map(|slot| slot.as_ref().map(|(index, value)| (*index, value)))
    }

    fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.len = 0;
    }

    fn reserve(&mut self, frame_index: FrameIndex) -> Result<(), FrameBufferError> {
        if frame_index < self.base {
            return Err(FrameBufferError::FrameTooOld {
                frame_index,
                base: self.base,
            });
        }
        let offset = (i64::from(frame_index) - i64::from(self.base)) as usize;
        if offset < self.capacity() {
            return Ok(());
        }
        let new_capacity = (offset + 1).next_power_of_two();
        if new_capacity > self.max_capacity {
            return Err(FrameBufferError::FrameTooNew {
                frame_index,
                base: self.base,
                max_capacity: self.max_capacity,
            });
        }
        self.grow(new_capacity);
        Ok(())
    }

    fn grow(&mut self, new_capacity: usize) {
        let old_slots = std::mem::replace(&mut self.slots, Self::empty_slots(new_capacity));
        for (index, value) in old_slots.into_iter().flatten() {
            let slot = self.slot_index(index);
            self.slots[slot] = Some((index, value));
        }
    }

    fn slot_index(&self, frame_index: FrameIndex) -> usize {
        i64::from(frame_index).rem_euclid(self.capacity() as i64) as usize
    }

    fn empty_slots(capacity: usize) -> Vec<Option<(FrameIndex, T)>> {
        (0..capacity).map(|_| None).collect()
    }
}
