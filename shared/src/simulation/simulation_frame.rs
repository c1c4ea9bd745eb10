use std::collections::{btree_map, BTreeMap};

use crate::types::{FrameIndex, PeerId};

/// Every known input for one frame, keyed by peer
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationFrame<I> {
    frame_index: FrameIndex,
    inputs: BTreeMap<PeerId, I>,
}

impl<I> SimulationFrame<I> {
    pub fn new(frame_index: FrameIndex) -> Self {
        Self {
            frame_index,
            inputs: BTreeMap::new(),
        }
    }

    pub fn with_input(frame_index: FrameIndex, peer_id: PeerId, input: I) -> Self {
        let mut frame = Self::new(frame_index);
        frame.set_input(peer_id, input);
        frame
    }

    pub fn frame_index(&self) -> FrameIndex {
        self.frame_index
    }

    /// Records a peer's input, replacing any earlier one
    pub fn set_input(&mut self, peer_id: PeerId, input: I) -> Option<I> {
        self.inputs.insert(peer_id, input)
    }

    pub fn input(&self, peer_id: PeerId) -> Option<&I> {
        self.inputs.get(&peer_id)
    }

    /// Takes every input from `other`, keeping inputs from peers it does not
    /// mention
    pub fn merge(&mut self, other: SimulationFrame<I>) {
        self.inputs.extend(other.inputs);
    }

    /// Inputs in ascending peer id order
    pub fn iter(&self) -> btree_map::Iter<'_, PeerId, I> {
        self.inputs.iter()
    }

    pub fn peer_ids(&self) -> impl Iterator<Item = PeerId> + '_ {
        self.inputs.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

impl<'a, I> IntoIterator for &'a SimulationFrame<I> {
    type Item = (&'a PeerId, &'a I);
    type IntoIter = btree_map::Iter<'a, PeerId, I>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
