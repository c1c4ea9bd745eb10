use crate::{
    simulation::simulation_frame::SimulationFrame,
    types::{FrameIndex, PeerId},
};

/// One decoded input from one peer, before it is merged into a
/// SimulationFrame
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkFrame<I> {
    pub frame_index: FrameIndex,
    pub peer_id: PeerId,
    pub input: I,
}

impl<I> NetworkFrame<I> {
    pub fn into_simulation_frame(self) -> SimulationFrame<I> {
        SimulationFrame::with_input(self.frame_index, self.peer_id, self.input)
    }
}
