use crate::simulation::simulation_frame::SimulationFrame;

/// Applies one frame's inputs to the game state.
///
/// Must be deterministic: the same state and frame have to produce the
/// same result on every peer.
pub trait InputHandler<S, I> {
    fn apply_inputs(&mut self, state: &mut S, frame: &SimulationFrame<I>);
}

impl<S, I, F> InputHandler<S, I> for F
where
    F: FnMut(&mut S, &SimulationFrame<I>),
{
    fn apply_inputs(&mut self, state: &mut S, frame: &SimulationFrame<I>) {
        self(state, frame)
    }
}
