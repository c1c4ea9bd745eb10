use lockstep_shared::FrameIndex;

/// Supplies the local side of a session: the input captured on every input
/// tick, and the state a hosted session starts from.
pub trait InputProvider<S, I> {
    fn current_input(&mut self, frame_index: FrameIndex) -> I;

    fn start_state(&mut self) -> S;
}
