use log::trace;

use lockstep_shared::{FrameIndex, Input, Simulation, State, TickListener};

use crate::{error::SessionError, network::network::Network, session::input_provider::InputProvider};

/// The input clock's listener for a single tick. The early phase captures
/// local input into the simulation and the outgoing queue, the late phase
/// flushes the queue to every peer.
pub(crate) struct InputCapture<'a, S: State, I: Input, P: InputProvider<S, I>> {
    pub(crate) provider: &'a mut P,
    pub(crate) simulation: &'a mut Simulation<S, I>,
    pub(crate) network: &'a mut Network<S, I>,
    pub(crate) max_captured_tick: &'a mut FrameIndex,
}

impl<S: State, I: Input, P: InputProvider<S, I>> TickListener<SessionError>
    for InputCapture<'_, S, I, P>
{
    fn on_tick(&mut self, tick: FrameIndex) -> Result<(), SessionError> {
        if tick <= *self.max_captured_tick {
            return Ok(());
        }
        *self.max_captured_tick = tick;

        let frame_index = tick - 1;
        let input = self.provider.current_input(frame_index);
        self.simulation
            .set_input(input.clone(), self.network.my_peer_id(), frame_index)?;
        self.network.queue_input(input, Some(frame_index))?;
        trace!("captured input for frame {}", frame_index);
        Ok(())
    }

    fn on_late_tick(&mut self, tick: FrameIndex) -> Result<(), SessionError> {
        self.network.send_data(tick - 1);
        Ok(())
    }
}
