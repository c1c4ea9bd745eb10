use log::{debug, trace, warn};

use crate::{
    clock::tick_source::TickListener,
    constants::FIRST_FRAME_INDEX,
    frame_buffer::FrameBuffer,
    simulation::{
        error::SimulationError, input_handler::InputHandler, simulation_frame::SimulationFrame,
    },
    state::{Input, State},
    types::{FrameIndex, PeerId},
};

/// Owns the canonical game state and executes one frame per tick.
///
/// A tick of `t` executes frame `t - 1`: every input recorded for that frame
/// is handed to the input handler (in ascending peer id order), the result
/// becomes the new state, and the frame plus everything older is dropped.
pub struct Simulation<S: State, I: Input> {
    state: Option<S>,
    frames: FrameBuffer<SimulationFrame<I>>,
    input_handler: Option<Box<dyn InputHandler<S, I>>>,
    start_frame: FrameIndex,
    elapsed_frame_count: FrameIndex,
}

impl<S: State, I: Input> Simulation<S, I> {
    pub fn new(frame_buffer: usize) -> Self {
        Self {
            state: None,
            frames: FrameBuffer::new(FIRST_FRAME_INDEX, frame_buffer),
            input_handler: None,
            start_frame: FIRST_FRAME_INDEX,
            elapsed_frame_count: FIRST_FRAME_INDEX,
        }
    }

    pub fn set_input_handler<H: InputHandler<S, I> + 'static>(&mut self, input_handler: H) {
        self.input_handler = Some(Box::new(input_handler));
    }

    pub fn has_input_handler(&self) -> bool {
        self.input_handler.is_some()
    }

    /// Installs the state the simulation starts from, and the first frame
    /// that will execute on top of it.
    pub fn set_start_state(&mut self, state: S, start_frame: FrameIndex) {
        debug!("simulation starting at frame {}", start_frame);
        self.state = Some(state);
        self.start_frame = start_frame;
        self.elapsed_frame_count = start_frame;
        if start_frame >= self.frames.base() {
            self.frames.purge_through(start_frame.saturating_sub(1));
        } else {
            self.frames.reset(start_frame);
        }
    }

    pub fn state(&self) -> Option<&S> {
        self.state.as_ref()
    }

    pub fn start_frame(&self) -> FrameIndex {
        self.start_frame
    }

    /// The next frame to execute
    pub fn elapsed_frame_count(&self) -> FrameIndex {
        self.elapsed_frame_count
    }

    pub fn frame(&self, frame_index: FrameIndex) -> Option<&SimulationFrame<I>> {
        self.frames.get(frame_index)
    }

    /// Records a peer's input for a frame that has not executed yet
    pub fn set_input(
        &mut self,
        input: I,
        peer_id: PeerId,
        frame_index: FrameIndex,
    ) -> Result<(), SimulationError> {
        if frame_index < self.elapsed_frame_count {
            return Err(SimulationError::FrameAlreadyExecuted {
                frame_index,
                elapsed_frame_count: self.elapsed_frame_count,
            });
        }
        self.frames
            .get_or_insert_with(frame_index, || SimulationFrame::new(frame_index))?
            .set_input(peer_id, input);
        Ok(())
    }

    /// Merges remotely received inputs into the frame. Returns false if the
    /// frame has already executed or lies outside the retained window.
    pub fn set_or_extend_frame(&mut self, partial: SimulationFrame<I>) -> bool {
        let frame_index = partial.frame_index();
        if frame_index < self.elapsed_frame_count {
            trace!("ignoring inputs for executed frame {}", frame_index);
            return false;
        }
        if let Some(frame) = self.frames.get_mut(frame_index) {
            frame.merge(partial);
            return true;
        }
        match self.frames.insert(frame_index, partial) {
            Ok(_) => true,
            Err(error) => {
                warn!("dropping inputs for frame {}: {}", frame_index, error);
                false
            }
        }
    }

    /// Executes frame `tick - 1` and returns the resulting state
    pub fn execute_tick(&mut self, tick: FrameIndex) -> Result<&S, SimulationError> {
        let frame_index = tick.saturating_sub(1);
        let Some(input_handler) = self.input_handler.as_mut() else {
            return Err(SimulationError::MissingInputHandler { frame_index });
        };
        let Some(mut state) = self.state.take() else {
            return Err(SimulationError::MissingState { frame_index });
        };
        if frame_index != self.elapsed_frame_count {
            warn!(
                "executing frame {} out of order, expected frame {}",
                frame_index, self.elapsed_frame_count
            );
        }

        let frame = self
            .frames
            .remove(frame_index)
            .unwrap_or_else(|| SimulationFrame::new(frame_index));
        input_handler.apply_inputs(&mut state, &frame);
        self.frames.purge_through(frame_index);
        self.elapsed_frame_count = tick;
        trace!("executed frame {} with {} input(s)", frame_index, frame.len());

        Ok(self.state.insert(state))
    }
}

impl<S: State, I: Input, E: From<SimulationError>> TickListener<E> for Simulation<S, I> {
    fn on_tick(&mut self, frame_index: FrameIndex) -> Result<(), E> {
        self.execute_tick(frame_index)?;
        Ok(())
    }
}
