use thiserror::Error;

use crate::{frame_buffer::FrameBufferError, types::FrameIndex};

/// Errors that can occur while recording or executing simulation frames
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// A frame was due but no input handler was configured
    #[error("Cannot execute frame {frame_index}: no input handler is configured")]
    MissingInputHandler { frame_index: FrameIndex },

    /// A frame was due before any starting state was installed
    #[error("Cannot execute frame {frame_index}: the simulation has no state yet")]
    MissingState { frame_index: FrameIndex },

    /// Input arrived for a frame that has already been executed
    #[error("Frame {frame_index} has already executed (next frame is {elapsed_frame_count})")]
    FrameAlreadyExecuted {
        frame_index: FrameIndex,
        elapsed_frame_count: FrameIndex,
    },

    /// The frame lies outside the retained frame window
    #[error("Frame buffer error: {0}")]
    FrameBuffer(#[from] FrameBufferError),
}
