use thiserror::Error;

use crate::types::{ConnectionId, FrameIndex};

/// Input was queued for a frame the protocol has already moved past
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LateDataError {
    /// Every peer has already acknowledged this frame
    #[error("Input for frame {frame_index} is late: frame {latest_acknowledged_frame} has already been acknowledged")]
    AlreadyAcknowledged {
        frame_index: FrameIndex,
        latest_acknowledged_frame: FrameIndex,
    },

    /// A newer frame is already waiting in a peer's outbound queue
    #[error("Input for frame {frame_index} is late: connection {connection_id} already queued frame {newest_queued_frame}")]
    OlderThanQueued {
        frame_index: FrameIndex,
        connection_id: ConnectionId,
        newest_queued_frame: FrameIndex,
    },
}
