use thiserror::Error;

use lockstep_serde::SerdeErr;

use crate::{types::FrameIndex, wire::message_type::MessageType};

/// Errors that can occur while encoding or decoding a message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    /// A zero-length payload carries no message type
    #[error("Received an empty message")]
    Empty,

    /// The leading byte does not name a message type
    #[error("Unknown message type byte {byte}")]
    UnknownMessageType { byte: u8 },

    /// The payload ended early or held an invalid value
    #[error("Malformed {message_type:?} message: {source}")]
    Malformed {
        message_type: MessageType,
        #[source]
        source: SerdeErr,
    },

    /// An Input message must carry between 1 and 255 inputs
    #[error("Input message must carry between 1 and 255 inputs, got {count}")]
    InvalidInputCount { count: usize },

    /// The frames covered by an Input message would start below i32::MIN
    #[error("Input message for frames ending at {highest_frame_index} with {count} input(s) starts before the first representable frame")]
    FrameIndexUnderflow {
        highest_frame_index: FrameIndex,
        count: usize,
    },

    /// Bytes were left over after a complete message
    #[error("{count} trailing byte(s) after {message_type:?} message")]
    TrailingBytes {
        message_type: MessageType,
        count: usize,
    },
}
