use crate::wire::error::MessageError;

/// The leading byte of every message
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    // Acknowledges every input up to a frame
    AcknowledgeInput = 1,
    // A full state snapshot, possibly absent
    State = 2,
    // A delta-encoded run of inputs
    Input = 3,
    // Sent instead of Input when nothing is waiting for acknowledgment
    Empty = 4,
    // Announces the sender's peer id
    PeerInfo = 5,
    // Acknowledges a State message
    AcknowledgeState = 6,
}

impl MessageType {
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    pub fn from_byte(byte: u8) -> Result<Self, MessageError> {
        match byte {
            1 => Ok(MessageType::AcknowledgeInput),
            2 => Ok(MessageType::State),
            3 => Ok(MessageType::Input),
            4 => Ok(MessageType::Empty),
            5 => Ok(MessageType::PeerInfo),
            6 => Ok(MessageType::AcknowledgeState),
            byte => Err(MessageError::UnknownMessageType { byte }),
        }
    }
}
