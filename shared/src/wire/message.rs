use lockstep_serde::{ByteReader, ByteWrite, ByteWriter, Serde, SerdeErr};

use crate::{
    state::{Input, State},
    types::{FrameIndex, PeerId},
    wire::{error::MessageError, input_message::InputMessage, message_type::MessageType},
};

/// Every message peers exchange
#[derive(Clone, Debug, PartialEq)]
pub enum Message<S, I> {
    AcknowledgeInput { frame_index: FrameIndex },
    State { frame_index: FrameIndex, state: Option<S> },
    Input(InputMessage<I>),
    Empty { last_frame_index: FrameIndex },
    PeerInfo { peer_id: PeerId },
    AcknowledgeState,
}

impl<S: State, I: Input> Message<S, I> {
    pub fn message_type(&self) -> MessageType {
        match self {
            Message::AcknowledgeInput { .. } => MessageType::AcknowledgeInput,
            Message::State { .. } => MessageType::State,
            Message::Input(_) => MessageType::Input,
            Message::Empty { .. } => MessageType::Empty,
            Message::PeerInfo { .. } => MessageType::PeerInfo,
            Message::AcknowledgeState => MessageType::AcknowledgeState,
        }
    }

    pub fn write(&self, writer: &mut dyn ByteWrite) {
        self.message_type().to_byte().ser(writer);
        match self {
            Message::AcknowledgeInput { frame_index } => frame_index.ser(writer),
            Message::State { frame_index, state } => {
                frame_index.ser(writer);
                state.ser(writer);
            }
            Message::Input(input_message) => input_message.write(writer),
            Message::Empty { last_frame_index } => last_frame_index.ser(writer),
            Message::PeerInfo { peer_id } => peer_id.ser(writer),
            Message::AcknowledgeState => {}
        }
    }

    pub fn to_bytes(&self) -> Box<[u8]> {
        let mut writer = ByteWriter::new();
        self.write(&mut writer);
        writer.to_bytes()
    }

    /// Decodes exactly one message from `bytes`
    pub fn read(bytes: &[u8]) -> Result<Self, MessageError> {
        let mut reader = ByteReader::new(bytes);
        let type_byte = reader.read_byte().map_err(|_| MessageError::Empty)?;
        let message_type = MessageType::from_byte(type_byte)?;
        let malformed = |source: SerdeErr| MessageError::Malformed {
            message_type,
            source,
        };

        let message = match message_type {
            MessageType::AcknowledgeInput => Message::AcknowledgeInput {
                frame_index: FrameIndex::de(&mut reader).map_err(malformed)?,
            },
            MessageType::State => Message::State {
                frame_index: FrameIndex::de(&mut reader).map_err(malformed)?,
                state: Option::<S>::de(&mut reader).map_err(malformed)?,
            },
            MessageType::Input => Message::Input(InputMessage::read(&mut reader)?),
            MessageType::Empty => Message::Empty {
                last_frame_index: FrameIndex::de(&mut reader).map_err(malformed)?,
            },
            MessageType::PeerInfo => Message::PeerInfo {
                peer_id: PeerId::de(&mut reader).map_err(malformed)?,
            },
            MessageType::AcknowledgeState => Message::AcknowledgeState,
        };

        if !reader.is_empty() {
            return Err(MessageError::TrailingBytes {
                message_type,
                count: reader.remaining(),
            });
        }
        Ok(message)
    }
}
