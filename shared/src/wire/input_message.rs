use lockstep_serde::{ByteReader, ByteWrite, Serde, SerdeErr};

use crate::{
    constants::MAX_INPUTS_PER_MESSAGE,
    state::Input,
    types::{FrameIndex, PeerId},
    wire::{error::MessageError, message_type::MessageType, network_frame::NetworkFrame},
};

/// Consecutive inputs ending at `highest_frame_index`.
///
/// On the wire the first input is written in full and each later one is
/// either flagged identical to its predecessor or written in full.
#[derive(Clone, Debug, PartialEq)]
pub struct InputMessage<I> {
    highest_frame_index: FrameIndex,
    inputs: Vec<I>,
}

impl<I: Input> InputMessage<I> {
    pub fn new(highest_frame_index: FrameIndex, inputs: Vec<I>) -> Result<Self, MessageError> {
        let count = inputs.len();
        if count == 0 || count > MAX_INPUTS_PER_MESSAGE {
            return Err(MessageError::InvalidInputCount { count });
        }
        first_frame_index(highest_frame_index, count)?;
        Ok(Self {
            highest_frame_index,
            inputs,
        })
    }

    pub fn highest_frame_index(&self) -> FrameIndex {
        self.highest_frame_index
    }

    /// Frame of the first input. Validated on construction.
    pub fn first_frame_index(&self) -> FrameIndex {
        self.highest_frame_index - (self.inputs.len() as FrameIndex - 1)
    }

    pub fn inputs(&self) -> &[I] {
        &self.inputs
    }

    /// Each input with the frame it belongs to, oldest first
    pub fn frames(&self) -> impl Iterator<Item = (FrameIndex, &I)> {
        let first_frame_index = self.first_frame_index();
        self.inputs
            .iter()
            .enumerate()
            .map(move |(offset, input)| (first_frame_index + offset as FrameIndex, input))
    }

    pub fn into_network_frames(self, peer_id: PeerId) -> Vec<NetworkFrame<I>> {
        let first_frame_index = self.first_frame_index();
        self.inputs
            .into_iter()
            .enumerate()
            .map(|(offset, input)| NetworkFrame {
                frame_index: first_frame_index + offset as FrameIndex,
                peer_id,
                input,
            })
            .collect()
    }

    pub(crate) fn write(&self, writer: &mut dyn ByteWrite) {
        self.highest_frame_index.ser(writer);
        (self.inputs.len() as u8).ser(writer);

        let mut previous: Option<&I> = None;
        for input in &self.inputs {
            match previous {
                None => input.ser(writer),
                Some(previous) => {
                    let identical = previous == input;
                    identical.ser(writer);
                    if !identical {
                        input.ser(writer);
                    }
                }
            }
            previous = Some(input);
        }
    }

    pub(crate) fn read(reader: &mut ByteReader) -> Result<Self, MessageError> {
        let highest_frame_index = FrameIndex::de(reader).map_err(malformed)?;
        let count = u8::de(reader).map_err(malformed)? as usize;
        if count == 0 {
            return Err(MessageError::InvalidInputCount { count });
        }
        first_frame_index(highest_frame_index, count)?;

        let mut inputs: Vec<I> = Vec::with_capacity(count);
        inputs.push(I::de(reader).map_err(malformed)?);
        for _ in 1..count {
            let identical = bool::de(reader).map_err(malformed)?;
            let input = match (identical, inputs.last()) {
                (true, Some(previous)) => previous.clone(),
                _ => I::de(reader).map_err(malformed)?,
            };
            inputs.push(input);
        }

        Ok(Self {
            highest_frame_index,
            inputs,
        })
    }
}

fn first_frame_index(highest_frame_index: FrameIndex, count: usize) -> Result<FrameIndex, MessageError> {
    highest_frame_index
        .checked_sub(count as FrameIndex - 1)
        .ok_or(MessageError::FrameIndexUnderflow {
            highest_frame_index,
            count,
        })
}

fn malformed(source: SerdeErr) -> MessageError {
    MessageError::Malformed {
        message_type: MessageType::Input,
        source,
    }
}
