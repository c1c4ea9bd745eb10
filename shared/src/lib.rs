//! # Lockstep Shared
//! Frame readiness, playout-delayed clocks, the deterministic simulation,
//! peer bookkeeping and wire messages shared by every lockstep peer.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use lockstep_serde::{ByteCounter, ByteReader, ByteWrite, ByteWriter, Serde, SerdeErr};

mod clock;
mod constants;
mod frame_buffer;
mod peer;
mod simulation;
mod state;
mod types;
mod wire;

pub use clock::{
    frame_ready_info::FrameReadyInfo,
    manual_clock::ManualClock,
    offset_clock::OffsetClock,
    playout_delayed_clock::{PlayoutDelayedClock, PlayoutState},
    tick_source::{dispatch_tick, TickListener, TickSource},
    time_clock::TimeClock,
};
pub use constants::{
    DEFAULT_FRAME_BUFFER, DEFAULT_MAX_PEER_DELAY, DEFAULT_PEER_COUNT, DEFAULT_PLAYOUT_DELAY,
    DEFAULT_PORT, DEFAULT_TICK_RATE, FIRST_FRAME_INDEX, MAX_FRAME_WINDOW, MAX_INPUTS_PER_MESSAGE,
    NO_ACKNOWLEDGED_FRAME,
};
pub use frame_buffer::{FrameBuffer, FrameBufferError};
pub use peer::{
    error::LateDataError,
    peer::Peer,
    unacknowledged_queue::{UnacknowledgedData, UnacknowledgedQueue},
};
pub use simulation::{
    error::SimulationError, input_handler::InputHandler, simulation::Simulation,
    simulation_frame::SimulationFrame,
};
pub use state::{Input, State};
pub use types::{ConnectionId, FrameIndex, PeerId};
pub use wire::{
    error::MessageError, input_message::InputMessage, message::Message,
    message_type::MessageType, network_frame::NetworkFrame,
};
