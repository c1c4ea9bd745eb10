//! # Lockstep Peer
//! A lockstep peer that exchanges acknowledged, delta-encoded inputs with the
//! other peers of a session over a pluggable transport, and executes a
//! deterministic simulation in step with them.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

#[macro_use]
extern crate cfg_if;

pub mod transport;
pub mod shared {
    pub use lockstep_shared::{
        dispatch_tick, ByteReader, ByteWrite, ByteWriter, ConnectionId, FrameIndex, Input,
        InputHandler, ManualClock, PeerId, PlayoutDelayedClock, PlayoutState, Serde, SerdeErr,
        Simulation, SimulationFrame, State, TickListener, TickSource, TimeClock,
    };
}

mod error;
mod network;
mod session;

pub use error::{NetworkError, SessionError};
pub use network::{
    events::{
        AcknowledgeFrameEvent, ConnectEvent, DisconnectEvent, ErrorEvent, NetworkEvent,
        NetworkEvents, PeerIdentifiedEvent, ReceiveFrameEvent, StateReceivedEvent,
        StateSynchronizedEvent,
    },
    network::Network,
    network_config::NetworkConfig,
};
pub use session::{
    events::{ExecuteFrameEvent, NetworkErrorEvent, SessionEvent, SessionEvents, StartEvent},
    input_provider::InputProvider,
    session::Session,
    session_config::SessionConfig,
};
pub use transport::{
    ChannelKind, ConnectError, SendError, Transport, TransportEvent, TransportEventKind,
};
