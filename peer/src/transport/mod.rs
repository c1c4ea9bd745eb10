use thiserror::Error;

use lockstep_shared::ConnectionId;

cfg_if! {
    if #[cfg(feature = "transport_udp")] {
        pub mod udp;
    }
}

/// Delivery guarantee requested for a send
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Handshake traffic that must arrive (PeerInfo, State, AcknowledgeState)
    Reliable,
    /// Input and acknowledgment traffic, recovered by retransmission
    Unreliable,
}

impl ChannelKind {
    pub fn to_byte(self) -> u8 {
        match self {
            ChannelKind::Unreliable => 0,
            ChannelKind::Reliable => 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEventKind {
    Connect,
    Data {
        channel: ChannelKind,
        payload: Box<[u8]>,
    },
    Disconnect,
}

/// Something that happened on a connection
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportEvent {
    pub connection_id: ConnectionId,
    pub kind: TransportEventKind,
}

impl TransportEvent {
    pub fn connect(connection_id: ConnectionId) -> Self {
        Self {
            connection_id,
            kind: TransportEventKind::Connect,
        }
    }

    pub fn data(connection_id: ConnectionId, channel: ChannelKind, payload: Box<[u8]>) -> Self {
        Self {
            connection_id,
            kind: TransportEventKind::Data { channel, payload },
        }
    }

    pub fn disconnect(connection_id: ConnectionId) -> Self {
        Self {
            connection_id,
            kind: TransportEventKind::Disconnect,
        }
    }
}

/// Errors that can occur while sending a payload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// No connection exists with this id
    #[error("Cannot send to unknown connection {connection_id}")]
    UnknownConnection { connection_id: ConnectionId },

    /// The underlying socket refused the payload
    #[error("Failed to send {length} byte(s) to connection {connection_id}: {reason}")]
    Failed {
        connection_id: ConnectionId,
        length: usize,
        reason: String,
    },
}

/// Errors that can occur while connecting to a remote host
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// The host name could not be resolved to an address
    #[error("Cannot resolve host '{hostname}'")]
    UnresolvedHost { hostname: String },

    /// The connection attempt failed
    #[error("Failed to connect to '{hostname}': {reason}")]
    Failed { hostname: String, reason: String },
}

/// Moves payloads between peers.
///
/// Implementations queue what they receive and hand it out through
/// `receive`, which the network drains once per tick. `connect` must raise a
/// local `Connect` event for the new connection so both sides run the same
/// handshake.
pub trait Transport {
    fn send(
        &mut self,
        connection_id: ConnectionId,
        channel: ChannelKind,
        payload: &[u8],
    ) -> Result<(), SendError>;

    fn connect(&mut self, hostname: &str) -> Result<ConnectionId, ConnectError>;

    fn receive(&mut self) -> Option<TransportEvent>;
}
