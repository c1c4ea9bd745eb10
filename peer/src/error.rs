use thiserror::Error;

use lockstep_shared::{ConnectionId, LateDataError, MessageError, SimulationError};

use crate::transport::{ConnectError, SendError};

/// Problems the network reports while it keeps running
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// A payload could not be sent; retransmission covers lost inputs
    #[error("Send failed: {0}")]
    Send(#[from] SendError),

    /// A received payload was not a valid message and was discarded
    #[error("Discarded message from connection {connection_id}: {source}")]
    Decode {
        connection_id: ConnectionId,
        #[source]
        source: MessageError,
    },

    /// Input arrived from a connection that has not introduced itself
    #[error("Discarded input from connection {connection_id}, which has no peer id yet")]
    UnidentifiedPeer { connection_id: ConnectionId },
}

/// Errors returned by session operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Simulation error: {0}")]
    Simulation(#[from] SimulationError),

    #[error("Late input: {0}")]
    LateData(#[from] LateDataError),

    #[error("Connect failed: {0}")]
    Connect(#[from] ConnectError),
}
