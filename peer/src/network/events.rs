use std::{mem, vec::IntoIter};

use lockstep_shared::{ConnectionId, FrameIndex, PeerId, SimulationFrame};

use crate::error::NetworkError;

/// Everything the network observed during one call to `receive`
pub struct NetworkEvents<I> {
    connections: Vec<ConnectionId>,
    disconnections: Vec<ConnectionId>,
    identified_peers: Vec<(ConnectionId, PeerId)>,
    received_states: Vec<FrameIndex>,
    synchronized: Option<FrameIndex>,
    received_frames: Vec<(PeerId, SimulationFrame<I>)>,
    acknowledged_frames: Vec<FrameIndex>,
    errors: Vec<NetworkError>,
    empty: bool,
}

impl<I> NetworkEvents<I> {
    pub(crate) fn new() -> Self {
        Self {
            connections: Vec::new(),
            disconnections: Vec::new(),
            identified_peers: Vec::new(),
            received_states: Vec::new(),
            synchronized: None,
            received_frames: Vec::new(),
            acknowledged_frames: Vec::new(),
            errors: Vec::new(),
            empty: true,
        }
    }

    // Public

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: NetworkEvent<I>>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: NetworkEvent<I>>(&self) -> bool {
        V::has(self)
    }

    // Crate-public

    pub(crate) fn push_connection(&mut self, connection_id: ConnectionId) {
        self.connections.push(connection_id);
        self.empty = false;
    }

    pub(crate) fn push_disconnection(&mut self, connection_id: ConnectionId) {
        self.disconnections.push(connection_id);
        self.empty = false;
    }

    pub(crate) fn push_identified_peer(&mut self, connection_id: ConnectionId, peer_id: PeerId) {
        self.identified_peers.push((connection_id, peer_id));
        self.empty = false;
    }

    pub(crate) fn push_received_state(&mut self, frame_index: FrameIndex) {
        self.received_states.push(frame_index);
        self.empty = false;
    }

    pub(crate) fn push_synchronized(&mut self, state_start_frame: FrameIndex) {
        self.synchronized = Some(state_start_frame);
        self.empty = false;
    }

    pub(crate) fn push_received_frame(&mut self, peer_id: PeerId, frame: SimulationFrame<I>) {
        self.received_frames.push((peer_id, frame));
        self.empty = false;
    }

    pub(crate) fn push_acknowledged_frame(&mut self, frame_index: FrameIndex) {
        self.acknowledged_frames.push(frame_index);
        self.empty = false;
    }

    pub(crate) fn push_error(&mut self, error: NetworkError) {
        self.errors.push(error);
        self.empty = false;
    }
}

// Event Trait
pub trait NetworkEvent<I> {
    type Iter;

    fn iter(events: &mut NetworkEvents<I>) -> Self::Iter;

    fn has(events: &NetworkEvents<I>) -> bool;
}

// ConnectEvent
pub struct ConnectEvent;
impl<I> NetworkEvent<I> for ConnectEvent {
    type Iter = IntoIter<ConnectionId>;

    fn iter(events: &mut NetworkEvents<I>) -> Self::Iter {
        mem::take(&mut events.connections).into_iter()
    }

    fn has(events: &NetworkEvents<I>) -> bool {
        !events.connections.is_empty()
    }
}

// DisconnectEvent
pub struct DisconnectEvent;
impl<I> NetworkEvent<I> for DisconnectEvent {
    type Iter = IntoIter<ConnectionId>;

    fn iter(events: &mut NetworkEvents<I>) -> Self::Iter {
        mem::take(&mut events.disconnections).into_iter()
    }

    fn has(events: &NetworkEvents<I>) -> bool {
        !events.disconnections.is_empty()
    }
}

// PeerIdentifiedEvent
pub struct PeerIdentifiedEvent;
impl<I> NetworkEvent<I> for PeerIdentifiedEvent {
    type Iter = IntoIter<(ConnectionId, PeerId)>;

    fn iter(events: &mut NetworkEvents<I>) -> Self::Iter {
        mem::take(&mut events.identified_peers).into_iter()
    }

    fn has(events: &NetworkEvents<I>) -> bool {
        !events.identified_peers.is_empty()
    }
}

// StateReceivedEvent, the frame of each adopted remote state
pub struct StateReceivedEvent;
impl<I> NetworkEvent<I> for StateReceivedEvent {
    type Iter = IntoIter<FrameIndex>;

    fn iter(events: &mut NetworkEvents<I>) -> Self::Iter {
        mem::take(&mut events.received_states).into_iter()
    }

    fn has(events: &NetworkEvents<I>) -> bool {
        !events.received_states.is_empty()
    }
}

// StateSynchronizedEvent, raised once with the frame the shared state starts at
pub struct StateSynchronizedEvent;
impl<I> NetworkEvent<I> for StateSynchronizedEvent {
    type Iter = std::option::IntoIter<FrameIndex>;

    fn iter(events: &mut NetworkEvents<I>) -> Self::Iter {
        events.synchronized.take().into_iter()
    }

    fn has(events: &NetworkEvents<I>) -> bool {
        events.synchronized.is_some()
    }
}

// ReceiveFrameEvent
pub struct ReceiveFrameEvent;
impl<I> NetworkEvent<I> for ReceiveFrameEvent {
    type Iter = IntoIter<(PeerId, SimulationFrame<I>)>;

    fn iter(events: &mut NetworkEvents<I>) -> Self::Iter {
        mem::take(&mut events.received_frames).into_iter()
    }

    fn has(events: &NetworkEvents<I>) -> bool {
        !events.received_frames.is_empty()
    }
}

// AcknowledgeFrameEvent
pub struct AcknowledgeFrameEvent;
impl<I> NetworkEvent<I> for AcknowledgeFrameEvent {
    type Iter = IntoIter<FrameIndex>;

    fn iter(events: &mut NetworkEvents<I>) -> Self::Iter {
        mem::take(&mut events.acknowledged_frames).into_iter()
    }

    fn has(events: &NetworkEvents<I>) -> bool {
        !events.acknowledged_frames.is_empty()
    }
}

// ErrorEvent
pub struct ErrorEvent;
impl<I> NetworkEvent<I> for ErrorEvent {
    type Iter = IntoIter<NetworkError>;

    fn iter(events: &mut NetworkEvents<I>) -> Self::Iter {
        mem::take(&mut events.errors).into_iter()
    }

    fn has(events: &NetworkEvents<I>) -> bool {
        !events.errors.is_empty()
    }
}
