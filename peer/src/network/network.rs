use std::{collections::BTreeMap, mem};

use log::{debug, info, trace, warn};

use lockstep_shared::{
    ConnectionId, FrameIndex, Input, InputMessage, LateDataError, Message, Peer, PeerId, State,
    MAX_INPUTS_PER_MESSAGE, NO_ACKNOWLEDGED_FRAME,
};

use crate::{
    error::NetworkError,
    network::{events::NetworkEvents, network_config::NetworkConfig},
    transport::{ChannelKind, ConnectError, Transport, TransportEvent, TransportEventKind},
};

/// Runs the lockstep protocol with every connected peer.
///
/// Local inputs are queued per peer until that peer acknowledges them, and
/// every flush resends the whole unacknowledged run. Inputs captured since
/// the latest state snapshot are kept, so a peer that is sent the snapshot
/// (a late joiner, or a reconnecting peer) also gets every input it needs to
/// continue from it. Received inputs,
/// acknowledgments and handshake progress are reported through the events
/// returned by [`Network::receive`].
pub struct Network<S: State, I: Input> {
    config: NetworkConfig,
    my_peer_id: PeerId,
    transport: Box<dyn Transport>,
    peers: BTreeMap<ConnectionId, Peer<I>>,
    latest_state: Option<S>,
    latest_state_frame_index: FrameIndex,
    state_start_frame: FrameIndex,
    latest_acknowledged_frame: FrameIndex,
    all_have_state: bool,
    // local inputs at or after `latest_state_frame_index`
    local_inputs: BTreeMap<FrameIndex, I>,
    incoming_events: NetworkEvents<I>,
}

impl<S: State, I: Input> Network<S, I> {
    pub fn new(config: NetworkConfig, transport: Box<dyn Transport>) -> Self {
        let my_peer_id = config.peer_id.unwrap_or_else(|| fastrand::i32(0..));
        Self {
            config,
            my_peer_id,
            transport,
            peers: BTreeMap::new(),
            latest_state: None,
            latest_state_frame_index: 0,
            state_start_frame: 0,
            latest_acknowledged_frame: NO_ACKNOWLEDGED_FRAME,
            all_have_state: false,
            local_inputs: BTreeMap::new(),
            incoming_events: NetworkEvents::new(),
        }
    }

    // Accessors

    pub fn my_peer_id(&self) -> PeerId {
        self.my_peer_id
    }

    pub fn latest_state(&self) -> Option<&S> {
        self.latest_state.as_ref()
    }

    pub fn latest_state_frame_index(&self) -> FrameIndex {
        self.latest_state_frame_index
    }

    /// Frame the adopted state starts at
    pub fn state_start_frame(&self) -> FrameIndex {
        self.state_start_frame
    }

    /// Highest frame every identified peer has acknowledged. Never decreases.
    pub fn latest_acknowledged_frame(&self) -> FrameIndex {
        self.latest_acknowledged_frame
    }

    /// True once every expected peer holds a state and we hold one too
    pub fn all_have_state(&self) -> bool {
        self.all_have_state
    }

    pub fn peer(&self, connection_id: ConnectionId) -> Option<&Peer<I>> {
        self.peers.get(&connection_id)
    }

    /// Peers in connection id order
    pub fn peers(&self) -> impl Iterator<Item = &Peer<I>> {
        self.peers.values()
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Replaces the snapshot sent to peers that introduce themselves. The
    /// first snapshot also fixes the frame a hosted session starts at.
    pub fn set_latest_state(&mut self, state: S, frame_index: FrameIndex) {
        if self.latest_state.is_none() {
            self.state_start_frame = frame_index;
        }
        self.latest_state = Some(state);
        self.set_latest_state_frame_index(frame_index);
        self.check_all_have_state();
    }

    fn set_latest_state_frame_index(&mut self, frame_index: FrameIndex) {
        self.latest_state_frame_index = frame_index;
        self.local_inputs = self.local_inputs.split_off(&frame_index);
    }

    // Connections

    pub fn add_peer(&mut self, hostname: &str) -> Result<ConnectionId, ConnectError> {
        let connection_id = self.transport.connect(hostname)?;
        info!("connecting to {} as connection {}", hostname, connection_id);
        self.peers
            .entry(connection_id)
            .or_insert_with(|| Peer::new(connection_id));
        Ok(connection_id)
    }

    /// Handles everything the transport received since the last call
    pub fn receive(&mut self) -> NetworkEvents<I> {
        while let Some(event) = self.transport.receive() {
            self.handle_transport_event(event);
        }
        mem::replace(&mut self.incoming_events, NetworkEvents::new())
    }

    // Outgoing

    /// Queues a local input for every peer. Without an explicit frame the
    /// input goes to the frame after the latest acknowledged one. Returns the
    /// frame the input was queued for.
    pub fn queue_input(
        &mut self,
        input: I,
        frame_index: Option<FrameIndex>,
    ) -> Result<FrameIndex, LateDataError> {
        let frame_index =
            frame_index.unwrap_or_else(|| self.latest_acknowledged_frame.saturating_add(1));

        if frame_index <= self.latest_acknowledged_frame {
            return Err(LateDataError::AlreadyAcknowledged {
                frame_index,
                latest_acknowledged_frame: self.latest_acknowledged_frame,
            });
        }
        for peer in self.peers.values() {
            if let Some(newest_queued_frame) = peer.unacknowledged().max() {
                if newest_queued_frame > frame_index {
                    return Err(LateDataError::OlderThanQueued {
                        frame_index,
                        connection_id: peer.connection_id(),
                        newest_queued_frame,
                    });
                }
            }
        }

        for peer in self.peers.values_mut() {
            if frame_index > peer.acknowledged_frame() {
                peer.unacknowledged_mut().set(input.clone(), frame_index);
            }
        }
        if frame_index >= self.latest_state_frame_index {
            self.local_inputs.insert(frame_index, input);
        }
        trace!("queued input for frame {}", frame_index);
        Ok(frame_index)
    }

    /// Sends every peer its unacknowledged inputs, or an Empty message
    /// carrying `last_frame_index` when nothing is waiting
    pub fn send_data(&mut self, last_frame_index: FrameIndex) {
        let connection_ids: Vec<ConnectionId> = self.peers.keys().copied().collect();
        for connection_id in connection_ids {
            if let Some((message, sent_frame)) = self.outgoing_data(connection_id, last_frame_index) {
                if let Some(peer) = self.peers.get_mut(&connection_id) {
                    peer.record_sent(sent_frame);
                }
                self.send(connection_id, ChannelKind::Unreliable, &message);
            }
        }
    }

    fn outgoing_data(
        &self,
        connection_id: ConnectionId,
        last_frame_index: FrameIndex,
    ) -> Option<(Message<S, I>, FrameIndex)> {
        let queue = self.peers.get(&connection_id)?.unacknowledged();
        let Some(first_frame_index) = queue.min() else {
            return Some((Message::Empty { last_frame_index }, last_frame_index));
        };

        // the oldest contiguous run, at most one message worth
        let mut inputs = Vec::new();
        let mut highest_frame_index = first_frame_index;
        for data in queue.iter() {
            let expected = first_frame_index.saturating_add(inputs.len() as FrameIndex);
            if inputs.len() == MAX_INPUTS_PER_MESSAGE || data.frame_index != expected {
                break;
            }
            highest_frame_index = data.frame_index;
            inputs.push(data.input.clone());
        }

        match InputMessage::new(highest_frame_index, inputs) {
            Ok(input_message) => Some((Message::Input(input_message), highest_frame_index)),
            Err(error) => {
                warn!("cannot build input message for connection {}: {}", connection_id, error);
                None
            }
        }
    }

    fn send_state(&mut self, connection_id: ConnectionId) {
        let message = Message::State {
            frame_index: self.latest_state_frame_index,
            state: self.latest_state.clone(),
        };
        self.send(connection_id, ChannelKind::Reliable, &message);
        self.resend_inputs_from_state(connection_id);
    }

    /// The peer continues from the state it was just sent, so every local
    /// input from that frame on is queued for it again, including frames an
    /// earlier connection of the same peer already acknowledged
    fn resend_inputs_from_state(&mut self, connection_id: ConnectionId) {
        let state_frame = self.latest_state_frame_index;
        let Some(peer) = self.peers.get_mut(&connection_id) else {
            return;
        };
        peer.resume_after(state_frame.saturating_sub(1));
        for (frame_index, input) in self.local_inputs.range(state_frame..) {
            peer.unacknowledged_mut().set(input.clone(), *frame_index);
        }
        if !self.local_inputs.is_empty() {
            debug!(
                "resending {} input(s) from frame {} to connection {}",
                self.local_inputs.len(),
                state_frame,
                connection_id
            );
        }
    }

    fn send(&mut self, connection_id: ConnectionId, channel: ChannelKind, message: &Message<S, I>) {
        let payload = message.to_bytes();
        if let Err(error) = self.transport.send(connection_id, channel, &payload) {
            warn!("{:?} send to connection {} failed: {}", message.message_type(), connection_id, error);
            self.incoming_events.push_error(NetworkError::Send(error));
        }
    }

    // Incoming

    fn handle_transport_event(&mut self, event: TransportEvent) {
        let connection_id = event.connection_id;
        match event.kind {
            TransportEventKind::Connect => self.handle_connect(connection_id),
            TransportEventKind::Disconnect => {
                info!("connection {} disconnected", connection_id);
                self.incoming_events.push_disconnection(connection_id);
            }
            TransportEventKind::Data { payload, .. } => match Message::<S, I>::read(&payload) {
                Ok(message) => self.handle_message(connection_id, message),
                Err(source) => {
                    warn!("discarding message from connection {}: {}", connection_id, source);
                    self.incoming_events.push_error(NetworkError::Decode {
                        connection_id,
                        source,
                    });
                }
            },
        }
    }

    fn handle_connect(&mut self, connection_id: ConnectionId) {
        self.peers
            .entry(connection_id)
            .or_insert_with(|| Peer::new(connection_id));
        self.incoming_events.push_connection(connection_id);
        let message = Message::PeerInfo {
            peer_id: self.my_peer_id,
        };
        self.send(connection_id, ChannelKind::Reliable, &message);
    }

    fn handle_message(&mut self, connection_id: ConnectionId, message: Message<S, I>) {
        match message {
            Message::AcknowledgeInput { frame_index } => {
                self.handle_acknowledge_input(connection_id, frame_index)
            }
            Message::State { frame_index, state } => {
                self.handle_state(connection_id, frame_index, state)
            }
            Message::Input(input_message) => self.handle_input(connection_id, input_message),
            Message::Empty { last_frame_index } => {
                let message = Message::AcknowledgeInput {
                    frame_index: last_frame_index,
                };
                self.send(connection_id, ChannelKind::Unreliable, &message);
            }
            Message::PeerInfo { peer_id } => self.handle_peer_info(connection_id, peer_id),
            Message::AcknowledgeState => {
                self.peer_mut(connection_id).set_has_state();
                self.check_all_have_state();
            }
        }
    }

    fn handle_acknowledge_input(&mut self, connection_id: ConnectionId, frame_index: FrameIndex) {
        let peer = self.peer_mut(connection_id);
        let sent_frame = peer.sent_frame();
        let frame_index = if frame_index > sent_frame {
            warn!(
                "connection {} acknowledged frame {} but was only sent frames through {}",
                connection_id, frame_index, sent_frame
            );
            sent_frame
        } else {
            frame_index
        };
        if !peer.acknowledge(frame_index) {
            return;
        }

        let Some(boundary) = self
            .peers
            .values()
            .filter(|peer| peer.peer_id().is_some())
            .map(Peer::acknowledged_frame)
            .min()
        else {
            return;
        };
        let previous = self.latest_acknowledged_frame;
        if boundary <= previous {
            return;
        }
        self.latest_acknowledged_frame = boundary;
        debug!("frames through {} acknowledged by every peer", boundary);

        if self.config.tick_all_acknowledged_frames {
            for frame_index in (previous + 1)..=boundary {
                self.incoming_events.push_acknowledged_frame(frame_index);
            }
        } else {
            self.incoming_events.push_acknowledged_frame(boundary);
        }
    }

    fn handle_input(&mut self, connection_id: ConnectionId, input_message: InputMessage<I>) {
        let Some(peer_id) = self.peers.get(&connection_id).and_then(Peer::peer_id) else {
            warn!("discarding input from unidentified connection {}", connection_id);
            self.incoming_events
                .push_error(NetworkError::UnidentifiedPeer { connection_id });
            return;
        };

        let highest_frame_index = input_message.highest_frame_index();
        trace!(
            "received frames {}..={} from peer {}",
            input_message.first_frame_index(),
            highest_frame_index,
            peer_id
        );
        for network_frame in input_message.into_network_frames(peer_id) {
            self.incoming_events
                .push_received_frame(peer_id, network_frame.into_simulation_frame());
        }

        let message = Message::AcknowledgeInput {
            frame_index: highest_frame_index,
        };
        self.send(connection_id, ChannelKind::Unreliable, &message);
    }

    fn handle_state(&mut self, connection_id: ConnectionId, frame_index: FrameIndex, state: Option<S>) {
        if let Some(state) = state {
            self.peer_mut(connection_id).set_has_state();
            if self.latest_state.is_none() || frame_index > self.latest_state_frame_index {
                info!("adopting state for frame {} from connection {}", frame_index, connection_id);
                self.latest_state = Some(state);
                self.set_latest_state_frame_index(frame_index);
                self.state_start_frame = frame_index;
                self.incoming_events.push_received_state(frame_index);
            }
        }
        self.check_all_have_state();
        self.send(connection_id, ChannelKind::Reliable, &Message::AcknowledgeState);
    }

    fn handle_peer_info(&mut self, connection_id: ConnectionId, peer_id: PeerId) {
        let previous_connection = self
            .peers
            .values()
            .find(|peer| peer.connection_id() != connection_id && peer.peer_id() == Some(peer_id))
            .map(Peer::connection_id);

        match previous_connection.and_then(|previous| self.peers.remove(&previous)) {
            Some(mut peer) => {
                info!(
                    "peer {} reconnected on connection {}, was connection {}",
                    peer_id,
                    connection_id,
                    peer.connection_id()
                );
                peer.set_connection_id(connection_id);
                self.peers.insert(connection_id, peer);
            }
            None => {
                let peer = self.peer_mut(connection_id);
                if peer.peer_id() != Some(peer_id) {
                    info!("connection {} is peer {}", connection_id, peer_id);
                }
                peer.set_peer_id(peer_id);
            }
        }

        self.incoming_events.push_identified_peer(connection_id, peer_id);
        self.send_state(connection_id);
    }

    fn check_all_have_state(&mut self) {
        if self.all_have_state || self.latest_state.is_none() {
            return;
        }
        let mut identified = 0;
        for peer in self.peers.values().filter(|peer| peer.peer_id().is_some()) {
            if !peer.has_state() {
                return;
            }
            identified += 1;
        }
        if identified < self.config.remote_peer_count {
            return;
        }

        info!("all peers hold state, synchronized at frame {}", self.state_start_frame);
        self.all_have_state = true;
        // frames before the state are part of it
        self.latest_acknowledged_frame = self
            .latest_acknowledged_frame
            .max(self.state_start_frame.saturating_sub(1));
        self.incoming_events.push_synchronized(self.state_start_frame);
    }

    fn peer_mut(&mut self, connection_id: ConnectionId) -> &mut Peer<I> {
        self.peers
            .entry(connection_id)
            .or_insert_with(|| Peer::new(connection_id))
    }
}
