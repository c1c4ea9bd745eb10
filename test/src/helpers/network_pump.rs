use lockstep_peer::{
    AcknowledgeFrameEvent, ConnectEvent, DisconnectEvent, ErrorEvent, Network, NetworkConfig,
    NetworkError, NetworkEvents, PeerIdentifiedEvent, ReceiveFrameEvent, StateReceivedEvent,
    StateSynchronizedEvent,
};
use lockstep_shared::{ConnectionId, FrameIndex, PeerId, SimulationFrame};

use crate::{local_transport::LocalHub, test_state::{GameInput, GameState}};

pub type TestNetwork = Network<GameState, GameInput>;

/// A network with a fixed peer id on a new hub endpoint
pub fn test_network(hub: &LocalHub, hostname: &str, peer_id: PeerId) -> TestNetwork {
    let config = NetworkConfig {
        peer_id: Some(peer_id),
        ..Default::default()
    };
    Network::new(config, Box::new(hub.transport(hostname)))
}

/// Everything one network reported across several receives
#[derive(Default)]
pub struct PumpedEvents {
    pub connections: Vec<ConnectionId>,
    pub disconnections: Vec<ConnectionId>,
    pub identified_peers: Vec<(ConnectionId, PeerId)>,
    pub received_states: Vec<FrameIndex>,
    pub synchronized: Vec<FrameIndex>,
    pub received_frames: Vec<(PeerId, SimulationFrame<GameInput>)>,
    pub acknowledged_frames: Vec<FrameIndex>,
    pub errors: Vec<NetworkError>,
}

impl PumpedEvents {
    pub fn collect(&mut self, mut events: NetworkEvents<GameInput>) {
        self.connections.extend(events.read::<ConnectEvent>());
        self.disconnections.extend(events.read::<DisconnectEvent>());
        self.identified_peers.extend(events.read::<PeerIdentifiedEvent>());
        self.received_states.extend(events.read::<StateReceivedEvent>());
        self.synchronized.extend(events.read::<StateSynchronizedEvent>());
        self.received_frames.extend(events.read::<ReceiveFrameEvent>());
        self.acknowledged_frames.extend(events.read::<AcknowledgeFrameEvent>());
        self.errors.extend(events.read::<ErrorEvent>());
    }

    /// Frame indices received from `peer_id`, in arrival order
    pub fn frames_from(&self, peer_id: PeerId) -> Vec<FrameIndex> {
        self.received_frames
            .iter()
            .filter(|(from, _)| *from == peer_id)
            .map(|(_, frame)| frame.frame_index())
            .collect()
    }
}

/// Lets each network receive once per round, in slice order, and returns
/// what each of them reported
pub fn pump(networks: &mut [&mut TestNetwork], rounds: usize) -> Vec<PumpedEvents> {
    let mut pumped: Vec<PumpedEvents> = networks.iter().map(|_| PumpedEvents::default()).collect();
    for _ in 0..rounds {
        for (network, events) in networks.iter_mut().zip(pumped.iter_mut()) {
            events.collect(network.receive());
        }
    }
    pumped
}
