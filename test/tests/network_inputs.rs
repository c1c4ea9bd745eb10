/// Integration tests for input exchange: retransmission of unacknowledged
/// inputs, acknowledgment bookkeeping, late input rejection, error
/// reporting and reconnection.

use lockstep_peer::{ChannelKind, Network, NetworkConfig, NetworkError, SendError, Transport};
use lockstep_shared::{
    ConnectionId, FrameIndex, InputMessage, LateDataError, Message, MessageError,
};
use lockstep_test::{
    pump, test_network, GameInput, GameState, LocalHub, TestNetwork, Vec3,
};

// endpoint ids, and so connection ids, follow hub registration order
const A_CONNECTION: ConnectionId = 0;
const B_CONNECTION: ConnectionId = 1;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn input(frame_index: FrameIndex) -> GameInput {
    // repeats, so runs of identical inputs get delta encoded
    let direction = if frame_index < 4 { Vec3::X } else { Vec3::Y };
    GameInput { direction }
}

fn synchronized_pair(hub: &LocalHub) -> (TestNetwork, TestNetwork) {
    let mut a = test_network(hub, "a", 1);
    let mut b = test_network(hub, "b", 2);
    a.set_latest_state(GameState::default(), 0);
    b.add_peer("a").unwrap();
    pump(&mut [&mut a, &mut b], 5);
    assert!(a.all_have_state() && b.all_have_state());
    (a, b)
}

#[test]
fn unacknowledged_inputs_are_resent_until_acknowledged() {
    init_logger();
    let hub = LocalHub::new();
    let (mut a, mut b) = synchronized_pair(&hub);

    hub.drop_next_unreliable("a", 8);
    for frame_index in 0..8 {
        a.queue_input(input(frame_index), Some(frame_index)).unwrap();
        a.send_data(frame_index);
        let events = pump(&mut [&mut b, &mut a], 1);
        assert!(events[0].received_frames.is_empty());
    }
    assert_eq!(a.latest_acknowledged_frame(), -1);
    assert_eq!(a.peer(B_CONNECTION).unwrap().unacknowledged().len(), 8);

    a.send_data(7);
    let events = pump(&mut [&mut b, &mut a], 1);

    assert_eq!(events[0].frames_from(1), (0..8).collect::<Vec<_>>());
    for (frame_index, (_, frame)) in events[0].received_frames.iter().enumerate() {
        assert_eq!(frame.input(1), Some(&input(frame_index as FrameIndex)));
    }
    assert_eq!(a.latest_acknowledged_frame(), 7);
    assert_eq!(events[1].acknowledged_frames, (0..8).collect::<Vec<_>>());
    assert!(a.peer(B_CONNECTION).unwrap().unacknowledged().is_empty());
}

#[test]
fn acknowledgment_raises_only_newest_frame_when_configured() {
    init_logger();
    let hub = LocalHub::new();
    let config = NetworkConfig {
        peer_id: Some(1),
        tick_all_acknowledged_frames: false,
        ..Default::default()
    };
    let mut a: TestNetwork = Network::new(config, Box::new(hub.transport("a")));
    let mut b = test_network(&hub, "b", 2);
    a.set_latest_state(GameState::default(), 0);
    b.add_peer("a").unwrap();
    pump(&mut [&mut a, &mut b], 5);

    for frame_index in 0..5 {
        a.queue_input(input(frame_index), Some(frame_index)).unwrap();
    }
    a.send_data(4);
    let events = pump(&mut [&mut b, &mut a], 1);

    assert_eq!(events[1].acknowledged_frames, vec![4]);
    assert_eq!(a.latest_acknowledged_frame(), 4);
}

#[test]
fn empty_message_is_acknowledged() {
    init_logger();
    let hub = LocalHub::new();
    let (mut a, mut b) = synchronized_pair(&hub);

    a.send_data(3);
    let events = pump(&mut [&mut b, &mut a], 1);

    assert!(events[0].received_frames.is_empty());
    assert_eq!(a.latest_acknowledged_frame(), 3);
    assert_eq!(events[1].acknowledged_frames, vec![0, 1, 2, 3]);
}

#[test]
fn late_inputs_are_rejected() {
    init_logger();
    let hub = LocalHub::new();
    let (mut a, mut b) = synchronized_pair(&hub);

    for frame_index in 0..8 {
        a.queue_input(input(frame_index), Some(frame_index)).unwrap();
    }
    a.send_data(7);
    pump(&mut [&mut b, &mut a], 1);
    assert_eq!(a.latest_acknowledged_frame(), 7);

    assert_eq!(
        a.queue_input(input(5), Some(5)),
        Err(LateDataError::AlreadyAcknowledged {
            frame_index: 5,
            latest_acknowledged_frame: 7
        })
    );
    assert_eq!(a.queue_input(input(8), None), Ok(8));
    assert_eq!(a.queue_input(input(10), Some(10)), Ok(10));
    assert_eq!(
        a.queue_input(input(9), Some(9)),
        Err(LateDataError::OlderThanQueued {
            frame_index: 9,
            connection_id: B_CONNECTION,
            newest_queued_frame: 10
        })
    );
    // the newest queued frame may be replaced
    assert_eq!(a.queue_input(input(0), Some(10)), Ok(10));
    let queue = a.peer(B_CONNECTION).unwrap().unacknowledged();
    assert_eq!(queue.len(), 2);
    assert_eq!(queue.get(10).map(|data| &data.input), Some(&input(0)));
}

#[test]
fn inputs_are_sent_as_contiguous_runs() {
    init_logger();
    let hub = LocalHub::new();
    let (mut a, mut b) = synchronized_pair(&hub);

    a.queue_input(input(0), Some(0)).unwrap();
    a.queue_input(input(1), Some(1)).unwrap();
    a.queue_input(input(5), Some(5)).unwrap();
    a.send_data(5);
    let events = pump(&mut [&mut b, &mut a], 1);
    assert_eq!(events[0].frames_from(1), vec![0, 1]);

    a.send_data(5);
    let events = pump(&mut [&mut b, &mut a], 1);
    assert_eq!(events[0].frames_from(1), vec![5]);
    assert_eq!(a.latest_acknowledged_frame(), 5);
}

#[test]
fn undecodable_payloads_are_reported() {
    init_logger();
    let hub = LocalHub::new();
    let mut a = test_network(&hub, "a", 1);
    let mut raw = hub.transport("raw");

    let a_connection = raw.connect("a").unwrap();
    raw.send(a_connection, ChannelKind::Unreliable, &[99]).unwrap();
    let events = pump(&mut [&mut a], 1);

    assert_eq!(
        events[0].errors,
        vec![NetworkError::Decode {
            connection_id: raw.id(),
            source: MessageError::UnknownMessageType { byte: 99 }
        }]
    );
}

#[test]
fn inputs_from_unidentified_connections_are_reported() {
    init_logger();
    let hub = LocalHub::new();
    let mut a = test_network(&hub, "a", 1);
    let mut raw = hub.transport("raw");

    let message: Message<GameState, GameInput> =
        Message::Input(InputMessage::new(0, vec![input(0)]).unwrap());
    let a_connection = raw.connect("a").unwrap();
    raw.send(a_connection, ChannelKind::Unreliable, &message.to_bytes())
        .unwrap();
    let events = pump(&mut [&mut a], 1);

    assert!(events[0].received_frames.is_empty());
    assert_eq!(
        events[0].errors,
        vec![NetworkError::UnidentifiedPeer {
            connection_id: raw.id()
        }]
    );
}

#[test]
fn failed_sends_are_reported_and_recovered() {
    init_logger();
    let hub = LocalHub::new();
    let (mut a, mut b) = synchronized_pair(&hub);

    hub.fail_next_send("a", 1);
    a.queue_input(input(0), Some(0)).unwrap();
    a.send_data(0);
    let events = pump(&mut [&mut a], 1);
    assert!(matches!(
        events[0].errors.as_slice(),
        [NetworkError::Send(SendError::Failed { connection_id: B_CONNECTION, .. })]
    ));

    a.send_data(0);
    let events = pump(&mut [&mut b, &mut a], 1);
    assert_eq!(events[0].frames_from(1), vec![0]);
    assert!(events[1].errors.is_empty());
}

#[test]
fn reconnecting_peer_keeps_its_queue() {
    init_logger();
    let hub = LocalHub::new();
    let (mut a, b) = synchronized_pair(&hub);

    a.queue_input(input(0), Some(0)).unwrap();
    a.queue_input(input(1), Some(1)).unwrap();
    drop(b);

    // same peer id, new endpoint
    let mut b = test_network(&hub, "b", 2);
    let new_connection = 2;
    assert_eq!(b.add_peer("a"), Ok(A_CONNECTION));
    pump(&mut [&mut a, &mut b], 5);

    assert_eq!(a.peer_count(), 1);
    assert!(a.peer(B_CONNECTION).is_none());
    let migrated = a.peer(new_connection).unwrap();
    assert_eq!(migrated.peer_id(), Some(2));
    assert_eq!(migrated.connection_id(), new_connection);
    assert_eq!(migrated.unacknowledged().len(), 2);
    assert!(b.all_have_state());
    assert_eq!(b.latest_state(), a.latest_state());

    a.send_data(1);
    let events = pump(&mut [&mut b, &mut a], 1);
    assert_eq!(events[0].frames_from(1), vec![0, 1]);
    assert_eq!(a.latest_acknowledged_frame(), 1);
}

#[test]
fn reconnecting_peer_is_resent_inputs_from_the_state_frame() {
    init_logger();
    let hub = LocalHub::new();
    let (mut a, mut b) = synchronized_pair(&hub);

    for frame_index in 0..8 {
        a.queue_input(input(frame_index), Some(frame_index)).unwrap();
    }
    a.send_data(7);
    pump(&mut [&mut b, &mut a], 1);
    assert_eq!(a.latest_acknowledged_frame(), 7);
    assert!(a.peer(B_CONNECTION).unwrap().unacknowledged().is_empty());

    a.set_latest_state(GameState::default(), 4);
    drop(b);

    let mut b = test_network(&hub, "b", 2);
    let new_connection = 2;
    b.add_peer("a").unwrap();
    pump(&mut [&mut a, &mut b], 5);

    let migrated = a.peer(new_connection).unwrap();
    assert_eq!(migrated.acknowledged_frame(), 3);
    assert_eq!(
        migrated.unacknowledged().iter().map(|data| data.frame_index).collect::<Vec<_>>(),
        vec![4, 5, 6, 7]
    );
    assert_eq!(b.state_start_frame(), 4);
    assert_eq!(b.latest_acknowledged_frame(), 3);

    a.send_data(7);
    let events = pump(&mut [&mut b, &mut a], 1);
    assert_eq!(events[0].frames_from(1), vec![4, 5, 6, 7]);
    for (_, frame) in &events[0].received_frames {
        assert_eq!(frame.input(1), Some(&input(frame.frame_index())));
    }
    assert_eq!(a.peer(new_connection).unwrap().acknowledged_frame(), 7);
    assert!(a.peer(new_connection).unwrap().unacknowledged().is_empty());
}

#[test]
fn acknowledgment_beyond_sent_frames_is_capped() {
    init_logger();
    let hub = LocalHub::new();
    let mut a = test_network(&hub, "a", 1);
    a.set_latest_state(GameState::default(), 0);
    let mut raw = hub.transport("raw");

    let a_connection = raw.connect("a").unwrap();
    let peer_info: Message<GameState, GameInput> = Message::PeerInfo { peer_id: 2 };
    raw.send(a_connection, ChannelKind::Reliable, &peer_info.to_bytes())
        .unwrap();
    pump(&mut [&mut a], 1);

    for frame_index in 0..4 {
        a.queue_input(input(frame_index), Some(frame_index)).unwrap();
    }
    a.send_data(3);

    let acknowledgment: Message<GameState, GameInput> = Message::AcknowledgeInput {
        frame_index: 2_000_000,
    };
    raw.send(a_connection, ChannelKind::Unreliable, &acknowledgment.to_bytes())
        .unwrap();
    let events = pump(&mut [&mut a], 1);

    assert_eq!(a.latest_acknowledged_frame(), 3);
    assert_eq!(events[0].acknowledged_frames, vec![0, 1, 2, 3]);
    assert_eq!(a.queue_input(input(4), None), Ok(4));
}

#[test]
fn synchronization_waits_for_every_remote_peer() {
    init_logger();
    let hub = LocalHub::new();
    let config = NetworkConfig {
        peer_id: Some(1),
        remote_peer_count: 2,
        ..Default::default()
    };
    let mut a: TestNetwork = Network::new(config, Box::new(hub.transport("a")));
    let mut b = test_network(&hub, "b", 2);
    let mut c = test_network(&hub, "c", 3);
    a.set_latest_state(GameState::default(), 0);

    b.add_peer("a").unwrap();
    pump(&mut [&mut a, &mut b], 5);
    assert!(b.all_have_state());
    assert!(!a.all_have_state());

    c.add_peer("a").unwrap();
    let events = pump(&mut [&mut a, &mut b, &mut c], 5);
    assert!(a.all_have_state());
    assert!(c.all_have_state());
    assert_eq!(events[0].synchronized, vec![0]);
}
