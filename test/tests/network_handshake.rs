/// Integration tests for the peer handshake over the in-memory transport.
/// Two networks exchange PeerInfo, State and AcknowledgeState until both
/// hold the same state.

use lockstep_test::{pump, test_network, GameState, LocalHub, Vec3};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn joining_peer_adopts_host_state() {
    init_logger();
    let hub = LocalHub::new();
    let mut host = test_network(&hub, "host", 1);
    let mut joiner = test_network(&hub, "joiner", 2);

    host.set_latest_state(GameState::at(Vec3::new(52.0, 0.0, 0.0)), 0);
    joiner.add_peer("host").unwrap();

    let events = pump(&mut [&mut host, &mut joiner], 5);

    assert!(host.all_have_state());
    assert!(joiner.all_have_state());
    assert_eq!(
        joiner.latest_state(),
        Some(&GameState::at(Vec3::new(52.0, 0.0, 0.0)))
    );
    assert_eq!(events[0].synchronized, vec![0]);
    assert_eq!(events[1].synchronized, vec![0]);
    assert_eq!(events[1].received_states, vec![0]);
    assert!(events[0].received_states.is_empty());
}

#[test]
fn both_sides_learn_each_other_ids() {
    init_logger();
    let hub = LocalHub::new();
    let mut host = test_network(&hub, "host", 10);
    let mut joiner = test_network(&hub, "joiner", 20);

    host.set_latest_state(GameState::default(), 0);
    let host_connection = joiner.add_peer("host").unwrap();

    let events = pump(&mut [&mut host, &mut joiner], 3);

    assert_eq!(events[1].identified_peers, vec![(host_connection, 10)]);
    assert_eq!(events[0].identified_peers.len(), 1);
    assert_eq!(events[0].identified_peers[0].1, 20);
    assert_eq!(host.peer_count(), 1);
    assert_eq!(joiner.peer(host_connection).and_then(|peer| peer.peer_id()), Some(10));
}

#[test]
fn no_synchronization_without_any_state() {
    init_logger();
    let hub = LocalHub::new();
    let mut a = test_network(&hub, "a", 1);
    let mut b = test_network(&hub, "b", 2);
    b.add_peer("a").unwrap();

    let events = pump(&mut [&mut a, &mut b], 6);

    assert!(!a.all_have_state());
    assert!(!b.all_have_state());
    assert!(events[0].synchronized.is_empty());
    assert!(events[1].synchronized.is_empty());
}

#[test]
fn newer_state_replaces_older_one() {
    init_logger();
    let hub = LocalHub::new();
    let mut a = test_network(&hub, "a", 1);
    let mut b = test_network(&hub, "b", 2);

    a.set_latest_state(GameState::at(Vec3::X), 12);
    b.set_latest_state(GameState::at(Vec3::Y), 3);
    b.add_peer("a").unwrap();

    let events = pump(&mut [&mut a, &mut b], 5);

    // b adopts frame 12, a keeps its own newer state
    assert_eq!(b.latest_state(), Some(&GameState::at(Vec3::X)));
    assert_eq!(b.state_start_frame(), 12);
    assert_eq!(a.latest_state(), Some(&GameState::at(Vec3::X)));
    assert!(events[0].received_states.is_empty());
    assert_eq!(events[1].received_states, vec![12]);
}

#[test]
fn peer_with_state_of_its_own_counts_as_having_state() {
    init_logger();
    let hub = LocalHub::new();
    let mut a = test_network(&hub, "a", 1);
    let mut b = test_network(&hub, "b", 2);

    a.set_latest_state(GameState::default(), 0);
    b.set_latest_state(GameState::default(), 0);
    let a_connection = b.add_peer("a").unwrap();

    pump(&mut [&mut a, &mut b], 4);

    assert!(a.all_have_state());
    assert!(b.all_have_state());
    assert!(b.peer(a_connection).unwrap().has_state());
}
