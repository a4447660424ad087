use huddle_mesh::Role;

use crate::integration::{init_tracing, join_relay, pid, wait_for_mesh};
use crate::utils::{MockDevices, Relay};

#[tokio::test]
async fn test_two_peers_connect_through_relay() {
    init_tracing();

    let relay = Relay::new();
    let alice = join_relay(&relay, "alice", MockDevices::new()).await;
    let bob = join_relay(&relay, "bob", MockDevices::new()).await;

    let alice_view = wait_for_mesh(&alice, &["bob"], 2).await;
    let bob_view = wait_for_mesh(&bob, &["alice"], 2).await;

    // The later arrival offers.
    assert_eq!(bob_view.participant(&pid("alice")).unwrap().role, Role::Offerer);
    assert_eq!(alice_view.participant(&pid("bob")).unwrap().role, Role::Answerer);
    assert_eq!(
        alice_view.participant(&pid("bob")).unwrap().info.username,
        "user-bob"
    );

    let received: Vec<_> = bob_view
        .participant(&pid("alice"))
        .unwrap()
        .remote_tracks
        .iter()
        .map(|t| t.id.clone())
        .collect();
    assert!(received.contains(alice.devices.camera().unwrap().id()));
    assert!(received.contains(alice.devices.microphone().unwrap().id()));

    let to_bob = alice.transports.latest(&pid("bob")).unwrap();
    assert!(to_bob.has_local_description() && to_bob.has_remote_description());
    assert_eq!(alice.transports.count(), 1);
    assert_eq!(bob.transports.count(), 1);
}
