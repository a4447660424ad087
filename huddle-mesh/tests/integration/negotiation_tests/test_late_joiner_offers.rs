use huddle_core::TrackId;
use huddle_mesh::{NegotiationState, Role};

use crate::integration::{TestMesh, init_tracing, pid};
use crate::utils::{MESH_TIMEOUT_MS, MockDevices, wait_for_snapshot};

#[tokio::test]
async fn test_late_joiner_offers_to_everyone_present() {
    init_tracing();

    let mesh = TestMesh::joined(MockDevices::new(), "me").await;
    mesh.existing(&["a", "me", "c"]).await;

    let snapshot = wait_for_snapshot(&mesh.handle, MESH_TIMEOUT_MS, |s| {
        s.participants.len() == 2
            && s.participants
                .iter()
                .all(|p| p.state == NegotiationState::OfferSent)
    })
    .await
    .unwrap();
    assert!(snapshot.participant(&pid("me")).is_none());
    assert!(snapshot.participants.iter().all(|p| p.role == Role::Offerer));
    assert_eq!(mesh.signaling.offers_to(&pid("a")).await.len(), 1);
    assert_eq!(mesh.signaling.offers_to(&pid("c")).await.len(), 1);

    // Both local tracks ride on every offer.
    let offer = &mesh.signaling.offers_to(&pid("a")).await[0];
    let camera = mesh.devices.camera().unwrap();
    let microphone = mesh.devices.microphone().unwrap();
    assert!(offer.sdp.contains(camera.id().as_str()));
    assert!(offer.sdp.contains(microphone.id().as_str()));

    mesh.answer_from("a", "v=0 a\ntrack video a-video").await;
    mesh.answer_from("c", "v=0 c\ntrack audio c-audio").await;

    let snapshot = wait_for_snapshot(&mesh.handle, MESH_TIMEOUT_MS, |s| {
        s.connected().count() == 2
            && s.participants.iter().all(|p| p.remote_tracks.len() == 1)
    })
    .await
    .unwrap();

    let a = snapshot.participant(&pid("a")).unwrap();
    assert_eq!(a.remote_tracks[0].id, TrackId::from("a-video"));
    for id in ["a", "c"] {
        let transport = mesh.transports.latest(&pid(id)).unwrap();
        assert!(transport.has_local_description());
        assert!(transport.has_remote_description());
    }
}

#[tokio::test]
async fn test_connected_set_matches_completed_exchanges() {
    init_tracing();

    let mesh = TestMesh::joined(MockDevices::new(), "me").await;
    mesh.existing(&["a", "b"]).await;
    wait_for_snapshot(&mesh.handle, MESH_TIMEOUT_MS, |s| {
        s.participants
            .iter()
            .filter(|p| p.state == NegotiationState::OfferSent)
            .count()
            == 2
    })
    .await
    .unwrap();

    mesh.answer_from("a", "v=0 a").await;

    let snapshot = wait_for_snapshot(&mesh.handle, MESH_TIMEOUT_MS, |s| {
        s.connected().count() == 1
    })
    .await
    .unwrap();

    let connected: Vec<_> = snapshot.connected().map(|p| p.id.clone()).collect();
    assert_eq!(connected, vec![pid("a")]);
    assert_eq!(
        snapshot.participant(&pid("b")).map(|p| p.state),
        Some(NegotiationState::OfferSent)
    );

    let b = mesh.transports.latest(&pid("b")).unwrap();
    assert!(!b.has_remote_description());
}
