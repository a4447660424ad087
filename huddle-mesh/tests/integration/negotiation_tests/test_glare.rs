use huddle_core::ClientSignal;
use huddle_mesh::{NegotiationState, Role};

use crate::integration::{TestMesh, init_tracing, pid};
use crate::utils::{
    MESH_TIMEOUT_MS, MockDevices, SIGNAL_TIMEOUT_MS, expect_no_signal, wait_for_signal,
    wait_for_snapshot,
};

async fn offer_sent_to(mesh: &TestMesh, id: &str) {
    wait_for_snapshot(&mesh.handle, MESH_TIMEOUT_MS, |s| {
        s.participant(&pid(id))
            .is_some_and(|p| p.state == NegotiationState::OfferSent)
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_larger_id_yields_and_answers() {
    init_tracing();

    let mesh = TestMesh::joined(MockDevices::new(), "b").await;
    mesh.existing(&["a"]).await;
    offer_sent_to(&mesh, "a").await;

    mesh.offer_from("a", "v=0 a\ntrack audio a-audio").await;

    let snapshot = wait_for_snapshot(&mesh.handle, MESH_TIMEOUT_MS, |s| {
        s.participant(&pid("a"))
            .is_some_and(|p| p.state == NegotiationState::Connected)
    })
    .await
    .unwrap();
    assert_eq!(snapshot.participant(&pid("a")).unwrap().role, Role::Answerer);

    let transports = mesh.transports.transports_for(&pid("a"));
    assert_eq!(transports.len(), 2);
    assert!(transports[0].is_closed());
    assert!(!transports[1].is_closed());

    assert_eq!(mesh.signaling.offers_to(&pid("a")).await.len(), 1);
    assert_eq!(mesh.signaling.answers_to(&pid("a")).await.len(), 1);

    // The answer to our abandoned offer is ignored.
    mesh.answer_from("a", "v=0 a late").await;
    let snapshot = mesh.handle.snapshot().await.unwrap();
    assert_eq!(
        snapshot.participant(&pid("a")).map(|p| p.state),
        Some(NegotiationState::Connected)
    );
}

#[tokio::test]
async fn test_smaller_id_keeps_its_offer() {
    init_tracing();

    let mesh = TestMesh::joined(MockDevices::new(), "a").await;
    mesh.existing(&["b"]).await;
    offer_sent_to(&mesh, "b").await;

    mesh.offer_from("b", "v=0 b").await;
    mesh.answer_from("b", "v=0 b answer").await;

    let snapshot = wait_for_snapshot(&mesh.handle, MESH_TIMEOUT_MS, |s| {
        s.participant(&pid("b"))
            .is_some_and(|p| p.state == NegotiationState::Connected)
    })
    .await
    .unwrap();
    assert_eq!(snapshot.participant(&pid("b")).unwrap().role, Role::Offerer);

    assert_eq!(mesh.transports.transports_for(&pid("b")).len(), 1);
    assert!(mesh.signaling.answers_to(&pid("b")).await.is_empty());
}

#[tokio::test]
async fn test_yielding_keeps_early_candidates() {
    init_tracing();

    let mesh = TestMesh::joined(MockDevices::new(), "b").await;
    mesh.existing(&["a"]).await;
    offer_sent_to(&mesh, "a").await;

    mesh.candidate_from("a", "candidate:early").await;
    mesh.offer_from("a", "v=0 a").await;

    wait_for_snapshot(&mesh.handle, MESH_TIMEOUT_MS, |s| {
        s.participant(&pid("a"))
            .is_some_and(|p| p.state == NegotiationState::Connected)
    })
    .await
    .unwrap();

    let transport = mesh.transports.latest(&pid("a")).unwrap();
    assert_eq!(transport.applied_candidates(), vec!["candidate:early"]);
}

#[tokio::test]
async fn test_without_welcome_keeps_its_offer() {
    init_tracing();

    // No `welcome`, so ids cannot be compared.
    let mut mesh = TestMesh::spawn(MockDevices::new());
    wait_for_signal(&mut mesh.outbound, SIGNAL_TIMEOUT_MS, |s| {
        matches!(s, ClientSignal::JoinRoom { .. })
    })
    .await
    .unwrap();
    mesh.existing(&["a"]).await;
    offer_sent_to(&mesh, "a").await;

    mesh.offer_from("a", "v=0 a").await;
    expect_no_signal(&mut mesh.outbound, 200, |s| {
        matches!(s, ClientSignal::Answer { .. })
    })
    .await
    .unwrap();

    let transports = mesh.transports.transports_for(&pid("a"));
    assert_eq!(transports.len(), 1);
    assert!(!transports[0].is_closed());

    let snapshot = mesh.handle.snapshot().await.unwrap();
    let link = snapshot.participant(&pid("a")).unwrap();
    assert_eq!(link.role, Role::Offerer);
    assert_eq!(link.state, NegotiationState::OfferSent);

    // Our own offer still completes.
    mesh.answer_from("a", "v=0 a answer").await;
    wait_for_snapshot(&mesh.handle, MESH_TIMEOUT_MS, |s| {
        s.participant(&pid("a"))
            .is_some_and(|p| p.state == NegotiationState::Connected)
    })
    .await
    .unwrap();
}
