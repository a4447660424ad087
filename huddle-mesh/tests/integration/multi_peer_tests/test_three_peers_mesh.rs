use crate::integration::{init_tracing, join_relay, pid, wait_for_mesh};
use crate::utils::{MESH_TIMEOUT_MS, MockDevices, Relay, wait_for_snapshot};

#[tokio::test]
async fn test_three_peers_form_full_mesh() {
    init_tracing();

    let relay = Relay::new();
    let a = join_relay(&relay, "a", MockDevices::new()).await;
    let b = join_relay(&relay, "b", MockDevices::new()).await;
    let c = join_relay(&relay, "c", MockDevices::new().without_camera()).await;

    // c only sends audio.
    for peer in [&a, &b] {
        let other = if peer.id == pid("a") { "b" } else { "a" };
        let snapshot = wait_for_snapshot(&peer.handle, MESH_TIMEOUT_MS, |s| {
            s.connected().count() == 2
                && s.participant(&pid("c")).is_some_and(|p| p.remote_tracks.len() == 1)
                && s.participant(&pid(other)).is_some_and(|p| p.remote_tracks.len() == 2)
        })
        .await
        .unwrap();
        assert_eq!(snapshot.participants.len(), 2);
    }
    wait_for_mesh(&c, &["a", "b"], 2).await;

    for peer in [&a, &b, &c] {
        assert_eq!(peer.transports.count(), 2, "{} opened extra links", peer.id);
    }
}

#[tokio::test]
async fn test_mute_is_seen_by_everyone() {
    init_tracing();

    let relay = Relay::new();
    let a = join_relay(&relay, "a", MockDevices::new()).await;
    let b = join_relay(&relay, "b", MockDevices::new()).await;
    let c = join_relay(&relay, "c", MockDevices::new()).await;
    wait_for_mesh(&a, &["b", "c"], 2).await;

    a.handle.toggle_audio().await.unwrap();

    for peer in [&b, &c] {
        wait_for_snapshot(&peer.handle, MESH_TIMEOUT_MS, |s| {
            s.participant(&pid("a"))
                .is_some_and(|p| !p.audio_enabled() && p.video_enabled())
        })
        .await
        .unwrap();
    }
    assert!(!a.devices.microphone().unwrap().is_enabled());
}
