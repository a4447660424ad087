use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use huddle_core::ClientSignal;
use huddle_mesh::{MeshHandle, MeshNotification, MeshSnapshot};
use tokio::sync::{broadcast, mpsc};

/// Timeout for signal exchange operations (ms).
pub const SIGNAL_TIMEOUT_MS: u64 = 2000;

/// Timeout for a mesh to settle into an expected state (ms).
pub const MESH_TIMEOUT_MS: u64 = 5000;

/// Poll snapshots until `pred` holds.
pub async fn wait_for_snapshot(
    handle: &MeshHandle,
    timeout_ms: u64,
    pred: impl Fn(&MeshSnapshot) -> bool,
) -> Result<MeshSnapshot> {
    let start = Instant::now();
    loop {
        let snapshot = handle.snapshot().await.context("Coordinator stopped")?;
        if pred(&snapshot) {
            return Ok(snapshot);
        }
        if start.elapsed() > Duration::from_millis(timeout_ms) {
            bail!("Mesh did not reach expected state: {:#?}", snapshot);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Read outgoing signals until one matches `pred`. Earlier signals are
/// consumed.
pub async fn wait_for_signal(
    rx: &mut mpsc::UnboundedReceiver<ClientSignal>,
    timeout_ms: u64,
    pred: impl Fn(&ClientSignal) -> bool,
) -> Result<ClientSignal> {
    let deadline = Instant::now() + Duration::from_millis(timeout_ms);
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match tokio::time::timeout(remaining, rx.recv()).await {
            Ok(Some(signal)) if pred(&signal) => return Ok(signal),
            Ok(Some(signal)) => tracing::debug!("[Test] skipping {:?}", signal),
            Ok(None) => bail!("Signal channel closed"),
            Err(_) => bail!("No matching signal within {}ms", timeout_ms),
        }
    }
}

/// Assert that no signal matching `pred` is sent within `window_ms`.
pub async fn expect_no_signal(
    rx: &mut mpsc::UnboundedReceiver<ClientSignal>,
    window_ms: u64,
    pred: impl Fn(&ClientSignal) -> bool,
) -> Result<()> {
    match wait_for_signal(rx, window_ms, pred).await {
        Ok(signal) => bail!("Unexpected signal: {:?}", signal),
        Err(_) => Ok(()),
    }
}

/// Read notifications until one matches `pred`.
pub async fn wait_for_notification(
    rx: &mut broadcast::Receiver<MeshNotification>,
    timeout_ms: u64,
    pred: impl Fn(&MeshNotification) -> bool,
) -> Result<MeshNotification> {
    let deadline = Instant::now() + Duration::from_millis(timeout_ms);
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match tokio::time::timeout(remaining, rx.recv()).await {
            Ok(Ok(n)) if pred(&n) => return Ok(n),
            Ok(Ok(_)) => {}
            Ok(Err(broadcast::error::RecvError::Lagged(skipped))) => {
                tracing::warn!("[Test] notification receiver lagged by {}", skipped)
            }
            Ok(Err(broadcast::error::RecvError::Closed)) => bail!("Notifications closed"),
            Err(_) => bail!("No matching notification within {}ms", timeout_ms),
        }
    }
}
