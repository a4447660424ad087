use huddle_core::MediaKind;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::error::{MeshError, Result};
use crate::mesh::{MeshCommand, MeshNotification, MeshSnapshot};

/// Cloneable front door to a running [`MeshCoordinator`](crate::MeshCoordinator).
///
/// Every method fails with [`MeshError::CoordinatorStopped`] once the
/// coordinator has left the room.
#[derive(Clone)]
pub struct MeshHandle {
    commands: mpsc::Sender<MeshCommand>,
    notifications: broadcast::Sender<MeshNotification>,
}

impl MeshHandle {
    pub(crate) fn new(
        commands: mpsc::Sender<MeshCommand>,
        notifications: broadcast::Sender<MeshNotification>,
    ) -> Self {
        Self {
            commands,
            notifications,
        }
    }

    async fn send(&self, cmd: MeshCommand) -> Result<()> {
        self.commands
            .send(cmd)
            .await
            .map_err(|_| MeshError::CoordinatorStopped)
    }

    pub async fn toggle_audio(&self) -> Result<()> {
        self.send(MeshCommand::ToggleMedia(MediaKind::Audio)).await
    }

    pub async fn toggle_video(&self) -> Result<()> {
        self.send(MeshCommand::ToggleMedia(MediaKind::Video)).await
    }

    /// Ask for a screen capture. The outcome arrives as a
    /// [`MeshNotification::LocalMediaChanged`].
    pub async fn start_screen_share(&self) -> Result<()> {
        self.send(MeshCommand::StartScreenShare).await
    }

    pub async fn stop_screen_share(&self) -> Result<()> {
        self.send(MeshCommand::StopScreenShare).await
    }

    pub async fn snapshot(&self) -> Result<MeshSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(MeshCommand::Snapshot(tx)).await?;
        rx.await.map_err(|_| MeshError::CoordinatorStopped)
    }

    pub async fn leave(&self) -> Result<()> {
        self.send(MeshCommand::Leave).await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MeshNotification> {
        self.notifications.subscribe()
    }
}
