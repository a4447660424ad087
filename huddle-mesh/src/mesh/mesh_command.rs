use huddle_core::MediaKind;
use tokio::sync::oneshot;

use crate::mesh::MeshSnapshot;

/// Requests from the UI, delivered through a [`MeshHandle`](crate::MeshHandle).
#[derive(Debug)]
pub enum MeshCommand {
    /// Flip the microphone (audio) or camera (video) track.
    ToggleMedia(MediaKind),

    StartScreenShare,

    StopScreenShare,

    Snapshot(oneshot::Sender<MeshSnapshot>),

    /// Close every link, release devices and stop the coordinator.
    Leave,
}
