//! Error types for the mesh session.

use huddle_core::{MediaKind, ParticipantId};

use crate::peer::{LinkEvent, NegotiationState};

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("signaling link is closed")]
    SignalingClosed,

    #[error("signaling error: {0}")]
    Signaling(String),

    #[error("mesh coordinator has stopped")]
    CoordinatorStopped,

    #[error("link {participant} cannot handle {event:?} in state {state:?}")]
    InvalidTransition {
        participant: ParticipantId,
        state: NegotiationState,
        event: LinkEvent,
    },
}

/// Failures reported by a peer connection.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("webrtc: {0}")]
    WebRtc(#[from] webrtc::Error),

    #[error("no {0} sender on this connection")]
    NoSender(MediaKind),

    #[error("connection is closed")]
    Closed,

    #[error("{0}")]
    Other(String),
}

/// Failures acquiring local capture devices.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("permission denied for {0}")]
    PermissionDenied(MediaKind),

    #[error("no {0} device available")]
    Unavailable(MediaKind),

    #[error("capture cancelled by user")]
    Cancelled,
}
