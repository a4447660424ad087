use huddle_core::{MediaKind, ParticipantId, ParticipantInfo};

use crate::media::LocalMediaState;
use crate::peer::NegotiationState;
use crate::transport::RemoteTrack;

/// Changes the UI should render, broadcast to every subscriber.
#[derive(Debug, Clone)]
pub enum MeshNotification {
    ParticipantJoined(ParticipantInfo),

    /// The link is gone. `state` is the terminal state it ended in.
    ParticipantLeft {
        id: ParticipantId,
        state: NegotiationState,
    },

    LinkStateChanged {
        id: ParticipantId,
        state: NegotiationState,
    },

    /// Sent once per distinct track id.
    RemoteTrackAdded {
        participant: ParticipantId,
        track: RemoteTrack,
    },

    ParticipantMediaChanged {
        id: ParticipantId,
        kind: MediaKind,
        enabled: bool,
    },

    ParticipantScreenShare {
        id: ParticipantId,
        active: bool,
    },

    LocalMediaChanged(LocalMediaState),
}
