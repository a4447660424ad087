use huddle_core::{ParticipantId, ParticipantInfo, RoomId};

use crate::media::LocalMediaState;
use crate::peer::{NegotiationState, PeerLink, Role};
use crate::transport::RemoteTrack;

/// What the UI knows about one remote participant.
#[derive(Debug, Clone)]
pub struct ParticipantView {
    pub id: ParticipantId,
    pub info: ParticipantInfo,
    pub role: Role,
    pub state: NegotiationState,
    pub screen_sharing: bool,
    pub remote_tracks: Vec<RemoteTrack>,
    pub queued_candidates: usize,
}

impl ParticipantView {
    pub(crate) fn from_link(link: &PeerLink) -> Self {
        Self {
            id: link.id().clone(),
            info: link.info().clone(),
            role: link.role(),
            state: link.state(),
            screen_sharing: link.screen_sharing(),
            remote_tracks: link.remote_tracks().to_vec(),
            queued_candidates: link.queued_candidates(),
        }
    }

    pub fn audio_enabled(&self) -> bool {
        self.info.audio_enabled
    }

    pub fn video_enabled(&self) -> bool {
        self.info.video_enabled
    }
}

/// Point-in-time copy of the coordinator's registry.
#[derive(Debug, Clone)]
pub struct MeshSnapshot {
    pub room_id: RoomId,
    /// Our id, once the relay has sent `welcome`.
    pub local_id: Option<ParticipantId>,
    pub local: LocalMediaState,
    /// Sorted by id.
    pub participants: Vec<ParticipantView>,
}

impl MeshSnapshot {
    pub fn participant(&self, id: &ParticipantId) -> Option<&ParticipantView> {
        self.participants.iter().find(|p| &p.id == id)
    }

    pub fn connected(&self) -> impl Iterator<Item = &ParticipantView> {
        self.participants
            .iter()
            .filter(|p| p.state == NegotiationState::Connected)
    }
}
