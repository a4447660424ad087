use crate::model::media::MediaKind;
use crate::model::participant::{ParticipantId, ParticipantInfo};
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    pub sdp_mid: Option<String>,
    #[serde(rename = "sdpMLineIndex")]
    pub sdp_m_line_index: Option<u16>,
}

impl IceCandidate {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid: None,
            sdp_m_line_index: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpType {
    Offer,
    Answer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpType,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpType::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpType::Answer,
            sdp: sdp.into(),
        }
    }
}

/// Messages this participant sends to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "op",
    content = "d",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientSignal {
    JoinRoom {
        room_id: RoomId,
    },
    LeaveRoom {
        room_id: RoomId,
    },
    Offer {
        to: ParticipantId,
        sdp: SessionDescription,
    },
    Answer {
        to: ParticipantId,
        sdp: SessionDescription,
    },
    IceCandidate {
        to: ParticipantId,
        candidate: IceCandidate,
    },
    ToggleMedia {
        room_id: RoomId,
        kind: MediaKind,
        enabled: bool,
    },
    StartScreenShare {
        room_id: RoomId,
    },
    StopScreenShare {
        room_id: RoomId,
    },
}

/// Messages the relay delivers to this participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "op",
    content = "d",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerSignal {
    /// Our own id for this session.
    Welcome {
        participant_id: ParticipantId,
    },
    ExistingParticipants {
        participants: Vec<ParticipantInfo>,
    },
    ParticipantJoined {
        participant: ParticipantInfo,
    },
    ParticipantLeft {
        id: ParticipantId,
    },
    Offer {
        from: ParticipantId,
        sdp: SessionDescription,
        #[serde(default)]
        participant: Option<ParticipantInfo>,
    },
    Answer {
        from: ParticipantId,
        sdp: SessionDescription,
    },
    IceCandidate {
        from: ParticipantId,
        candidate: IceCandidate,
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
}
