use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of one joined session, as assigned by the relay.
///
/// A user who reconnects gets a new id. Ids are ordered lexicographically,
/// which the mesh uses to break offer glare.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for ParticipantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the relay tells us about a remote participant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantInfo {
    #[serde(rename = "socketId")]
    pub id: ParticipantId,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(rename = "isAudioEnabled", default = "enabled_by_default")]
    pub audio_enabled: bool,
    #[serde(rename = "isVideoEnabled", default = "enabled_by_default")]
    pub video_enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl ParticipantInfo {
    /// Placeholder for a participant we only know by id (e.g. an offer that
    /// arrived without a preceding `participant-joined`).
    pub fn anonymous(id: ParticipantId) -> Self {
        Self {
            id,
            user_id: String::new(),
            username: String::new(),
            audio_enabled: true,
            video_enabled: true,
        }
    }
}
