use huddle_core::{IceCandidate, MediaKind, ParticipantId, TrackId};
use std::fmt;
use std::sync::Arc;
use webrtc::track::track_remote::TrackRemote;

/// Identifies one peer link instance.
///
/// The epoch changes whenever a link for the same participant is recreated,
/// so events from a discarded connection can be told apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkTag {
    pub participant: ParticipantId,
    pub epoch: u64,
}

impl LinkTag {
    pub fn new(participant: ParticipantId, epoch: u64) -> Self {
        Self { participant, epoch }
    }
}

impl fmt::Display for LinkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.participant, self.epoch)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// A media track received from a remote participant.
#[derive(Clone)]
pub struct RemoteTrack {
    pub id: TrackId,
    pub kind: MediaKind,
    pub stream_id: String,
    /// Handle for reading the incoming RTP stream, absent for synthetic tracks.
    pub sink: Option<Arc<TrackRemote>>,
}

impl RemoteTrack {
    pub fn new(id: TrackId, kind: MediaKind, stream_id: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            stream_id: stream_id.into(),
            sink: None,
        }
    }
}

impl fmt::Debug for RemoteTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteTrack")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("stream_id", &self.stream_id)
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

/// Events a peer connection raises for the mesh coordinator.
#[derive(Debug)]
pub enum TransportEvent {
    /// A local ICE candidate that has to reach the remote side.
    CandidateGenerated(LinkTag, IceCandidate),

    StateChanged(LinkTag, ConnectionState),

    TrackAdded(LinkTag, RemoteTrack),
}
