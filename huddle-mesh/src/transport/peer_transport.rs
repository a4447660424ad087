use std::sync::Arc;

use async_trait::async_trait;
use huddle_core::{IceCandidate, MediaKind, SessionDescription, TrackId};
use tokio::sync::mpsc;

use crate::error::TransportError;
use crate::media::LocalTrack;
use crate::transport::{LinkTag, TransportEvent};

/// An outgoing RTP sender and the track it currently carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingSender {
    pub kind: MediaKind,
    pub track_id: TrackId,
}

/// The real-time connection object behind a peer link.
///
/// `create_offer` and `create_answer` also install the result as the local
/// description.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn add_track(&self, track: &LocalTrack) -> Result<(), TransportError>;

    async fn senders(&self) -> Result<Vec<OutgoingSender>, TransportError>;

    /// Swap the track on the sender of `track.kind()` without renegotiating.
    async fn replace_track(&self, track: &LocalTrack) -> Result<(), TransportError>;

    async fn create_offer(&self) -> Result<SessionDescription, TransportError>;

    async fn create_answer(&self) -> Result<SessionDescription, TransportError>;

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), TransportError>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), TransportError>;

    async fn close(&self) -> Result<(), TransportError>;
}

/// Opens peer connections. Every event the connection raises is tagged with
/// `tag` and pushed into `events`.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn connect(
        &self,
        tag: LinkTag,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn PeerTransport>, TransportError>;
}
