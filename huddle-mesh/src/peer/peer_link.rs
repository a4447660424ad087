use std::collections::VecDeque;
use std::sync::Arc;

use huddle_core::{IceCandidate, MediaKind, ParticipantId, ParticipantInfo};
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use crate::error::{MeshError, Result, TransportError};
use crate::media::{LocalTrack, MediaSource};
use crate::peer::{LinkEvent, NegotiationState};
use crate::transport::{LinkTag, PeerTransport, RemoteTrack};

/// Which side of the offer/answer exchange this link plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Offerer,
    Answerer,
}

/// An asynchronous negotiation step currently running for the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingOp {
    LocalOffer,
    ApplyOffer,
    ApplyAnswer,
}

/// Result of [`PeerLink::replace_outgoing_track`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    Replaced,
    /// The sender already carries this track.
    AlreadyAttached,
    /// The connection has no sender of that kind. Adding one would take a
    /// fresh offer/answer round.
    NoSender,
}

/// Connection state for one remote participant.
pub struct PeerLink {
    tag: LinkTag,
    role: Role,
    state: NegotiationState,
    info: ParticipantInfo,
    screen_sharing: bool,
    transport: Arc<dyn PeerTransport>,
    remote_tracks: Vec<RemoteTrack>,
    pending_candidates: VecDeque<IceCandidate>,
    local_description: bool,
    remote_description: bool,
    pending: Option<PendingOp>,
    negotiation_timer: Option<AbortHandle>,
}

impl PeerLink {
    pub fn new(
        tag: LinkTag,
        info: ParticipantInfo,
        role: Role,
        transport: Arc<dyn PeerTransport>,
    ) -> Self {
        Self {
            tag,
            role,
            state: NegotiationState::Idle,
            info,
            screen_sharing: false,
            transport,
            remote_tracks: Vec::new(),
            pending_candidates: VecDeque::new(),
            local_description: false,
            remote_description: false,
            pending: None,
            negotiation_timer: None,
        }
    }

    pub fn id(&self) -> &ParticipantId {
        &self.tag.participant
    }

    pub fn tag(&self) -> &LinkTag {
        &self.tag
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn info(&self) -> &ParticipantInfo {
        &self.info
    }

    pub fn set_info(&mut self, info: ParticipantInfo) {
        self.info = info;
    }

    pub fn set_media_enabled(&mut self, kind: MediaKind, enabled: bool) {
        match kind {
            MediaKind::Audio => self.info.audio_enabled = enabled,
            MediaKind::Video => self.info.video_enabled = enabled,
        }
    }

    pub fn screen_sharing(&self) -> bool {
        self.screen_sharing
    }

    pub fn set_screen_sharing(&mut self, active: bool) {
        self.screen_sharing = active;
    }

    pub fn remote_tracks(&self) -> &[RemoteTrack] {
        &self.remote_tracks
    }

    pub fn queued_candidates(&self) -> usize {
        self.pending_candidates.len()
    }

    pub fn has_local_description(&self) -> bool {
        self.local_description
    }

    pub fn has_remote_description(&self) -> bool {
        self.remote_description
    }

    pub fn pending(&self) -> Option<PendingOp> {
        self.pending
    }

    pub fn set_pending(&mut self, op: Option<PendingOp>) {
        self.pending = op;
    }

    pub fn transport(&self) -> Arc<dyn PeerTransport> {
        self.transport.clone()
    }

    /// Apply `event` to the state machine.
    ///
    /// Connected is only reachable once both descriptions are in place.
    pub fn advance(&mut self, event: LinkEvent) -> Result<NegotiationState> {
        let invalid = || MeshError::InvalidTransition {
            participant: self.tag.participant.clone(),
            state: self.state,
            event,
        };

        let next = self.state.next(event).ok_or_else(invalid)?;
        if next == NegotiationState::Connected
            && !(self.local_description && self.remote_description)
        {
            return Err(invalid());
        }

        debug!(
            "Link {}: {:?} -> {:?} on {:?}",
            self.tag, self.state, next, event
        );
        self.state = next;

        if next == NegotiationState::Connected || next.is_terminal() {
            self.disarm_timer();
        }
        Ok(next)
    }

    pub fn arm_timer(&mut self, timer: AbortHandle) {
        self.disarm_timer();
        self.negotiation_timer = Some(timer);
    }

    fn disarm_timer(&mut self) {
        if let Some(timer) = self.negotiation_timer.take() {
            timer.abort();
        }
    }

    pub fn mark_local_description(&mut self) {
        self.local_description = true;
    }

    pub fn mark_remote_description(&mut self) {
        self.remote_description = true;
    }

    /// Attach every outgoing local track. Returns how many were attached.
    pub async fn attach_local_tracks(&self, media: &MediaSource) -> usize {
        let mut attached = 0;
        for track in media.outgoing_tracks() {
            match self.transport.add_track(track).await {
                Ok(()) => attached += 1,
                Err(e) => warn!(
                    "Failed to attach {} track {} to {}: {}",
                    track.kind(),
                    track.id(),
                    self.tag,
                    e
                ),
            }
        }
        attached
    }

    /// Swap the outgoing track of `track.kind()` in place.
    pub async fn replace_outgoing_track(
        &self,
        track: &LocalTrack,
    ) -> std::result::Result<ReplaceOutcome, TransportError> {
        let senders = self.transport.senders().await?;
        let Some(sender) = senders.iter().find(|s| s.kind == track.kind()) else {
            return Ok(ReplaceOutcome::NoSender);
        };
        if &sender.track_id == track.id() {
            return Ok(ReplaceOutcome::AlreadyAttached);
        }

        self.transport.replace_track(track).await?;
        Ok(ReplaceOutcome::Replaced)
    }

    /// Apply a remote candidate, or queue it until the remote description
    /// is set. Returns `true` if it was applied right away.
    pub async fn add_ice_candidate(
        &mut self,
        candidate: IceCandidate,
    ) -> std::result::Result<bool, TransportError> {
        if !self.remote_description {
            self.pending_candidates.push_back(candidate);
            return Ok(false);
        }
        self.transport.add_ice_candidate(candidate).await?;
        Ok(true)
    }

    /// Replay queued candidates in arrival order. Returns how many applied.
    pub async fn flush_candidates(&mut self) -> usize {
        if !self.remote_description {
            return 0;
        }

        let mut applied = 0;
        while let Some(candidate) = self.pending_candidates.pop_front() {
            match self.transport.add_ice_candidate(candidate).await {
                Ok(()) => applied += 1,
                Err(e) => warn!("Failed to apply queued ICE candidate for {}: {}", self.tag, e),
            }
        }
        applied
    }

    /// Hand over candidates that never got applied, oldest first.
    pub fn take_queued_candidates(&mut self) -> Vec<IceCandidate> {
        self.pending_candidates.drain(..).collect()
    }

    /// Remember a remote track. Returns `false` for a track id already seen.
    pub fn record_remote_track(&mut self, track: RemoteTrack) -> bool {
        if self.remote_tracks.iter().any(|t| t.id == track.id) {
            return false;
        }
        self.remote_tracks.push(track);
        true
    }

    /// Move to a terminal state and release the connection.
    pub async fn shutdown(&mut self, event: LinkEvent) {
        if !self.state.is_terminal() && self.advance(event).is_err() {
            let _ = self.advance(LinkEvent::LocalClose);
        }

        self.disarm_timer();
        self.pending = None;
        self.pending_candidates.clear();

        if let Err(e) = self.transport.close().await {
            warn!("Failed to close transport for {}: {}", self.tag, e);
        }
    }
}
