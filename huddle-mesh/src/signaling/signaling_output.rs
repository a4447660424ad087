use std::sync::Arc;

use async_trait::async_trait;
use huddle_core::{ClientSignal, IceCandidate, ParticipantId, ServerSignal, SessionDescription};
use tokio::sync::mpsc;

use crate::error::Result;

/// Outbound half of the signaling relay connection.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    async fn send(&self, signal: ClientSignal) -> Result<()>;

    async fn send_offer(&self, to: ParticipantId, sdp: SessionDescription) -> Result<()> {
        self.send(ClientSignal::Offer { to, sdp }).await
    }

    async fn send_answer(&self, to: ParticipantId, sdp: SessionDescription) -> Result<()> {
        self.send(ClientSignal::Answer { to, sdp }).await
    }

    async fn send_ice(&self, to: ParticipantId, candidate: IceCandidate) -> Result<()> {
        self.send(ClientSignal::IceCandidate { to, candidate }).await
    }
}

/// Both directions of a relay connection.
pub struct SignalingLink {
    pub output: Arc<dyn SignalingOutput>,
    pub inbound: mpsc::Receiver<ServerSignal>,
}

impl SignalingLink {
    pub fn new(output: Arc<dyn SignalingOutput>, inbound: mpsc::Receiver<ServerSignal>) -> Self {
        Self { output, inbound }
    }
}
