use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use huddle_core::{ClientSignal, ParticipantId, ParticipantInfo, RoomId, ServerSignal};
use huddle_mesh::{SignalingLink, SignalingOutput};
use tokio::sync::{Mutex, mpsc};

struct Member {
    room: Option<RoomId>,
    info: ParticipantInfo,
    tx: mpsc::Sender<ServerSignal>,
}

/// In-memory signaling relay routing between several coordinators.
///
/// Behaves like the production relay: `join-room` answers with the members
/// already present and announces the newcomer to them, and offers, answers
/// and candidates are forwarded with the sender's id.
#[derive(Clone, Default)]
pub struct Relay {
    members: Arc<Mutex<HashMap<ParticipantId, Member>>>,
}

impl Relay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a connection for `id`. The relay greets it with `welcome`.
    pub async fn connect(&self, id: &str) -> SignalingLink {
        let id = ParticipantId::from(id);
        let (tx, rx) = mpsc::channel(64);
        let _ = tx
            .send(ServerSignal::Welcome {
                participant_id: id.clone(),
            })
            .await;

        let mut info = ParticipantInfo::anonymous(id.clone());
        info.username = format!("user-{id}");
        self.members.lock().await.insert(
            id.clone(),
            Member {
                room: None,
                info,
                tx,
            },
        );

        let output = RelayConnection {
            id,
            relay: self.clone(),
        };
        SignalingLink::new(Arc::new(output), rx)
    }

    /// Whether `id` has sent `join-room` and not left since.
    pub async fn is_joined(&self, id: &str) -> bool {
        self.members
            .lock()
            .await
            .get(&ParticipantId::from(id))
            .is_some_and(|m| m.room.is_some())
    }

    /// Drop the connection of `id` as if its socket went away.
    pub async fn disconnect(&self, id: &str) {
        let id = ParticipantId::from(id);
        let Some(member) = self.members.lock().await.remove(&id) else {
            return;
        };
        if let Some(room) = member.room {
            self.broadcast(&id, &room, ServerSignal::ParticipantLeft { id: id.clone() })
                .await;
        }
    }

    async fn route(&self, from: &ParticipantId, signal: ClientSignal) {
        match signal {
            ClientSignal::JoinRoom { room_id } => {
                let (existing, info, own_tx) = {
                    let mut members = self.members.lock().await;
                    let existing: Vec<ParticipantInfo> = members
                        .values()
                        .filter(|m| m.room.as_ref() == Some(&room_id))
                        .map(|m| m.info.clone())
                        .collect();
                    let Some(me) = members.get_mut(from) else {
                        return;
                    };
                    me.room = Some(room_id.clone());
                    (existing, me.info.clone(), me.tx.clone())
                };

                self.broadcast(
                    from,
                    &room_id,
                    ServerSignal::ParticipantJoined { participant: info },
                )
                .await;
                let _ = own_tx
                    .send(ServerSignal::ExistingParticipants {
                        participants: existing,
                    })
                    .await;
            }

            ClientSignal::LeaveRoom { room_id } => {
                if let Some(me) = self.members.lock().await.get_mut(from) {
                    me.room = None;
                }
                self.broadcast(from, &room_id, ServerSignal::ParticipantLeft { id: from.clone() })
                    .await;
            }

            ClientSignal::Offer { to, sdp } => {
                let participant = self.info(from).await;
                self.forward(
                    &to,
                    ServerSignal::Offer {
                        from: from.clone(),
                        sdp,
                        participant,
                    },
                )
                .await;
            }

            ClientSignal::Answer { to, sdp } => {
                self.forward(&to, ServerSignal::Answer { from: from.clone(), sdp })
                    .await;
            }

            ClientSignal::IceCandidate { to, candidate } => {
                self.forward(
                    &to,
                    ServerSignal::IceCandidate {
                        from: from.clone(),
                        candidate,
                    },
                )
                .await;
            }

            ClientSignal::ToggleMedia {
                room_id,
                kind,
                enabled,
            } => {
                self.broadcast(
                    from,
                    &room_id,
                    ServerSignal::ParticipantMediaChanged {
                        id: from.clone(),
                        kind,
                        enabled,
                    },
                )
                .await;
            }

            ClientSignal::StartScreenShare { room_id } => {
                self.broadcast(
                    from,
                    &room_id,
                    ServerSignal::ParticipantScreenShare {
                        id: from.clone(),
                        active: true,
                    },
                )
                .await;
            }

            ClientSignal::StopScreenShare { room_id } => {
                self.broadcast(
                    from,
                    &room_id,
                    ServerSignal::ParticipantScreenShare {
                        id: from.clone(),
                        active: false,
                    },
                )
                .await;
            }
        }
    }

    async fn info(&self, id: &ParticipantId) -> Option<ParticipantInfo> {
        self.members.lock().await.get(id).map(|m| m.info.clone())
    }

    async fn forward(&self, to: &ParticipantId, signal: ServerSignal) {
        let tx = self.members.lock().await.get(to).map(|m| m.tx.clone());
        if let Some(tx) = tx {
            let _ = tx.send(signal).await;
        }
    }

    async fn broadcast(&self, from: &ParticipantId, room: &RoomId, signal: ServerSignal) {
        let targets: Vec<mpsc::Sender<ServerSignal>> = self
            .members
            .lock()
            .await
            .iter()
            .filter(|(id, m)| *id != from && m.room.as_ref() == Some(room))
            .map(|(_, m)| m.tx.clone())
            .collect();

        for tx in targets {
            let _ = tx.send(signal.clone()).await;
        }
    }
}

struct RelayConnection {
    id: ParticipantId,
    relay: Relay,
}

#[async_trait]
impl SignalingOutput for RelayConnection {
    async fn send(&self, signal: ClientSignal) -> huddle_mesh::Result<()> {
        tracing::debug!("[Relay] {} -> {:?}", self.id, signal);
        self.relay.route(&self.id, signal).await;
        Ok(())
    }
}
