use std::sync::Arc;

use async_trait::async_trait;
use huddle_core::{IceCandidate, MediaKind, SdpType, SessionDescription, TrackId};
use tokio::sync::mpsc;
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::track::track_remote::TrackRemote;

use crate::error::TransportError;
use crate::media::LocalTrack;
use crate::transport::{
    ConnectionState, LinkTag, OutgoingSender, PeerTransport, RemoteTrack, TransportConfig,
    TransportEvent, TransportFactory,
};

fn media_kind(codec: RTPCodecType) -> Option<MediaKind> {
    match codec {
        RTPCodecType::Audio => Some(MediaKind::Audio),
        RTPCodecType::Video => Some(MediaKind::Video),
        _ => None,
    }
}

fn connection_state(state: RTCPeerConnectionState) -> ConnectionState {
    match state {
        RTCPeerConnectionState::Connecting => ConnectionState::Connecting,
        RTCPeerConnectionState::Connected => ConnectionState::Connected,
        RTCPeerConnectionState::Disconnected => ConnectionState::Disconnected,
        RTCPeerConnectionState::Failed => ConnectionState::Failed,
        RTCPeerConnectionState::Closed => ConnectionState::Closed,
        _ => ConnectionState::New,
    }
}

/// Opens [`WebRtcTransport`]s using the configured ICE servers.
#[derive(Debug, Clone, Default)]
pub struct WebRtcTransportFactory {
    config: TransportConfig,
}

impl WebRtcTransportFactory {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl TransportFactory for WebRtcTransportFactory {
    async fn connect(
        &self,
        tag: LinkTag,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn PeerTransport>, TransportError> {
        let transport = WebRtcTransport::new(tag, &self.config, events).await?;
        Ok(Arc::new(transport))
    }
}

/// A [`PeerTransport`] backed by an `RTCPeerConnection`.
pub struct WebRtcTransport {
    tag: LinkTag,
    peer_connection: Arc<RTCPeerConnection>,
}

impl WebRtcTransport {
    /// Build the connection and wire its callbacks into `event_tx`.
    pub async fn new(
        tag: LinkTag,
        config: &TransportConfig,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Self, TransportError> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config
                .ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        let state_tx = event_tx.clone();
        let state_tag = tag.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                let tag = state_tag.clone();

                Box::pin(async move {
                    info!("Peer connection state for {}: {:?}", tag, s);
                    let _ = tx
                        .send(TransportEvent::StateChanged(tag, connection_state(s)))
                        .await;
                })
            },
        ));

        let ice_tx = event_tx.clone();
        let ice_tag = tag.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            let tag = ice_tag.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let candidate = IceCandidate {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_m_line_index: init.sdp_mline_index,
                };
                let _ = tx
                    .send(TransportEvent::CandidateGenerated(tag, candidate))
                    .await;
            })
        }));

        let track_tx = event_tx;
        let track_tag = tag.clone();
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let tx = track_tx.clone();
                let tag = track_tag.clone();

                Box::pin(async move {
                    let Some(kind) = media_kind(track.kind()) else {
                        return;
                    };
                    debug!("Remote {} track {} from {}", kind, track.id(), tag);
                    let remote = RemoteTrack {
                        id: TrackId::from(track.id()),
                        kind,
                        stream_id: track.stream_id(),
                        sink: Some(track),
                    };
                    let _ = tx.send(TransportEvent::TrackAdded(tag, remote)).await;
                })
            },
        ));

        Ok(Self {
            tag,
            peer_connection,
        })
    }

    pub fn tag(&self) -> &LinkTag {
        &self.tag
    }
}

#[async_trait]
impl PeerTransport for WebRtcTransport {
    async fn add_track(&self, track: &LocalTrack) -> Result<(), TransportError> {
        let sender = self.peer_connection.add_track(track.rtp_track()).await?;

        // RTCP has to be drained for the interceptors to keep working.
        tokio::spawn(async move {
            let mut rtcp_buf = vec![0u8; 1500];
            while sender.read(&mut rtcp_buf).await.is_ok() {}
        });
        Ok(())
    }

    async fn senders(&self) -> Result<Vec<OutgoingSender>, TransportError> {
        let mut senders = Vec::new();
        for sender in self.peer_connection.get_senders().await {
            let Some(track) = sender.track().await else {
                continue;
            };
            let Some(kind) = media_kind(track.kind()) else {
                continue;
            };
            senders.push(OutgoingSender {
                kind,
                track_id: TrackId::from(track.id()),
            });
        }
        Ok(senders)
    }

    async fn replace_track(&self, track: &LocalTrack) -> Result<(), TransportError> {
        for sender in self.peer_connection.get_senders().await {
            let Some(current) = sender.track().await else {
                continue;
            };
            if media_kind(current.kind()) == Some(track.kind()) {
                sender.replace_track(Some(track.rtp_track())).await?;
                return Ok(());
            }
        }
        Err(TransportError::NoSender(track.kind()))
    }

    async fn create_offer(&self) -> Result<SessionDescription, TransportError> {
        let offer = self.peer_connection.create_offer(None).await?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn create_answer(&self) -> Result<SessionDescription, TransportError> {
        let answer = self.peer_connection.create_answer(None).await?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), TransportError> {
        let desc = match desc.kind {
            SdpType::Offer => RTCSessionDescription::offer(desc.sdp)?,
            SdpType::Answer => RTCSessionDescription::answer(desc.sdp)?,
        };
        self.peer_connection.set_remote_description(desc).await?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), TransportError> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: None,
        };
        self.peer_connection.add_ice_candidate(init).await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.peer_connection.close().await?;
        Ok(())
    }
}
