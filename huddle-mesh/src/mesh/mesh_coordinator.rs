use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use huddle_core::{
    ClientSignal, IceCandidate, MediaKind, ParticipantId, ParticipantInfo, RoomId, SdpType,
    ServerSignal, SessionDescription,
};
use tokio::sync::{broadcast, mpsc};
use tokio::task::AbortHandle;
use tracing::{debug, error, info, warn};

use crate::config::MeshConfig;
use crate::error::{DeviceError, Result};
use crate::media::{CaptureDevices, LocalTrack, MediaSource, ScreenCapture};
use crate::mesh::{MeshCommand, MeshEvent, MeshHandle, MeshNotification, MeshSnapshot, ParticipantView};
use crate::peer::{LinkEvent, NegotiationState, PeerLink, PendingOp, ReplaceOutcome, Role};
use crate::signaling::{SignalingLink, SignalingOutput};
use crate::transport::{
    ConnectionState, LinkTag, TransportEvent, TransportFactory, WebRtcTransportFactory,
};

/// Owns every peer link of one room session.
///
/// Signaling, transport callbacks, UI commands and the results of spawned
/// negotiation steps are all handled on the single loop in [`run`](Self::run),
/// so link state is never touched concurrently.
pub struct MeshCoordinator {
    room_id: RoomId,
    config: MeshConfig,

    /// Set by the relay's `welcome`.
    local_id: Option<ParticipantId>,

    /// Exactly one entry per remote participant. Links leave the map as soon
    /// as they reach a terminal state.
    links: HashMap<ParticipantId, PeerLink>,
    next_epoch: u64,

    media: MediaSource,
    screen_share_pending: bool,
    /// Watches the platform "sharing ended" signal of the active screen track.
    screen_watch: Option<AbortHandle>,

    signaling: Arc<dyn SignalingOutput>,
    signal_rx: mpsc::Receiver<ServerSignal>,

    command_rx: mpsc::Receiver<MeshCommand>,

    transport_rx: mpsc::Receiver<TransportEvent>,
    transport_tx: mpsc::Sender<TransportEvent>,

    internal_rx: mpsc::Receiver<MeshEvent>,
    internal_tx: mpsc::Sender<MeshEvent>,

    transports: Arc<dyn TransportFactory>,
    devices: Arc<dyn CaptureDevices>,

    notifications: broadcast::Sender<MeshNotification>,
}

impl MeshCoordinator {
    pub fn new(
        room_id: RoomId,
        config: MeshConfig,
        signaling: SignalingLink,
        transports: Arc<dyn TransportFactory>,
        devices: Arc<dyn CaptureDevices>,
    ) -> (Self, MeshHandle) {
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer);
        let (transport_tx, transport_rx) = mpsc::channel(config.event_buffer);
        let (internal_tx, internal_rx) = mpsc::channel(config.event_buffer);
        let (notifications, _) = broadcast::channel(config.notification_buffer);

        let handle = MeshHandle::new(command_tx, notifications.clone());
        let coordinator = Self {
            room_id,
            config,
            local_id: None,
            links: HashMap::new(),
            next_epoch: 0,
            media: MediaSource::default(),
            screen_share_pending: false,
            screen_watch: None,
            signaling: signaling.output,
            signal_rx: signaling.inbound,
            command_rx,
            transport_rx,
            transport_tx,
            internal_rx,
            internal_tx,
            transports,
            devices,
            notifications,
        };
        (coordinator, handle)
    }

    /// Coordinator backed by real `webrtc` peer connections built from
    /// `config.transport`.
    pub fn with_webrtc(
        room_id: RoomId,
        config: MeshConfig,
        signaling: SignalingLink,
        devices: Arc<dyn CaptureDevices>,
    ) -> (Self, MeshHandle) {
        let transports = Arc::new(WebRtcTransportFactory::new(config.transport.clone()));
        Self::new(room_id, config, signaling, transports, devices)
    }

    /// Join the room and process events until the session ends.
    ///
    /// Ends on [`MeshHandle::leave`], when every handle is dropped, or when
    /// the signaling stream closes. Only a failure to announce the join is
    /// returned as an error.
    pub async fn run(mut self) -> Result<()> {
        self.join().await?;
        info!("Mesh event loop started for room {}", self.room_id);

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(MeshCommand::Leave) => {
                            info!("Leave requested");
                            break;
                        }
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("All handles dropped. Leaving room.");
                            break;
                        }
                    }
                }

                signal = self.signal_rx.recv() => {
                    match signal {
                        Some(s) => self.handle_signal(s).await,
                        None => {
                            warn!("Signaling stream closed. Leaving room.");
                            break;
                        }
                    }
                }

                Some(evt) = self.transport_rx.recv() => {
                    self.handle_transport_event(evt).await;
                }

                Some(evt) = self.internal_rx.recv() => {
                    self.handle_mesh_event(evt).await;
                }
            }
        }

        self.leave().await;
        info!("Mesh event loop finished");
        Ok(())
    }

    async fn join(&mut self) -> Result<()> {
        self.media = MediaSource::acquire(self.devices.as_ref()).await;
        self.notify(MeshNotification::LocalMediaChanged(self.media.state()));

        let join = ClientSignal::JoinRoom {
            room_id: self.room_id.clone(),
        };
        if let Err(e) = self.signaling.send(join).await {
            error!("Failed to join room {}: {}", self.room_id, e);
            self.media.release(self.devices.as_ref());
            return Err(e);
        }
        info!("Joining room {}", self.room_id);
        Ok(())
    }

    async fn leave(&mut self) {
        // From here on a finished capture task fails to report back and
        // releases its own track.
        self.internal_rx.close();
        self.stop_screen_watch();

        let ids: Vec<ParticipantId> = self.links.keys().cloned().collect();
        for id in ids {
            self.remove_participant(&id, LinkEvent::LocalClose).await;
        }

        self.media.release(self.devices.as_ref());
        self.screen_share_pending = false;
        self.notify(MeshNotification::LocalMediaChanged(self.media.state()));

        let leave = ClientSignal::LeaveRoom {
            room_id: self.room_id.clone(),
        };
        if let Err(e) = self.signaling.send(leave).await {
            debug!("Could not announce leave: {}", e);
        }

        while let Ok(event) = self.internal_rx.try_recv() {
            if let MeshEvent::ScreenCaptureReady {
                result: Ok(capture),
            } = event
            {
                info!("Releasing screen capture that finished while leaving");
                self.devices.release(&capture.track);
            }
        }
        info!("Left room {}", self.room_id);
    }

    async fn handle_command(&mut self, cmd: MeshCommand) {
        match cmd {
            MeshCommand::ToggleMedia(kind) => self.toggle_media(kind).await,
            MeshCommand::StartScreenShare => self.start_screen_share(),
            MeshCommand::StopScreenShare => self.stop_screen_share().await,
            MeshCommand::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            // Handled by the loop.
            MeshCommand::Leave => {}
        }
    }

    async fn handle_signal(&mut self, signal: ServerSignal) {
        match signal {
            ServerSignal::Welcome { participant_id } => {
                info!("Relay assigned id {}", participant_id);
                self.local_id = Some(participant_id);
            }

            ServerSignal::ExistingParticipants { participants } => {
                info!(
                    "{} participant(s) already in room {}",
                    participants.len(),
                    self.room_id
                );
                for info in participants {
                    if self.is_local(&info.id) {
                        continue;
                    }
                    if self.links.contains_key(&info.id) {
                        debug!("Already linked to {}", info.id);
                        continue;
                    }

                    let id = info.id.clone();
                    if self.create_link(info.clone(), Role::Offerer).await {
                        self.notify(MeshNotification::ParticipantJoined(info));
                        self.begin_offer(&id);
                    }
                }
            }

            ServerSignal::ParticipantJoined { participant } => {
                if self.is_local(&participant.id) {
                    return;
                }
                if let Some(link) = self.links.get_mut(&participant.id) {
                    debug!("Duplicate join for {}", participant.id);
                    link.set_info(participant);
                    return;
                }

                info!("Participant {} joined", participant.id);
                if self.create_link(participant.clone(), Role::Answerer).await {
                    self.notify(MeshNotification::ParticipantJoined(participant));
                }
            }

            ServerSignal::ParticipantLeft { id } => {
                info!("Participant {} left", id);
                self.remove_participant(&id, LinkEvent::RemoteClosed).await;
            }

            ServerSignal::Offer {
                from,
                sdp,
                participant,
            } => self.on_offer(from, sdp, participant).await,

            ServerSignal::Answer { from, sdp } => self.on_answer(from, sdp),

            ServerSignal::IceCandidate { from, candidate } => {
                self.on_ice_candidate(from, candidate).await
            }

            ServerSignal::ParticipantMediaChanged { id, kind, enabled } => {
                let Some(link) = self.links.get_mut(&id) else {
                    debug!("Media change for unknown participant {}", id);
                    return;
                };
                link.set_media_enabled(kind, enabled);
                self.notify(MeshNotification::ParticipantMediaChanged { id, kind, enabled });
            }

            ServerSignal::ParticipantScreenShare { id, active } => {
                let Some(link) = self.links.get_mut(&id) else {
                    debug!("Screen share update for unknown participant {}", id);
                    return;
                };
                link.set_screen_sharing(active);
                self.notify(MeshNotification::ParticipantScreenShare { id, active });
            }
        }
    }

    async fn on_offer(
        &mut self,
        from: ParticipantId,
        sdp: SessionDescription,
        participant: Option<ParticipantInfo>,
    ) {
        if sdp.kind != SdpType::Offer {
            warn!("Offer from {} carries a {:?} description", from, sdp.kind);
            return;
        }
        if self.is_local(&from) {
            warn!("Ignoring offer addressed from our own id");
            return;
        }

        let current = self.links.get(&from).map(|l| (l.state(), l.pending()));
        match current {
            None => {
                let info = participant.unwrap_or_else(|| ParticipantInfo::anonymous(from.clone()));
                if !self.create_link(info.clone(), Role::Answerer).await {
                    return;
                }
                self.notify(MeshNotification::ParticipantJoined(info));
            }

            Some((state, _)) if state.is_offering() => {
                if !self.yields_to(&from) {
                    info!("Offer collision with {}: keeping our offer", from);
                    return;
                }
                info!("Offer collision with {}: answering theirs", from);

                let Some(mut stale) = self.links.remove(&from) else {
                    return;
                };
                let carried = stale.take_queued_candidates();
                stale.shutdown(LinkEvent::LocalClose).await;

                let info = participant.unwrap_or_else(|| stale.info().clone());
                if !self.create_link(info, Role::Answerer).await {
                    self.notify(MeshNotification::ParticipantLeft {
                        id: from,
                        state: NegotiationState::Failed,
                    });
                    return;
                }
                if let Some(link) = self.links.get_mut(&from) {
                    for candidate in carried {
                        let _ = link.add_ice_candidate(candidate).await;
                    }
                }
            }

            Some((NegotiationState::Idle, None)) => {
                if let (Some(info), Some(link)) = (participant, self.links.get_mut(&from)) {
                    link.set_info(info);
                }
            }

            Some((state, pending)) => {
                warn!(
                    "Ignoring offer from {} in state {:?} (pending {:?})",
                    from, state, pending
                );
                return;
            }
        }

        let Some(link) = self.links.get_mut(&from) else {
            return;
        };
        link.set_pending(Some(PendingOp::ApplyOffer));

        let tag = link.tag().clone();
        let transport = link.transport();
        let events = self.internal_tx.clone();
        tokio::spawn(async move {
            let result = match transport.set_remote_description(sdp).await {
                Ok(()) => transport.create_answer().await,
                Err(e) => Err(e),
            };
            let _ = events.send(MeshEvent::RemoteOfferApplied { tag, result }).await;
        });
    }

    fn on_answer(&mut self, from: ParticipantId, sdp: SessionDescription) {
        if sdp.kind != SdpType::Answer {
            warn!("Answer from {} carries a {:?} description", from, sdp.kind);
            return;
        }
        let Some(link) = self.links.get_mut(&from) else {
            warn!("Answer from unknown participant {}", from);
            return;
        };
        if link.state() != NegotiationState::OfferSent || link.pending().is_some() {
            warn!(
                "Ignoring answer from {} in state {:?}",
                from,
                link.state()
            );
            return;
        }

        link.set_pending(Some(PendingOp::ApplyAnswer));
        let tag = link.tag().clone();
        let transport = link.transport();
        let events = self.internal_tx.clone();
        tokio::spawn(async move {
            let result = transport.set_remote_description(sdp).await;
            let _ = events.send(MeshEvent::RemoteAnswerApplied { tag, result }).await;
        });
    }

    async fn on_ice_candidate(&mut self, from: ParticipantId, candidate: IceCandidate) {
        let Some(link) = self.links.get_mut(&from) else {
            debug!("Dropping ICE candidate from unknown participant {}", from);
            return;
        };

        match link.add_ice_candidate(candidate).await {
            Ok(true) => debug!("Applied ICE candidate from {}", from),
            Ok(false) => debug!(
                "Queued ICE candidate from {} ({} waiting)",
                from,
                link.queued_candidates()
            ),
            Err(e) => warn!("Failed to add ICE candidate for {}: {}", from, e),
        }
    }

    async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::CandidateGenerated(tag, candidate) => {
                if !self.is_current(&tag) {
                    debug!("Dropping local candidate of stale link {}", tag);
                    return;
                }
                if let Err(e) = self.signaling.send_ice(tag.participant, candidate).await {
                    warn!("Failed to send ICE candidate: {}", e);
                }
            }

            TransportEvent::StateChanged(tag, state) => {
                if !self.is_current(&tag) {
                    return;
                }
                match state {
                    ConnectionState::Failed => {
                        warn!("Connection to {} failed", tag);
                        self.remove_participant(&tag.participant, LinkEvent::TransportError)
                            .await;
                    }
                    ConnectionState::Closed => {
                        info!("Connection to {} closed by the remote side", tag);
                        self.remove_participant(&tag.participant, LinkEvent::RemoteClosed)
                            .await;
                    }
                    ConnectionState::Disconnected => {
                        warn!("Connection to {} interrupted", tag);
                    }
                    other => debug!("Connection to {} is {:?}", tag, other),
                }
            }

            TransportEvent::TrackAdded(tag, track) => {
                let Some(link) = live_link(&mut self.links, &tag) else {
                    return;
                };
                if !link.record_remote_track(track.clone()) {
                    debug!("Duplicate remote track {} from {}", track.id, tag);
                    return;
                }
                info!("Remote {} track {} from {}", track.kind, track.id, tag);
                self.notify(MeshNotification::RemoteTrackAdded {
                    participant: tag.participant,
                    track,
                });
            }
        }
    }

    async fn handle_mesh_event(&mut self, event: MeshEvent) {
        match event {
            MeshEvent::LocalOfferReady { tag, result } => {
                let Some(link) = live_link(&mut self.links, &tag) else {
                    debug!("Dropping offer of stale link {}", tag);
                    return;
                };
                link.set_pending(None);

                let offer = match result {
                    Ok(offer) => offer,
                    Err(e) => {
                        warn!("Failed to create offer for {}: {}", tag, e);
                        self.remove_participant(&tag.participant, LinkEvent::TransportError)
                            .await;
                        return;
                    }
                };
                link.mark_local_description();

                if let Err(e) = self.signaling.send_offer(tag.participant.clone(), offer).await {
                    error!("Failed to send offer to {}: {}", tag, e);
                }
                if let Err(e) = link.advance(LinkEvent::OfferSent) {
                    warn!("{}", e);
                }
            }

            MeshEvent::RemoteOfferApplied { tag, result } => {
                let Some(link) = live_link(&mut self.links, &tag) else {
                    debug!("Dropping answer of stale link {}", tag);
                    return;
                };
                link.set_pending(None);

                let answer = match result {
                    Ok(answer) => answer,
                    Err(e) => {
                        warn!("Failed to answer offer from {}: {}", tag, e);
                        self.remove_participant(&tag.participant, LinkEvent::TransportError)
                            .await;
                        return;
                    }
                };
                link.mark_remote_description();
                link.mark_local_description();
                let flushed = link.flush_candidates().await;
                if flushed > 0 {
                    debug!("Applied {} queued ICE candidate(s) for {}", flushed, tag);
                }

                if let Err(e) = link.advance(LinkEvent::OfferReceived) {
                    warn!("{}", e);
                    return;
                }
                if let Err(e) = self.signaling.send_answer(tag.participant.clone(), answer).await {
                    error!("Failed to send answer to {}: {}", tag, e);
                }
                match link.advance(LinkEvent::AnswerSent) {
                    Ok(state) => self.notify(MeshNotification::LinkStateChanged {
                        id: tag.participant,
                        state,
                    }),
                    Err(e) => warn!("{}", e),
                }
            }

            MeshEvent::RemoteAnswerApplied { tag, result } => {
                let Some(link) = live_link(&mut self.links, &tag) else {
                    debug!("Dropping answer result of stale link {}", tag);
                    return;
                };
                link.set_pending(None);

                if let Err(e) = result {
                    warn!("Failed to apply answer from {}: {}", tag, e);
                    self.remove_participant(&tag.participant, LinkEvent::TransportError)
                        .await;
                    return;
                }
                link.mark_remote_description();
                let flushed = link.flush_candidates().await;
                if flushed > 0 {
                    debug!("Applied {} queued ICE candidate(s) for {}", flushed, tag);
                }

                match link.advance(LinkEvent::AnswerReceived) {
                    Ok(state) => self.notify(MeshNotification::LinkStateChanged {
                        id: tag.participant,
                        state,
                    }),
                    Err(e) => warn!("{}", e),
                }
            }

            MeshEvent::NegotiationTimedOut { tag } => {
                let Some(link) = live_link(&mut self.links, &tag) else {
                    return;
                };
                if !link.state().is_offering() {
                    return;
                }
                warn!(
                    "Negotiation with {} timed out in state {:?}",
                    tag,
                    link.state()
                );
                self.remove_participant(&tag.participant, LinkEvent::NegotiationTimeout)
                    .await;
            }

            MeshEvent::ScreenCaptureReady { result } => {
                self.screen_share_pending = false;
                match result {
                    Ok(capture) => self.begin_screen_share(capture).await,
                    Err(DeviceError::Cancelled) => info!("Screen share cancelled"),
                    Err(e) => warn!("Failed to start screen share: {}", e),
                }
            }

            MeshEvent::ScreenShareEnded { track_id } => {
                let current = self.media.screen().is_some_and(|t| t.id() == &track_id);
                if !current {
                    debug!("Ignoring end of outdated screen track {}", track_id);
                    return;
                }
                info!("Screen share ended by the system");
                self.stop_screen_share().await;
            }
        }
    }

    /// Register a new link for `info.id` and attach the local tracks.
    ///
    /// Returns `false` if the connection object could not be built, in which
    /// case nothing is registered.
    async fn create_link(&mut self, info: ParticipantInfo, role: Role) -> bool {
        self.next_epoch += 1;
        let tag = LinkTag::new(info.id.clone(), self.next_epoch);

        let transport = match self
            .transports
            .connect(tag.clone(), self.transport_tx.clone())
            .await
        {
            Ok(transport) => transport,
            Err(e) => {
                error!("Failed to create transport for {}: {}", tag, e);
                return false;
            }
        };

        let link = PeerLink::new(tag.clone(), info, role, transport);
        let attached = link.attach_local_tracks(&self.media).await;
        debug!(
            "Link {} created as {:?} with {} local track(s)",
            tag, role, attached
        );

        self.links.insert(tag.participant, link);
        true
    }

    fn begin_offer(&mut self, id: &ParticipantId) {
        let Some(link) = self.links.get_mut(id) else {
            return;
        };
        if let Err(e) = link.advance(LinkEvent::CreateOffer) {
            warn!("{}", e);
            return;
        }
        link.set_pending(Some(PendingOp::LocalOffer));

        let tag = link.tag().clone();
        let transport = link.transport();
        let events = self.internal_tx.clone();
        let offer_tag = tag.clone();
        let offer_events = events.clone();
        tokio::spawn(async move {
            let result = transport.create_offer().await;
            let _ = offer_events
                .send(MeshEvent::LocalOfferReady {
                    tag: offer_tag,
                    result,
                })
                .await;
        });

        link.arm_timer(negotiation_timer(
            tag,
            self.config.negotiation_timeout,
            events,
        ));
    }

    /// Close and drop the link for `id`, then tell subscribers.
    async fn remove_participant(&mut self, id: &ParticipantId, event: LinkEvent) {
        let Some(mut link) = self.links.remove(id) else {
            debug!("No link for {}", id);
            return;
        };
        link.shutdown(event).await;
        info!("Link {} removed in state {:?}", link.tag(), link.state());

        self.notify(MeshNotification::ParticipantLeft {
            id: id.clone(),
            state: link.state(),
        });
    }

    async fn toggle_media(&mut self, kind: MediaKind) {
        let Some(enabled) = self.media.toggle(kind) else {
            info!("No local {} track to toggle", kind);
            return;
        };
        info!(
            "Local {} {}",
            kind,
            if enabled { "enabled" } else { "disabled" }
        );

        self.send_signal(ClientSignal::ToggleMedia {
            room_id: self.room_id.clone(),
            kind,
            enabled,
        })
        .await;
        self.notify(MeshNotification::LocalMediaChanged(self.media.state()));
    }

    fn start_screen_share(&mut self) {
        if self.media.is_screen_sharing() || self.screen_share_pending {
            debug!("Screen share already active or pending");
            return;
        }
        self.screen_share_pending = true;

        let devices = self.devices.clone();
        let events = self.internal_tx.clone();
        tokio::spawn(async move {
            let result = devices.open_screen().await;
            // The coordinator is gone; nobody else will stop this capture.
            if let Err(mpsc::error::SendError(MeshEvent::ScreenCaptureReady {
                result: Ok(capture),
            })) = events.send(MeshEvent::ScreenCaptureReady { result }).await
            {
                devices.release(&capture.track);
            }
        });
    }

    async fn begin_screen_share(&mut self, capture: ScreenCapture) {
        let ScreenCapture { track, ended } = capture;
        let track_id = track.id().clone();

        let generation = self.media.begin_screen_share(track.clone());
        info!(
            "Screen share started with track {} (generation {})",
            track_id, generation
        );
        self.apply_media_change(&track).await;

        self.send_signal(ClientSignal::StartScreenShare {
            room_id: self.room_id.clone(),
        })
        .await;
        self.notify(MeshNotification::LocalMediaChanged(self.media.state()));

        let events = self.internal_tx.clone();
        let watch = tokio::spawn(async move {
            if ended.await.is_ok() {
                let _ = events.send(MeshEvent::ScreenShareEnded { track_id }).await;
            }
        });
        self.screen_watch = Some(watch.abort_handle());
    }

    async fn stop_screen_share(&mut self) {
        let Some(screen) = self.media.end_screen_share() else {
            debug!("No active screen share to stop");
            return;
        };
        self.stop_screen_watch();
        self.devices.release(&screen);
        info!(
            "Screen share stopped (generation {})",
            self.media.generation()
        );

        if let Some(camera) = self.media.camera().cloned() {
            self.apply_media_change(&camera).await;
        }

        self.send_signal(ClientSignal::StopScreenShare {
            room_id: self.room_id.clone(),
        })
        .await;
        self.notify(MeshNotification::LocalMediaChanged(self.media.state()));
    }

    fn stop_screen_watch(&mut self) {
        if let Some(watch) = self.screen_watch.take() {
            watch.abort();
        }
    }

    /// Put `track` on the matching sender of every live link.
    async fn apply_media_change(&self, track: &LocalTrack) {
        let (mut replaced, mut unchanged, mut missing, mut failed) = (0, 0, 0, 0);

        for link in self.links.values() {
            match link.replace_outgoing_track(track).await {
                Ok(ReplaceOutcome::Replaced) => replaced += 1,
                Ok(ReplaceOutcome::AlreadyAttached) => unchanged += 1,
                Ok(ReplaceOutcome::NoSender) => {
                    debug!("Link {} has no {} sender", link.tag(), track.kind());
                    missing += 1;
                }
                Err(e) => {
                    warn!(
                        "Failed to replace {} track on {}: {}",
                        track.kind(),
                        link.tag(),
                        e
                    );
                    failed += 1;
                }
            }
        }

        info!(
            "Media generation {} applied: {} replaced, {} unchanged, {} without sender, {} failed",
            self.media.generation(),
            replaced,
            unchanged,
            missing,
            failed
        );
    }

    async fn send_signal(&self, signal: ClientSignal) {
        if let Err(e) = self.signaling.send(signal).await {
            warn!("Failed to send signal: {}", e);
        }
    }

    fn snapshot(&self) -> MeshSnapshot {
        let mut participants: Vec<ParticipantView> =
            self.links.values().map(ParticipantView::from_link).collect();
        participants.sort_by(|a, b| a.id.cmp(&b.id));

        MeshSnapshot {
            room_id: self.room_id.clone(),
            local_id: self.local_id.clone(),
            local: self.media.state(),
            participants,
        }
    }

    fn notify(&self, notification: MeshNotification) {
        // No subscribers is fine.
        let _ = self.notifications.send(notification);
    }

    fn is_local(&self, id: &ParticipantId) -> bool {
        self.local_id.as_ref() == Some(id)
    }

    /// Whether our pending offer gives way to one from `remote`. The smaller
    /// id keeps offering. Without a `welcome` we cannot compare, so we keep
    /// our attempt and leave recovery to the negotiation timeout.
    fn yields_to(&self, remote: &ParticipantId) -> bool {
        self.local_id.as_ref().is_some_and(|local| local > remote)
    }

    fn is_current(&self, tag: &LinkTag) -> bool {
        self.links
            .get(&tag.participant)
            .is_some_and(|link| link.tag() == tag)
    }
}

fn live_link<'a>(
    links: &'a mut HashMap<ParticipantId, PeerLink>,
    tag: &LinkTag,
) -> Option<&'a mut PeerLink> {
    links
        .get_mut(&tag.participant)
        .filter(|link| link.tag() == tag)
}

fn negotiation_timer(
    tag: LinkTag,
    timeout: Duration,
    events: mpsc::Sender<MeshEvent>,
) -> AbortHandle {
    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        let _ = events.send(MeshEvent::NegotiationTimedOut { tag }).await;
    })
    .abort_handle()
}
