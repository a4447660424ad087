use huddle_core::MediaKind;
use tracing::{info, warn};

use crate::media::{CaptureDevices, LocalTrack, TrackOrigin};

/// Local enabled flags as the UI shows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocalMediaState {
    pub audio_enabled: bool,
    pub video_enabled: bool,
    pub screen_sharing: bool,
}

/// The local tracks for one session.
///
/// Holds at most one microphone, one camera and one screen track. The
/// outgoing video is the screen track while a share is active, the camera
/// track otherwise. `generation` increases every time the outgoing video
/// source changes.
#[derive(Debug, Default)]
pub struct MediaSource {
    audio: Option<LocalTrack>,
    camera: Option<LocalTrack>,
    screen: Option<LocalTrack>,
    generation: u64,
}

impl MediaSource {
    pub fn new(audio: Option<LocalTrack>, camera: Option<LocalTrack>) -> Self {
        Self {
            audio,
            camera,
            screen: None,
            generation: 0,
        }
    }

    /// Open microphone and camera. A device that cannot be opened is left
    /// out and the session continues without it.
    pub async fn acquire(devices: &dyn CaptureDevices) -> Self {
        let audio = match devices.open_microphone().await {
            Ok(track) => Some(track),
            Err(e) => {
                warn!("Continuing without microphone: {}", e);
                None
            }
        };
        let camera = match devices.open_camera().await {
            Ok(track) => Some(track),
            Err(e) => {
                warn!("Continuing without camera: {}", e);
                None
            }
        };
        info!(
            "Local media acquired (audio: {}, video: {})",
            audio.is_some(),
            camera.is_some()
        );
        Self::new(audio, camera)
    }

    /// The track currently sent for `kind`.
    pub fn track(&self, kind: MediaKind) -> Option<&LocalTrack> {
        match kind {
            MediaKind::Audio => self.audio.as_ref(),
            MediaKind::Video => self.current_video(),
        }
    }

    pub fn current_video(&self) -> Option<&LocalTrack> {
        self.screen.as_ref().or(self.camera.as_ref())
    }

    pub fn camera(&self) -> Option<&LocalTrack> {
        self.camera.as_ref()
    }

    pub fn screen(&self) -> Option<&LocalTrack> {
        self.screen.as_ref()
    }

    /// Every track a new connection should carry.
    pub fn outgoing_tracks(&self) -> impl Iterator<Item = &LocalTrack> {
        self.audio.iter().chain(self.current_video())
    }

    pub fn is_screen_sharing(&self) -> bool {
        self.screen.is_some()
    }

    pub fn video_origin(&self) -> Option<TrackOrigin> {
        self.current_video().map(LocalTrack::origin)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Flip the enabled flag of the microphone or camera track.
    ///
    /// Returns the new flag, or `None` when there is no track of that kind.
    pub fn toggle(&mut self, kind: MediaKind) -> Option<bool> {
        let track = match kind {
            MediaKind::Audio => self.audio.as_ref()?,
            MediaKind::Video => self.camera.as_ref()?,
        };
        let enabled = !track.is_enabled();
        track.set_enabled(enabled);
        Some(enabled)
    }

    pub fn state(&self) -> LocalMediaState {
        LocalMediaState {
            audio_enabled: self.audio.as_ref().is_some_and(LocalTrack::is_enabled),
            video_enabled: self.camera.as_ref().is_some_and(LocalTrack::is_enabled),
            screen_sharing: self.is_screen_sharing(),
        }
    }

    /// Make `track` the outgoing video. Returns the new generation.
    pub fn begin_screen_share(&mut self, track: LocalTrack) -> u64 {
        self.screen = Some(track);
        self.generation += 1;
        self.generation
    }

    /// Drop the screen track and fall back to the camera.
    ///
    /// Returns the screen track so the caller can release it, or `None` if no
    /// share was active (nothing changes in that case).
    pub fn end_screen_share(&mut self) -> Option<LocalTrack> {
        let screen = self.screen.take()?;
        self.generation += 1;
        Some(screen)
    }

    /// Release every device. The source is empty afterwards.
    pub fn release(&mut self, devices: &dyn CaptureDevices) {
        for track in [self.audio.take(), self.camera.take(), self.screen.take()]
            .into_iter()
            .flatten()
        {
            devices.release(&track);
        }
    }
}
