use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use bytes::Bytes;
use huddle_core::{MediaKind, TrackId};
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::media::Sample;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

use crate::error::TransportError;

const LOCAL_STREAM_ID: &str = "huddle-local";

/// Where a local track's media comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackOrigin {
    Microphone,
    Camera,
    Screen,
}

impl TrackOrigin {
    pub fn kind(self) -> MediaKind {
        match self {
            TrackOrigin::Microphone => MediaKind::Audio,
            TrackOrigin::Camera | TrackOrigin::Screen => MediaKind::Video,
        }
    }
}

struct LocalTrackInner {
    id: TrackId,
    origin: TrackOrigin,
    enabled: AtomicBool,
    stopped: AtomicBool,
    rtp: Arc<TrackLocalStaticSample>,
}

/// A captured local media track.
///
/// Clones share state: disabling one clone mutes every connection that
/// carries the track. Capture code feeds it through [`LocalTrack::write_sample`].
#[derive(Clone)]
pub struct LocalTrack {
    inner: Arc<LocalTrackInner>,
}

impl LocalTrack {
    pub fn new(origin: TrackOrigin) -> Self {
        Self::with_id(TrackId::new(), origin)
    }

    pub fn with_id(id: TrackId, origin: TrackOrigin) -> Self {
        let codec = match origin.kind() {
            MediaKind::Audio => RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                clock_rate: 48000,
                channels: 2,
                ..Default::default()
            },
            MediaKind::Video => RTCRtpCodecCapability {
                mime_type: MIME_TYPE_VP8.to_owned(),
                clock_rate: 90000,
                ..Default::default()
            },
        };
        let rtp = Arc::new(TrackLocalStaticSample::new(
            codec,
            id.to_string(),
            LOCAL_STREAM_ID.to_owned(),
        ));

        Self {
            inner: Arc::new(LocalTrackInner {
                id,
                origin,
                enabled: AtomicBool::new(true),
                stopped: AtomicBool::new(false),
                rtp,
            }),
        }
    }

    pub fn id(&self) -> &TrackId {
        &self.inner.id
    }

    pub fn kind(&self) -> MediaKind {
        self.inner.origin.kind()
    }

    pub fn origin(&self) -> TrackOrigin {
        self.inner.origin
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::Acquire)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.inner.enabled.store(enabled, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::Acquire)
    }

    /// Marks the capture as finished. Later samples are discarded.
    pub fn stop(&self) {
        self.inner.stopped.store(true, Ordering::Release);
    }

    pub fn rtp_track(&self) -> Arc<dyn TrackLocal + Send + Sync> {
        self.inner.rtp.clone()
    }

    /// Push one captured frame. Disabled or stopped tracks drop it.
    pub async fn write_sample(&self, data: Bytes, duration: Duration) -> Result<(), TransportError> {
        if !self.is_enabled() || self.is_stopped() {
            return Ok(());
        }
        let sample = Sample {
            data,
            duration,
            ..Default::default()
        };
        self.inner.rtp.write_sample(&sample).await?;
        Ok(())
    }
}

impl fmt::Debug for LocalTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalTrack")
            .field("id", &self.inner.id)
            .field("origin", &self.inner.origin)
            .field("enabled", &self.is_enabled())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}
