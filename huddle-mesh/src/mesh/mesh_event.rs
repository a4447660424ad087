use huddle_core::{SessionDescription, TrackId};

use crate::error::{DeviceError, TransportError};
use crate::media::ScreenCapture;
use crate::transport::LinkTag;

/// Results of work the coordinator moved off its loop.
#[derive(Debug)]
pub(crate) enum MeshEvent {
    /// `create_offer` finished. On success the offer is already the local
    /// description.
    LocalOfferReady {
        tag: LinkTag,
        result: Result<SessionDescription, TransportError>,
    },

    /// A remote offer was applied and an answer created.
    RemoteOfferApplied {
        tag: LinkTag,
        result: Result<SessionDescription, TransportError>,
    },

    RemoteAnswerApplied {
        tag: LinkTag,
        result: Result<(), TransportError>,
    },

    NegotiationTimedOut { tag: LinkTag },

    ScreenCaptureReady {
        result: Result<ScreenCapture, DeviceError>,
    },

    /// The platform ended the share of this screen track.
    ScreenShareEnded { track_id: TrackId },
}
