use async_trait::async_trait;
use huddle_core::MediaKind;
use tokio::sync::oneshot;

use crate::error::DeviceError;
use crate::media::LocalTrack;

/// A screen capture plus the platform's "sharing ended" signal.
#[derive(Debug)]
pub struct ScreenCapture {
    pub track: LocalTrack,
    /// Resolves when the user stops sharing from outside the app.
    pub ended: oneshot::Receiver<()>,
}

/// Access to local capture hardware.
#[async_trait]
pub trait CaptureDevices: Send + Sync {
    async fn open_microphone(&self) -> Result<LocalTrack, DeviceError>;

    async fn open_camera(&self) -> Result<LocalTrack, DeviceError>;

    /// Ask the user for a screen or window. A dismissed picker is
    /// [`DeviceError::Cancelled`].
    async fn open_screen(&self) -> Result<ScreenCapture, DeviceError>;

    /// Give the device behind `track` back to the system.
    fn release(&self, track: &LocalTrack) {
        track.stop();
    }
}

/// Devices for a participant that only receives media.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDevices;

#[async_trait]
impl CaptureDevices for NoDevices {
    async fn open_microphone(&self) -> Result<LocalTrack, DeviceError> {
        Err(DeviceError::Unavailable(MediaKind::Audio))
    }

    async fn open_camera(&self) -> Result<LocalTrack, DeviceError> {
        Err(DeviceError::Unavailable(MediaKind::Video))
    }

    async fn open_screen(&self) -> Result<ScreenCapture, DeviceError> {
        Err(DeviceError::Unavailable(MediaKind::Video))
    }
}
