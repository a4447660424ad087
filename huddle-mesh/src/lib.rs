//! Full-mesh audio/video session runtime.
//!
//! A [`MeshCoordinator`] keeps one [`PeerLink`] per remote participant of a
//! room, negotiates it over a signaling relay and fans local media changes
//! out to every link.

pub mod config;
pub mod error;
pub mod media;
pub mod mesh;
pub mod peer;
pub mod signaling;
pub mod transport;

pub use config::MeshConfig;
pub use error::{DeviceError, MeshError, Result, TransportError};
pub use media::{CaptureDevices, LocalMediaState, LocalTrack, MediaSource, NoDevices, TrackOrigin};
pub use mesh::{MeshCoordinator, MeshHandle, MeshNotification, MeshSnapshot, ParticipantView};
pub use peer::{NegotiationState, PeerLink, Role};
pub use signaling::{SignalingLink, SignalingOutput, WsSignaling};
pub use transport::{TransportConfig, WebRtcTransportFactory};
