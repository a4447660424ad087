mod media;
mod participant;
mod room;
mod signaling;

pub use media::{MediaKind, TrackId};
pub use participant::{ParticipantId, ParticipantInfo};
pub use room::RoomId;
pub use signaling::{
    ClientSignal, IceCandidate, IceServerConfig, SdpType, ServerSignal, SessionDescription,
};
