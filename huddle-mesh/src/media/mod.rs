mod capture_devices;
mod local_track;
mod media_source;

pub use capture_devices::*;
pub use local_track::*;
pub use media_source::*;
