mod mesh_command;
mod mesh_coordinator;
mod mesh_event;
mod mesh_handle;
mod mesh_notification;
mod mesh_snapshot;

pub use mesh_command::*;
pub use mesh_coordinator::*;
pub(crate) use mesh_event::*;
pub use mesh_handle::*;
pub use mesh_notification::*;
pub use mesh_snapshot::*;
