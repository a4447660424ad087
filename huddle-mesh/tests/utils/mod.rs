pub mod relay;
pub mod wait_helpers;

pub use mock_devices::*;
pub use mock_signaling::*;
pub use mock_transport::*;
pub use relay::*;
pub use wait_helpers::*;
