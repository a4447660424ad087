mod negotiation_state;
mod peer_link;

pub use negotiation_state::*;
pub use peer_link::*;
