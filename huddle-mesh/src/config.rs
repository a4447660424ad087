use std::time::Duration;

use crate::transport::TransportConfig;

/// Tunables for a [`MeshCoordinator`](crate::MeshCoordinator).
#[derive(Debug, Clone)]
pub struct MeshConfig {
    pub transport: TransportConfig,
    /// Upper bound on an offer/answer round started by this side.
    pub negotiation_timeout: Duration,
    pub command_buffer: usize,
    pub event_buffer: usize,
    pub notification_buffer: usize,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            negotiation_timeout: Duration::from_secs(30),
            command_buffer: 100,
            event_buffer: 256,
            notification_buffer: 64,
        }
    }
}

impl MeshConfig {
    pub fn with_negotiation_timeout(mut self, timeout: Duration) -> Self {
        self.negotiation_timeout = timeout;
        self
    }

    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }
}
