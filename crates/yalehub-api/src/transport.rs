// Shared transport configuration for building reqwest::Client instances.
//
// The login flow and the authenticated client share timeout and
// user-agent settings through this module.

use std::time::Duration;

use crate::error::Error;

const USER_AGENT: &str = concat!("yalehub/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(Error::Transport)
    }
}
