//! Gateway configuration with validation.

use serde::{Deserialize, Serialize};
use shared_types::HubError;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Operating role of this hub process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HubMode {
    /// Owns the journal; accepts mutating calls.
    Writer,
    /// Read-only follower replaying the writer's journal.
    Replica,
}

/// Per-source rate limiting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Ceiling on mutating submissions per source per minute. Excess is
    /// rejected immediately, never queued.
    pub submissions_per_minute: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            submissions_per_minute: 120,
        }
    }
}

/// Main gateway configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub mode: HubMode,
    /// Bind address.
    pub host: IpAddr,
    pub port: u16,
    /// Refuse mutating endpoints in replica mode. On by default; the
    /// runtime's missing journal writer backstops it even when disabled.
    pub replica_write_guard: bool,
    pub rate_limit: RateLimitConfig,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<(), HubError> {
        if self.rate_limit.enabled && self.rate_limit.submissions_per_minute == 0 {
            return Err(HubError::Config(
                "submissions_per_minute cannot be 0".into(),
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            mode: HubMode::Writer,
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 7070,
            replica_write_guard: true,
            rate_limit: RateLimitConfig::default(),
        }
    }
}
