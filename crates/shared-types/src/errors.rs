//! # Error Taxonomy
//!
//! The shared rejection taxonomy. Every error carries a stable wire
//! category so callers and verification tooling can assert on the exact
//! failure kind rather than a generic error.

use thiserror::Error;

/// Hub-wide error type.
#[derive(Debug, Clone, Error)]
pub enum HubError {
    /// Missing, invalid, or expired credential. The message never reveals
    /// which configured secret nearly matched.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Idempotency key reused with a different payload fingerprint, or a
    /// result submitted for a job that already holds one.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Result digest mismatch or unsupported digest mode.
    #[error("integrity check failed: {0}")]
    Integrity(String),

    /// Per-source submission ceiling hit. The caller is responsible for
    /// backoff; the hub rejects instead of queuing.
    #[error("rate limit exceeded for source {0}")]
    RateLimited(String),

    /// The replica could not reach the writer. Reads keep serving the
    /// last-applied state.
    #[error("writer unreachable: {0}")]
    WriterUnreachable(String),

    /// Hash chain mismatch while replaying journal records. The affected
    /// replica halts its own sync loop and requires manual reconciliation.
    #[error("journal chain corruption: {0}")]
    ChainCorruption(String),

    /// Mutating call reached a hub running in replica mode.
    #[error("replica is read-only: {0}")]
    ReplicaReadOnly(String),

    /// Referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Journal or checkpoint storage failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Invalid configuration detected at startup.
    #[error("configuration error: {0}")]
    Config(String),
}

impl HubError {
    /// Stable wire category for structured rejections.
    pub fn category(&self) -> &'static str {
        match self {
            HubError::Auth(_) => "auth",
            HubError::Conflict(_) => "conflict",
            HubError::Integrity(_) => "integrity",
            HubError::RateLimited(_) => "rate_limited",
            HubError::WriterUnreachable(_) => "writer_unreachable",
            HubError::ChainCorruption(_) => "chain_corruption",
            HubError::ReplicaReadOnly(_) => "replica_read_only",
            HubError::NotFound(_) => "not_found",
            HubError::Storage(_) => "storage",
            HubError::Config(_) => "config",
        }
    }
}

impl From<std::io::Error> for HubError {
    fn from(e: std::io::Error) -> Self {
        HubError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for HubError {
    fn from(e: serde_json::Error) -> Self {
        HubError::Storage(format!("serialization: {e}"))
    }
}
