//! Intake configuration.

use serde::{Deserialize, Serialize};

/// Retention knobs for the idempotency store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeConfig {
    /// Completed records older than this are pruned. Measured against
    /// journal-event timestamps so every replica prunes on the same event
    /// boundary.
    pub completed_ttl_ms: i64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            completed_ttl_ms: 24 * 60 * 60 * 1000,
        }
    }
}
