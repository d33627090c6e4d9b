//! Registry configuration.

use serde::{Deserialize, Serialize};

/// Attestation tracking knobs.
///
/// Replicas must run the same values as the writer: health downgrades are
/// computed inside the projection fold, so differing thresholds would
/// diverge derived state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Fingerprint transitions within the window before a node escalates
    /// from `DRIFT` to `SPOOF_SUSPECT`.
    pub drift_threshold: u32,

    /// Rolling window for counting fingerprint transitions, milliseconds.
    pub drift_window_ms: i64,

    /// When false, statuses are still tracked but health is never
    /// auto-downgraded.
    pub governance_enabled: bool,

    /// Log the intended health change without applying it.
    pub governance_dry_run: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            drift_threshold: 3,
            drift_window_ms: 10 * 60 * 1000,
            governance_enabled: true,
            governance_dry_run: false,
        }
    }
}
