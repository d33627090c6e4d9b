//! Credential configuration: the token epoch.

use chrono::{DateTime, Utc};
use shared_types::HubError;

/// Secrets the authority verifies against.
///
/// Invariant: at most two secrets are valid simultaneously. After
/// `rotation_deadline`, `active_secret` is retired and `next_secret`
/// becomes the sole valid secret.
#[derive(Debug, Clone, Default)]
pub struct CredentialConfig {
    /// Single fixed secret, no rotation. Mutually exclusive with the
    /// dual-secret fields.
    pub legacy_secret: Option<String>,
    /// Currently distributed secret.
    pub active_secret: Option<String>,
    /// Incoming secret during a rotation window.
    pub next_secret: Option<String>,
    /// Absolute instant at which `active_secret` stops being accepted.
    pub rotation_deadline: Option<DateTime<Utc>>,
    /// When false and no secret is configured, all callers are accepted.
    pub enforce: bool,
}

impl CredentialConfig {
    /// Validate mode exclusivity and required fields.
    pub fn validate(&self) -> Result<(), HubError> {
        if self.legacy_secret.is_some()
            && (self.active_secret.is_some() || self.next_secret.is_some())
        {
            return Err(HubError::Config(
                "legacy secret and dual-secret mode are mutually exclusive".into(),
            ));
        }
        if self.next_secret.is_some() && self.active_secret.is_none() {
            return Err(HubError::Config(
                "next secret requires an active secret".into(),
            ));
        }
        if self.rotation_deadline.is_some() && self.next_secret.is_none() {
            return Err(HubError::Config(
                "rotation deadline requires a next secret".into(),
            ));
        }
        if self.enforce && !self.any_secret_configured() {
            return Err(HubError::Config(
                "enforcement enabled but no secret configured".into(),
            ));
        }
        Ok(())
    }

    pub fn any_secret_configured(&self) -> bool {
        self.legacy_secret.is_some() || self.active_secret.is_some()
    }

    /// Secrets valid at `now`.
    pub fn valid_secrets_at(&self, now: DateTime<Utc>) -> Vec<&str> {
        if let Some(legacy) = &self.legacy_secret {
            return vec![legacy.as_str()];
        }
        let rotated = matches!(self.rotation_deadline, Some(deadline) if now >= deadline);
        match (&self.active_secret, &self.next_secret) {
            (Some(_), Some(next)) if rotated => vec![next.as_str()],
            (Some(active), Some(next)) => vec![active.as_str(), next.as_str()],
            (Some(active), None) => vec![active.as_str()],
            _ => Vec::new(),
        }
    }
}
