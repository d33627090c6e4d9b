//! Token verification.

use crate::config::CredentialConfig;
use chrono::{DateTime, Utc};
use shared_types::HubError;
use subtle::ConstantTimeEq;
use tracing::debug;

/// Verifies caller tokens against the configured epoch.
pub struct CredentialAuthority {
    config: CredentialConfig,
}

impl CredentialAuthority {
    pub fn new(config: CredentialConfig) -> Result<Self, HubError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Verify a caller token at the current instant.
    pub fn verify(&self, token: Option<&str>) -> Result<(), HubError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a caller token at an explicit instant.
    pub fn verify_at(&self, token: Option<&str>, now: DateTime<Utc>) -> Result<(), HubError> {
        let valid = self.config.valid_secrets_at(now);

        if valid.is_empty() {
            if self.config.enforce {
                // Unreachable with a validated config; fail closed anyway.
                return Err(HubError::Auth("invalid credential".into()));
            }
            debug!("no secret configured and enforcement disabled, accepting caller");
            return Ok(());
        }

        let token = token.ok_or_else(|| HubError::Auth("missing credential".into()))?;

        // Compare against every currently-valid secret, accumulating the
        // verdict without branching, so response time does not reveal
        // which secret (if any) was close.
        let mut matched = subtle::Choice::from(0u8);
        for secret in &valid {
            matched |= constant_time_eq(token, secret);
        }

        if bool::from(matched) {
            Ok(())
        } else {
            Err(HubError::Auth("invalid credential".into()))
        }
    }
}

/// Constant-time string comparison, length differences included.
///
/// Both inputs are padded to the max length with distinct fill bytes so a
/// length mismatch can never compare equal, and the length check itself
/// goes through `ct_eq`.
fn constant_time_eq(a: &str, b: &str) -> subtle::Choice {
    let max_len = std::cmp::max(a.len(), b.len());

    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];
    a_padded[..a.len()].copy_from_slice(a.as_bytes());
    b_padded[..b.len()].copy_from_slice(b.as_bytes());

    a.len().ct_eq(&b.len()) & a_padded.ct_eq(&b_padded)
}
