//! Hub configuration, built once at startup from `FH_*` environment
//! variables and validated before anything else runs.
//!
//! ## Recognized variables
//!
//! | Variable | Default | Effect |
//! |---|---|---|
//! | `FH_MODE` | `writer` | `writer` owns the journal; `replica` replays it |
//! | `FH_LISTEN_HOST` | `0.0.0.0` | Gateway bind address |
//! | `FH_LISTEN_PORT` | `7070` | Gateway bind port |
//! | `FH_WRITER_ADDRESS` | — | Writer base URL; required in replica mode |
//! | `FH_WRITER_TOKEN` | — | Credential the replica presents to the writer |
//! | `FH_SYNC_INTERVAL_SECS` | `5` | Replica sync tick interval |
//! | `FH_FETCH_TIMEOUT_SECS` | `10` | Bound on each writer fetch |
//! | `FH_REPLICA_WRITE_GUARD` | `true` | Refuse mutating endpoints on replicas |
//! | `FH_AUTH_SECRET` | — | Legacy single-secret mode |
//! | `FH_AUTH_ACTIVE_SECRET` | — | Dual-secret mode: current secret |
//! | `FH_AUTH_NEXT_SECRET` | — | Dual-secret mode: incoming secret |
//! | `FH_AUTH_ROTATION_DEADLINE` | — | RFC3339 instant retiring the active secret |
//! | `FH_AUTH_ENFORCE` | secret configured | Reject callers without a valid token |
//! | `FH_DRIFT_THRESHOLD` | `3` | Fingerprint changes before `SPOOF_SUSPECT` |
//! | `FH_DRIFT_WINDOW_SECS` | `600` | Rolling window for counting changes |
//! | `FH_RATE_LIMIT_ENABLED` | `true` | Per-source submission ceiling on/off |
//! | `FH_RATE_LIMIT_PER_MINUTE` | `120` | Submissions per source per minute |
//! | `FH_JOURNAL_PATH` | `./data/journal.log` | Writer journal file |
//! | `FH_CHECKPOINT_PATH` | `./data/replica-checkpoint.json` | Replica checkpoint file |
//! | `FH_IDEMPOTENCY_TTL_SECS` | `86400` | Retention of completed dedup records |
//! | `FH_GOVERNANCE_ENABLED` | `true` | Allow automatic health downgrades |
//! | `FH_GOVERNANCE_DRY_RUN` | `false` | Log intended downgrades without applying |

use chrono::DateTime;
use fh_01_credentials::CredentialConfig;
use fh_03_node_registry::RegistryConfig;
use fh_04_request_intake::IntakeConfig;
use fh_07_api_gateway::{GatewayConfig, HubMode, RateLimitConfig};
use shared_types::HubError;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Complete hub configuration.
#[derive(Debug, Clone)]
pub struct HubConfig {
    pub mode: HubMode,
    pub listen_host: IpAddr,
    pub listen_port: u16,
    pub writer_address: Option<String>,
    pub writer_token: Option<String>,
    pub sync_interval: Duration,
    pub fetch_timeout: Duration,
    pub replica_write_guard: bool,
    pub credentials: CredentialConfig,
    pub registry: RegistryConfig,
    pub intake: IntakeConfig,
    pub rate_limit: RateLimitConfig,
    pub journal_path: PathBuf,
    pub checkpoint_path: PathBuf,
}

impl HubConfig {
    /// Build from the process environment.
    pub fn from_env() -> Result<Self, HubError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an explicit lookup, used by tests.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, HubError> {
        let mode = match lookup("FH_MODE").as_deref() {
            None | Some("writer") => HubMode::Writer,
            Some("replica") => HubMode::Replica,
            Some(other) => {
                return Err(HubError::Config(format!(
                    "FH_MODE must be writer or replica, got {other}"
                )))
            }
        };

        let legacy_secret = lookup("FH_AUTH_SECRET");
        let active_secret = lookup("FH_AUTH_ACTIVE_SECRET");
        let next_secret = lookup("FH_AUTH_NEXT_SECRET");
        let rotation_deadline = match lookup("FH_AUTH_ROTATION_DEADLINE") {
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(&raw)
                    .map_err(|e| {
                        HubError::Config(format!("FH_AUTH_ROTATION_DEADLINE: {e}"))
                    })?
                    .with_timezone(&chrono::Utc),
            ),
            None => None,
        };
        let any_secret = legacy_secret.is_some() || active_secret.is_some();
        let enforce = parse_or(&lookup, "FH_AUTH_ENFORCE", any_secret)?;

        let config = Self {
            mode,
            listen_host: parse_or(&lookup, "FH_LISTEN_HOST", IpAddr::from([0, 0, 0, 0]))?,
            listen_port: parse_or(&lookup, "FH_LISTEN_PORT", 7070)?,
            writer_address: lookup("FH_WRITER_ADDRESS"),
            writer_token: lookup("FH_WRITER_TOKEN"),
            sync_interval: Duration::from_secs(parse_or(&lookup, "FH_SYNC_INTERVAL_SECS", 5u64)?),
            fetch_timeout: Duration::from_secs(parse_or(&lookup, "FH_FETCH_TIMEOUT_SECS", 10u64)?),
            replica_write_guard: parse_or(&lookup, "FH_REPLICA_WRITE_GUARD", true)?,
            credentials: CredentialConfig {
                legacy_secret,
                active_secret,
                next_secret,
                rotation_deadline,
                enforce,
            },
            registry: RegistryConfig {
                drift_threshold: parse_or(&lookup, "FH_DRIFT_THRESHOLD", 3u32)?,
                drift_window_ms: parse_or(&lookup, "FH_DRIFT_WINDOW_SECS", 600i64)? * 1000,
                governance_enabled: parse_or(&lookup, "FH_GOVERNANCE_ENABLED", true)?,
                governance_dry_run: parse_or(&lookup, "FH_GOVERNANCE_DRY_RUN", false)?,
            },
            intake: IntakeConfig {
                completed_ttl_ms: parse_or(&lookup, "FH_IDEMPOTENCY_TTL_SECS", 86_400i64)? * 1000,
            },
            rate_limit: RateLimitConfig {
                enabled: parse_or(&lookup, "FH_RATE_LIMIT_ENABLED", true)?,
                submissions_per_minute: parse_or(&lookup, "FH_RATE_LIMIT_PER_MINUTE", 120u32)?,
            },
            journal_path: PathBuf::from(
                lookup("FH_JOURNAL_PATH").unwrap_or_else(|| "./data/journal.log".into()),
            ),
            checkpoint_path: PathBuf::from(
                lookup("FH_CHECKPOINT_PATH")
                    .unwrap_or_else(|| "./data/replica-checkpoint.json".into()),
            ),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field requirements.
    pub fn validate(&self) -> Result<(), HubError> {
        self.credentials.validate()?;

        if self.mode == HubMode::Replica && self.writer_address.is_none() {
            return Err(HubError::Config(
                "FH_WRITER_ADDRESS is required in replica mode".into(),
            ));
        }
        if self.sync_interval.is_zero() {
            return Err(HubError::Config("FH_SYNC_INTERVAL_SECS cannot be 0".into()));
        }
        if self.fetch_timeout.is_zero() {
            return Err(HubError::Config("FH_FETCH_TIMEOUT_SECS cannot be 0".into()));
        }
        if self.registry.drift_threshold == 0 {
            return Err(HubError::Config("FH_DRIFT_THRESHOLD cannot be 0".into()));
        }
        self.gateway_config().validate()?;
        Ok(())
    }

    /// The slice of configuration the gateway needs.
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            mode: self.mode,
            host: self.listen_host,
            port: self.listen_port,
            replica_write_guard: self.replica_write_guard,
            rate_limit: self.rate_limit.clone(),
        }
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, HubError>
where
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|e| HubError::Config(format!("{name}: {e}"))),
    }
}
