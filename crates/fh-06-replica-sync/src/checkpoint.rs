//! Replica checkpoint: sync cursor plus derived-state snapshot, persisted
//! together so a restart resumes without replaying from zero.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{HubError, TimestampMs, GENESIS_HASH};
use std::io::Write;
use std::path::Path;

/// Persisted replica state. Advanced only after a fetched batch has been
/// fully applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicaCheckpoint {
    pub writer_address: String,
    pub sync_offset: u64,
    pub last_hash: String,
    #[serde(default)]
    pub last_event_ts: Option<TimestampMs>,
    #[serde(default)]
    pub last_sync_at: Option<TimestampMs>,
    pub total_events_synced: u64,
    /// Derived-state snapshot matching `sync_offset`. Stored with the
    /// cursor in one file so the pair can never tear.
    #[serde(default)]
    pub snapshot: Option<Value>,
}

impl ReplicaCheckpoint {
    /// A fresh cursor at offset zero.
    pub fn fresh(writer_address: &str) -> Self {
        Self {
            writer_address: writer_address.to_string(),
            sync_offset: 0,
            last_hash: GENESIS_HASH.to_string(),
            last_event_ts: None,
            last_sync_at: None,
            total_events_synced: 0,
            snapshot: None,
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Option<Self>, HubError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(path)?;
        let checkpoint = serde_json::from_slice(&bytes)
            .map_err(|e| HubError::Storage(format!("corrupt checkpoint {}: {e}", path.display())))?;
        Ok(Some(checkpoint))
    }

    /// Write atomically via temp file + rename.
    pub fn persist<P: AsRef<Path>>(&self, path: P) -> Result<(), HubError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let bytes = serde_json::to_vec(self)?;
        let temp_path = path.with_extension("tmp");
        let mut file = std::fs::File::create(&temp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        std::fs::rename(&temp_path, path)?;
        Ok(())
    }
}
