//! # Core Domain Entities
//!
//! Cross-subsystem entities for the hub.
//!
//! ## Clusters
//!
//! - **Registry**: `NodeRecord`, `AttestationState`, `AttestationFingerprint`
//! - **Intake**: `IdempotencyRecord`, `SubmitRequest`, `SubmitOutcome`
//! - **Results**: `ResultSubmission`, `IntegritySpec`, `StoredResult`
//! - **Journal views**: `WriterStatus`, `SyncStatus`

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Node identifier as reported by the worker itself.
pub type NodeId = String;

/// Millisecond unix timestamp. All persisted timestamps use this form.
pub type TimestampMs = i64;

/// Node health, ordered from healthy to unusable.
///
/// The derived `Ord` is load-bearing: health downgrades are expressed as
/// `max(current, floor)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeHealth {
    Green,
    Yellow,
    Red,
}

/// Outcome of attestation tracking for a single heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttestationStatus {
    /// Fingerprint matches the stored baseline (or establishes it).
    Ok,
    /// Fingerprint changed since the last heartbeat.
    Drift,
    /// Repeated fingerprint changes within the rolling window.
    SpoofSuspect,
    /// Heartbeat carried no attestation block.
    Missing,
}

/// The node-supplied fingerprint used to detect unauthorized change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationFingerprint {
    /// Identifier of the binary/build the node claims to run.
    pub build_id: String,
    /// Hash over the node's advertised capability set.
    pub capability_hash: String,
    /// Free-form runtime descriptor (OS, runtime version, ...).
    pub runtime_descriptor: String,
}

impl AttestationFingerprint {
    /// Drift comparison covers `build_id` and `capability_hash` only; the
    /// runtime descriptor is informational.
    pub fn matches(&self, other: &AttestationFingerprint) -> bool {
        self.build_id == other.build_id && self.capability_hash == other.capability_hash
    }
}

/// Per-node attestation tracking state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttestationState {
    /// Most recently stored fingerprint. Drift is always measured against
    /// this value, not the original baseline.
    pub fingerprint: Option<AttestationFingerprint>,
    /// Status as of the last heartbeat.
    pub status: AttestationStatus,
    /// First heartbeat timestamp.
    pub first_seen_at: TimestampMs,
    /// Last heartbeat timestamp.
    pub last_seen_at: TimestampMs,
    /// Fingerprint transitions observed within the current window.
    pub change_count: u32,
    /// Start of the rolling drift window.
    pub window_start: TimestampMs,
}

/// A registered worker node. Created on first heartbeat, mutated only by
/// the registry, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub node_id: NodeId,
    pub health: NodeHealth,
    pub attestation: AttestationState,
    /// Jobs the node last reported as in flight.
    pub current_jobs: Vec<String>,
}

/// Heartbeat body as received from a node. Doubles as the journal payload
/// for `node_heartbeat` events so replicas replay exactly what was seen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatObservation {
    pub node_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<NodeHealth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attestation: Option<AttestationFingerprint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_jobs: Option<Vec<String>>,
}

/// Lifecycle of an idempotent request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Accepted,
    InProgress,
    Completed,
}

/// Dedup record for one idempotency key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdempotencyRecord {
    pub idempotency_key: String,
    pub payload_fingerprint: String,
    pub job_id: String,
    pub request_id: String,
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_ref: Option<String>,
    pub created_at: TimestampMs,
}

/// A mutating submission as received from a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub idempotency_key: String,
    pub kind: String,
    pub params: Value,
}

/// Response to a request submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    pub request_id: String,
    pub job_id: String,
    pub status: RequestStatus,
    pub dedup: bool,
    /// Cached result payload, present when the deduplicated job already
    /// completed. Never recomputed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

/// Integrity envelope attached to a result submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegritySpec {
    /// Named hash mode. `sha256` is the only supported value.
    pub mode: String,
    /// Hex digest over the canonical form of the result core fields.
    pub digest: String,
}

/// A result submission. Immutable once accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSubmission {
    pub result_id: String,
    pub job_id: String,
    pub ok: bool,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    pub integrity: IntegritySpec,
}

/// An accepted result as retained by the hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResult {
    pub result_id: String,
    pub job_id: String,
    pub ok: bool,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    pub accepted_at: TimestampMs,
}

/// Writer-side journal status view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriterStatus {
    pub status: String,
    pub journal_size_bytes: u64,
    pub last_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_event_ts: Option<TimestampMs>,
    pub total_events: u64,
    pub integrity_rejections: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncStatus>,
}

/// Replica-side sync progress, reported instead of failing reads when the
/// writer is unreachable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub writer_address: String,
    pub sync_offset: u64,
    pub last_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_event_ts: Option<TimestampMs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_at: Option<TimestampMs>,
    pub total_events_synced: u64,
    pub lag_bytes: u64,
    pub halted: bool,
}
