//! # Journal Event Records
//!
//! The immutable, hash-chained record type the durable journal appends
//! and replicas replay. The chain fold lives here, independent of storage
//! and transport, so it can be exercised without any I/O.

use crate::canon;
use crate::entities::TimestampMs;
use crate::errors::HubError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `prev_hash` of the first record in a journal.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Response header names of the journal range endpoint, shared between
/// the gateway (producer) and the replica feed (consumer).
pub mod headers {
    pub const NEXT_OFFSET: &str = "x-next-offset";
    pub const LAST_HASH: &str = "x-last-hash";
    pub const LAST_TIMESTAMP: &str = "x-last-timestamp";
    pub const JOURNAL_SIZE: &str = "x-journal-size";
}

/// Every mutating event the hub records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Registry mutation from a node heartbeat.
    NodeHeartbeat,
    /// Intake accepted a new idempotent request.
    RequestAccepted,
    /// A job finished without a result payload (completion collaborator).
    JobCompleted,
    /// Integrity-verified result accepted; completes the owning job.
    ResultAccepted,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::NodeHeartbeat => "node_heartbeat",
            EventKind::RequestAccepted => "request_accepted",
            EventKind::JobCompleted => "job_completed",
            EventKind::ResultAccepted => "result_accepted",
        }
    }
}

/// One journal record. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Byte offset of this record's first byte in the journal.
    pub offset: u64,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub payload: Value,
    pub timestamp: TimestampMs,
    pub prev_hash: String,
    pub hash: String,
}

impl EventRecord {
    /// Build a record, computing its chain hash.
    pub fn new(
        offset: u64,
        kind: EventKind,
        payload: Value,
        timestamp: TimestampMs,
        prev_hash: &str,
    ) -> Self {
        let hash = chain_hash(prev_hash, kind, &payload, timestamp);
        Self {
            offset,
            kind,
            payload,
            timestamp,
            prev_hash: prev_hash.to_string(),
            hash,
        }
    }

    /// Recompute the chain hash and compare with the stored one.
    pub fn verify_hash(&self) -> bool {
        chain_hash(&self.prev_hash, self.kind, &self.payload, self.timestamp) == self.hash
    }

    /// Wire encoding: one canonical JSON object terminated by `\n`.
    pub fn encode_line(&self) -> Result<Vec<u8>, HubError> {
        let value = serde_json::to_value(self)?;
        let mut bytes = canon::to_canonical_string(&value).into_bytes();
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Parse a single record line (without the trailing `\n`).
    pub fn decode_line(line: &[u8]) -> Result<Self, HubError> {
        serde_json::from_slice(line)
            .map_err(|e| HubError::ChainCorruption(format!("unparseable record: {e}")))
    }

    /// Deserialize the payload into its typed form.
    pub fn payload_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, HubError> {
        serde_json::from_value(self.payload.clone()).map_err(|e| {
            HubError::ChainCorruption(format!("payload shape mismatch for {}: {e}", self.kind.as_str()))
        })
    }
}

/// The chain fold: `hash = SHA-256(canonical({payload, prev_hash, timestamp, type}))`.
///
/// `offset` and the hash itself are excluded, so a record's identity does
/// not depend on where it landed in the file.
pub fn chain_hash(prev_hash: &str, kind: EventKind, payload: &Value, timestamp: TimestampMs) -> String {
    canon::canonical_digest(&serde_json::json!({
        "payload": payload,
        "prev_hash": prev_hash,
        "timestamp": timestamp,
        "type": kind.as_str(),
    }))
}

/// Payload of a `request_accepted` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestAcceptedEvent {
    pub idempotency_key: String,
    pub payload_fingerprint: String,
    pub job_id: String,
    pub request_id: String,
    pub kind: String,
    pub params: Value,
}

/// Payload of a `job_completed` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobCompletedEvent {
    pub job_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_ref: Option<String>,
}

/// Payload of a `result_accepted` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultAcceptedEvent {
    pub result_id: String,
    pub job_id: String,
    pub ok: bool,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    pub digest: String,
}
