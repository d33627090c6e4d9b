//! Inbound port the handlers are written against. The runtime's
//! `HubCore` is the production implementation.

use serde::{Deserialize, Serialize};
use shared_types::{
    AttestationStatus, HeartbeatObservation, HubError, NodeHealth, NodeId, NodeRecord,
    ResultSubmission, SubmitOutcome, SubmitRequest, TimestampMs, WriterStatus,
};
use std::collections::BTreeMap;

/// Heartbeat response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatReply {
    pub attestation_status: AttestationStatus,
    pub health: NodeHealth,
}

/// One journal range read plus the metadata the journal endpoint emits as
/// response headers.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalView {
    pub bytes: Vec<u8>,
    pub next_offset: u64,
    pub last_hash: Option<String>,
    pub last_timestamp: Option<TimestampMs>,
    pub journal_size_bytes: u64,
}

/// Everything the HTTP surface can ask of the hub.
pub trait HubApi: Send + Sync {
    fn heartbeat(&self, observation: HeartbeatObservation) -> Result<HeartbeatReply, HubError>;

    fn registry(&self) -> Result<BTreeMap<NodeId, NodeRecord>, HubError>;

    fn submit_request(&self, request: SubmitRequest) -> Result<SubmitOutcome, HubError>;

    fn submit_result(&self, submission: ResultSubmission) -> Result<(), HubError>;

    fn journal_chunk(&self, offset: u64) -> Result<JournalView, HubError>;

    fn writer_status(&self) -> Result<WriterStatus, HubError>;
}
