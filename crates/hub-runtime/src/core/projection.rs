//! The derived-state projection: one deterministic fold over journal
//! events, shared by the writer (startup replay + live appends) and by
//! replicas (sync batches). Identical event streams and identical
//! configuration fold to byte-identical state everywhere.

use fh_03_node_registry::{HeartbeatOutcome, NodeTable, RegistryConfig};
use fh_04_request_intake::{IdempotencyStore, IntakeConfig};
use fh_05_result_integrity::ResultLedger;
use serde::{Deserialize, Serialize};
use shared_types::events::{JobCompletedEvent, RequestAcceptedEvent, ResultAcceptedEvent};
use shared_types::{
    EventKind, EventRecord, HeartbeatObservation, HubError, IdempotencyRecord, RequestStatus,
    StoredResult,
};

/// Knobs that shape the fold. Must match between writer and replicas.
#[derive(Debug, Clone, Default)]
pub struct ProjectionConfig {
    pub registry: RegistryConfig,
    pub intake: IntakeConfig,
}

/// What applying one event resolved to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Applied {
    Heartbeat(HeartbeatOutcome),
    RequestAccepted,
    JobCompleted,
    ResultAccepted,
}

/// All hub state derived from the journal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedState {
    pub nodes: NodeTable,
    pub requests: IdempotencyStore,
    pub results: ResultLedger,
}

impl DerivedState {
    /// Fold one event. Timestamps come from the record, never from the
    /// wall clock, so replay is deterministic.
    pub fn apply(
        &mut self,
        record: &EventRecord,
        config: &ProjectionConfig,
    ) -> Result<Applied, HubError> {
        let applied = match record.kind {
            EventKind::NodeHeartbeat => {
                let observation: HeartbeatObservation = record.payload_as()?;
                let outcome =
                    self.nodes
                        .observe(&observation, record.timestamp, &config.registry);
                Applied::Heartbeat(outcome)
            }
            EventKind::RequestAccepted => {
                let event: RequestAcceptedEvent = record.payload_as()?;
                self.requests.insert_accepted(IdempotencyRecord {
                    idempotency_key: event.idempotency_key,
                    payload_fingerprint: event.payload_fingerprint,
                    job_id: event.job_id,
                    request_id: event.request_id,
                    status: RequestStatus::Accepted,
                    result_ref: None,
                    created_at: record.timestamp,
                });
                Applied::RequestAccepted
            }
            EventKind::JobCompleted => {
                let event: JobCompletedEvent = record.payload_as()?;
                self.requests.complete(&event.job_id, event.result_ref);
                Applied::JobCompleted
            }
            EventKind::ResultAccepted => {
                let event: ResultAcceptedEvent = record.payload_as()?;
                self.results.insert(StoredResult {
                    result_id: event.result_id.clone(),
                    job_id: event.job_id.clone(),
                    ok: event.ok,
                    result: event.result,
                    error: event.error,
                    accepted_at: record.timestamp,
                });
                // An accepted result completes the owning job, atomically
                // with its own visibility.
                self.requests.complete(&event.job_id, Some(event.result_id));
                Applied::ResultAccepted
            }
        };

        // Retention is part of the fold for the same determinism reason.
        self.requests
            .prune_completed(record.timestamp, config.intake.completed_ttl_ms);

        Ok(applied)
    }
}
