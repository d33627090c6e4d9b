//! The hub container: journal + derived-state projection behind one
//! serialized apply path.
//!
//! Every mutating call takes the single `Mutex`: decide, append to the
//! journal, fold the new record into the projection, release. That one
//! critical section is what serializes concurrent heartbeats for the same
//! node and concurrent same-key submissions, and what makes a completion
//! visible to the next dedup lookup atomically. Nothing inside it awaits.

pub mod projection;

use fh_02_journal::{FileJournalStorage, JournalWriter, DEFAULT_CHUNK_BYTES};
use fh_05_result_integrity::verify_submission;
use fh_06_replica_sync::EventSink;
use fh_07_api_gateway::{HeartbeatReply, HubApi, JournalView};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use shared_types::events::{RequestAcceptedEvent, ResultAcceptedEvent};
use shared_types::{
    EventKind, EventRecord, HeartbeatObservation, HubError, NodeRecord, RequestStatus,
    ResultSubmission, SubmitOutcome, SubmitRequest, SyncStatus, TimestampMs, WriterStatus,
    GENESIS_HASH,
};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

pub use projection::{Applied, DerivedState, ProjectionConfig};

struct CoreInner {
    /// Present only in writer mode. Its absence is the hard write guard:
    /// replica code paths cannot append no matter how they are routed.
    journal: Option<JournalWriter>,
    derived: DerivedState,
}

/// The hub's single coordinating owner of shared mutable state.
pub struct HubCore {
    inner: Mutex<CoreInner>,
    config: ProjectionConfig,
    /// Observable count of rejected result submissions. Writer-local; a
    /// rejected result is never journaled.
    integrity_rejections: AtomicU64,
    /// Replica mode: status slot fed by the sync loop.
    sync_slot: Option<Arc<RwLock<SyncStatus>>>,
}

impl HubCore {
    /// Writer mode: lock the journal file, replay it, serve.
    pub fn open_writer<P: AsRef<Path>>(
        journal_path: P,
        config: ProjectionConfig,
    ) -> Result<Self, HubError> {
        let storage = FileJournalStorage::open(journal_path)?;
        let mut journal = JournalWriter::open(Box::new(storage))?;

        let mut derived = DerivedState::default();
        for record in journal.replay()? {
            derived.apply(&record, &config)?;
        }
        info!(
            events = journal.stats().total_events,
            nodes = derived.nodes.len(),
            "writer state rebuilt from journal"
        );

        Ok(Self {
            inner: Mutex::new(CoreInner {
                journal: Some(journal),
                derived,
            }),
            config,
            integrity_rejections: AtomicU64::new(0),
            sync_slot: None,
        })
    }

    /// Replica mode: no journal writer, state arrives via the sync loop.
    pub fn new_replica(config: ProjectionConfig, sync_slot: Arc<RwLock<SyncStatus>>) -> Self {
        Self {
            inner: Mutex::new(CoreInner {
                journal: None,
                derived: DerivedState::default(),
            }),
            config,
            integrity_rejections: AtomicU64::new(0),
            sync_slot: Some(sync_slot),
        }
    }

    pub fn integrity_rejections(&self) -> u64 {
        self.integrity_rejections.load(Ordering::Relaxed)
    }

    fn now_ms() -> TimestampMs {
        chrono::Utc::now().timestamp_millis()
    }

    fn append(
        inner: &mut CoreInner,
        kind: EventKind,
        payload: Value,
        timestamp: TimestampMs,
    ) -> Result<EventRecord, HubError> {
        let journal = inner.journal.as_mut().ok_or_else(|| {
            HubError::ReplicaReadOnly("journal appends are disabled in replica mode".into())
        })?;
        journal.append_event(kind, payload, timestamp)
    }
}

impl HubApi for HubCore {
    fn heartbeat(&self, observation: HeartbeatObservation) -> Result<HeartbeatReply, HubError> {
        let timestamp = Self::now_ms();
        let payload = serde_json::to_value(&observation)?;

        let mut inner = self.inner.lock();
        let record = Self::append(&mut inner, EventKind::NodeHeartbeat, payload, timestamp)?;
        match inner.derived.apply(&record, &self.config)? {
            Applied::Heartbeat(outcome) => Ok(HeartbeatReply {
                attestation_status: outcome.attestation_status,
                health: outcome.health,
            }),
            _ => Err(HubError::Storage("heartbeat event applied as wrong kind".into())),
        }
    }

    fn registry(&self) -> Result<BTreeMap<String, NodeRecord>, HubError> {
        Ok(self.inner.lock().derived.nodes.snapshot().clone())
    }

    fn submit_request(&self, request: SubmitRequest) -> Result<SubmitOutcome, HubError> {
        use fh_04_request_intake::SubmitDecision;

        let timestamp = Self::now_ms();
        let fingerprint = shared_types::canon::payload_fingerprint(&request.kind, &request.params);

        let mut inner = self.inner.lock();
        match inner.derived.requests.decide(&request.idempotency_key, &fingerprint) {
            SubmitDecision::Duplicate(existing) => {
                let result = match (&existing.status, &existing.result_ref) {
                    (RequestStatus::Completed, Some(result_ref)) => inner
                        .derived
                        .results
                        .get(result_ref)
                        .map(serde_json::to_value)
                        .transpose()?,
                    _ => None,
                };
                Ok(SubmitOutcome {
                    request_id: existing.request_id,
                    job_id: existing.job_id,
                    status: existing.status,
                    dedup: true,
                    result,
                })
            }
            SubmitDecision::Conflict { existing_job_id } => Err(HubError::Conflict(format!(
                "idempotency key {} is bound to job {existing_job_id} with a different payload",
                request.idempotency_key
            ))),
            SubmitDecision::New => {
                let job_id = uuid::Uuid::new_v4().to_string();
                let request_id = uuid::Uuid::new_v4().to_string();
                let event = RequestAcceptedEvent {
                    idempotency_key: request.idempotency_key,
                    payload_fingerprint: fingerprint,
                    job_id: job_id.clone(),
                    request_id: request_id.clone(),
                    kind: request.kind,
                    params: request.params,
                };
                let record = Self::append(
                    &mut inner,
                    EventKind::RequestAccepted,
                    serde_json::to_value(&event)?,
                    timestamp,
                )?;
                inner.derived.apply(&record, &self.config)?;

                Ok(SubmitOutcome {
                    request_id,
                    job_id,
                    status: RequestStatus::Accepted,
                    dedup: false,
                    result: None,
                })
            }
        }
    }

    fn submit_result(&self, submission: ResultSubmission) -> Result<(), HubError> {
        if let Err(err) = verify_submission(&submission) {
            self.integrity_rejections.fetch_add(1, Ordering::Relaxed);
            return Err(err);
        }

        let timestamp = Self::now_ms();
        let mut inner = self.inner.lock();

        if inner.derived.requests.get_by_job(&submission.job_id).is_none() {
            return Err(HubError::NotFound(format!(
                "job {} is not known to this hub",
                submission.job_id
            )));
        }
        if inner.derived.results.result_for_job(&submission.job_id).is_some() {
            return Err(HubError::Conflict(format!(
                "job {} already holds an accepted result",
                submission.job_id
            )));
        }

        let event = ResultAcceptedEvent {
            result_id: submission.result_id,
            job_id: submission.job_id,
            ok: submission.ok,
            result: submission.result,
            error: submission.error,
            digest: submission.integrity.digest,
        };
        let record = Self::append(
            &mut inner,
            EventKind::ResultAccepted,
            serde_json::to_value(&event)?,
            timestamp,
        )?;
        inner.derived.apply(&record, &self.config)?;
        Ok(())
    }

    fn journal_chunk(&self, offset: u64) -> Result<JournalView, HubError> {
        let mut inner = self.inner.lock();
        let journal = inner.journal.as_mut().ok_or_else(|| {
            HubError::ReplicaReadOnly("journal ranges are served by the writer".into())
        })?;

        let chunk = journal.read_chunk(offset, DEFAULT_CHUNK_BYTES)?;
        let size = journal.stats().size_bytes;
        Ok(JournalView {
            bytes: chunk.bytes,
            next_offset: chunk.next_offset,
            last_hash: chunk.last_hash,
            last_timestamp: chunk.last_timestamp,
            journal_size_bytes: size,
        })
    }

    fn writer_status(&self) -> Result<WriterStatus, HubError> {
        match &self.sync_slot {
            None => {
                let inner = self.inner.lock();
                let stats = inner
                    .journal
                    .as_ref()
                    .map(|journal| journal.stats())
                    .ok_or_else(|| HubError::Storage("writer without a journal".into()))?;
                Ok(WriterStatus {
                    status: "writer".into(),
                    journal_size_bytes: stats.size_bytes,
                    last_hash: stats.last_hash,
                    last_event_ts: stats.last_event_ts,
                    total_events: stats.total_events,
                    integrity_rejections: self.integrity_rejections(),
                    sync: None,
                })
            }
            Some(slot) => {
                let sync = slot.read().clone();
                Ok(WriterStatus {
                    status: "replica".into(),
                    journal_size_bytes: sync.sync_offset,
                    last_hash: sync.last_hash.clone(),
                    last_event_ts: sync.last_event_ts,
                    total_events: sync.total_events_synced,
                    integrity_rejections: self.integrity_rejections(),
                    sync: Some(sync),
                })
            }
        }
    }
}

impl EventSink for HubCore {
    fn apply_batch(&self, records: &[EventRecord]) -> Result<(), HubError> {
        let mut inner = self.inner.lock();
        for record in records {
            inner.derived.apply(record, &self.config)?;
        }
        Ok(())
    }

    fn snapshot(&self) -> Result<Value, HubError> {
        Ok(serde_json::to_value(&self.inner.lock().derived)?)
    }

    fn restore(&self, snapshot: Value) -> Result<(), HubError> {
        let derived: DerivedState = serde_json::from_value(snapshot)
            .map_err(|e| HubError::Storage(format!("corrupt snapshot: {e}")))?;
        self.inner.lock().derived = derived;
        Ok(())
    }
}

/// Empty status for a replica that has not completed a tick yet.
pub fn initial_sync_status(writer_address: &str) -> SyncStatus {
    SyncStatus {
        writer_address: writer_address.to_string(),
        sync_offset: 0,
        last_hash: GENESIS_HASH.to_string(),
        last_event_ts: None,
        last_sync_at: None,
        total_events_synced: 0,
        lag_bytes: 0,
        halted: false,
    }
}
