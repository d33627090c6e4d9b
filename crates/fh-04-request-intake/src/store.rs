//! The idempotency store.

use serde::{Deserialize, Serialize};
use shared_types::{IdempotencyRecord, RequestStatus, TimestampMs};
use std::collections::BTreeMap;
use tracing::debug;

/// What a submission against the store resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitDecision {
    /// Key unseen: caller should journal an acceptance and apply it.
    New,
    /// Key seen with an equal fingerprint: replay the stored record.
    Duplicate(IdempotencyRecord),
    /// Key seen with a different fingerprint: reject, keep the original.
    Conflict { existing_job_id: String },
}

/// Keyed dedup table. Mutations happen only through the apply-side
/// methods (`insert_accepted`, `complete`, `prune_completed`) so the
/// writer and replicas fold the same events into the same table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdempotencyStore {
    records: BTreeMap<String, IdempotencyRecord>,
    /// job_id → idempotency_key, for completion lookups.
    job_index: BTreeMap<String, String>,
}

impl IdempotencyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pure dedup decision for a submission. Does not mutate.
    pub fn decide(&self, idempotency_key: &str, payload_fingerprint: &str) -> SubmitDecision {
        match self.records.get(idempotency_key) {
            None => SubmitDecision::New,
            Some(existing) if existing.payload_fingerprint == payload_fingerprint => {
                SubmitDecision::Duplicate(existing.clone())
            }
            Some(existing) => SubmitDecision::Conflict {
                existing_job_id: existing.job_id.clone(),
            },
        }
    }

    /// Apply an accepted submission.
    pub fn insert_accepted(&mut self, record: IdempotencyRecord) {
        self.job_index
            .insert(record.job_id.clone(), record.idempotency_key.clone());
        self.records.insert(record.idempotency_key.clone(), record);
    }

    /// Apply a completion: must be visible to subsequent dedup lookups
    /// immediately. Returns false when the job is unknown.
    pub fn complete(&mut self, job_id: &str, result_ref: Option<String>) -> bool {
        let Some(key) = self.job_index.get(job_id) else {
            return false;
        };
        let Some(record) = self.records.get_mut(key) else {
            return false;
        };
        record.status = RequestStatus::Completed;
        if result_ref.is_some() {
            record.result_ref = result_ref;
        }
        true
    }

    pub fn get(&self, idempotency_key: &str) -> Option<&IdempotencyRecord> {
        self.records.get(idempotency_key)
    }

    pub fn get_by_job(&self, job_id: &str) -> Option<&IdempotencyRecord> {
        self.job_index
            .get(job_id)
            .and_then(|key| self.records.get(key))
    }

    /// Drop completed records older than the TTL. `now` is an event
    /// timestamp, never wall clock.
    pub fn prune_completed(&mut self, now: TimestampMs, ttl_ms: i64) -> usize {
        let expired: Vec<String> = self
            .records
            .values()
            .filter(|r| r.status == RequestStatus::Completed && now - r.created_at > ttl_ms)
            .map(|r| r.idempotency_key.clone())
            .collect();

        for key in &expired {
            if let Some(record) = self.records.remove(key) {
                self.job_index.remove(&record.job_id);
            }
        }
        if !expired.is_empty() {
            debug!(pruned = expired.len(), "pruned expired idempotency records");
        }
        expired.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &str, fingerprint: &str, job: &str, created_at: TimestampMs) -> IdempotencyRecord {
        IdempotencyRecord {
            idempotency_key: key.into(),
            payload_fingerprint: fingerprint.into(),
            job_id: job.into(),
            request_id: format!("req-{job}"),
            status: RequestStatus::Accepted,
            result_ref: None,
            created_at,
        }
    }

    #[test]
    fn test_unseen_key_is_new() {
        let store = IdempotencyStore::new();
        assert_eq!(store.decide("k1", "fp1"), SubmitDecision::New);
    }

    #[test]
    fn test_same_key_same_fingerprint_is_duplicate() {
        let mut store = IdempotencyStore::new();
        store.insert_accepted(record("k1", "fp1", "job-1", 0));

        match store.decide("k1", "fp1") {
            SubmitDecision::Duplicate(existing) => {
                assert_eq!(existing.job_id, "job-1");
                assert_eq!(existing.status, RequestStatus::Accepted);
            }
            other => panic!("expected duplicate, got {other:?}"),
        }
    }

    #[test]
    fn test_same_key_different_fingerprint_is_conflict() {
        let mut store = IdempotencyStore::new();
        store.insert_accepted(record("k1", "fp1", "job-1", 0));

        assert_eq!(
            store.decide("k1", "fp2"),
            SubmitDecision::Conflict {
                existing_job_id: "job-1".into()
            }
        );
        // Original record untouched.
        assert_eq!(store.get("k1").unwrap().payload_fingerprint, "fp1");
    }

    #[test]
    fn test_completion_visible_to_next_lookup() {
        let mut store = IdempotencyStore::new();
        store.insert_accepted(record("k1", "fp1", "job-1", 0));

        assert!(store.complete("job-1", Some("result-9".into())));
        match store.decide("k1", "fp1") {
            SubmitDecision::Duplicate(existing) => {
                assert_eq!(existing.status, RequestStatus::Completed);
                assert_eq!(existing.result_ref.as_deref(), Some("result-9"));
            }
            other => panic!("expected duplicate, got {other:?}"),
        }
    }

    #[test]
    fn test_complete_unknown_job_is_noop() {
        let mut store = IdempotencyStore::new();
        assert!(!store.complete("job-x", None));
    }

    #[test]
    fn test_prune_only_expired_completed_records() {
        let mut store = IdempotencyStore::new();
        store.insert_accepted(record("old-done", "fp1", "job-1", 0));
        store.insert_accepted(record("old-open", "fp2", "job-2", 0));
        store.insert_accepted(record("new-done", "fp3", "job-3", 900));
        store.complete("job-1", None);
        store.complete("job-3", None);

        let pruned = store.prune_completed(1000, 500);
        assert_eq!(pruned, 1);
        assert!(store.get("old-done").is_none());
        assert!(store.get("old-open").is_some());
        assert!(store.get("new-done").is_some());
        assert!(store.get_by_job("job-1").is_none());
    }
}
