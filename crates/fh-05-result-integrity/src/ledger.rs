//! Accepted results, immutable once stored.

use serde::{Deserialize, Serialize};
use shared_types::StoredResult;
use std::collections::BTreeMap;

/// Keyed store of accepted results with a per-job index. Insertions are
/// apply-side only so writer and replicas fold identically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultLedger {
    results: BTreeMap<String, StoredResult>,
    /// job_id → result_id. One result per job, first acceptance wins.
    job_index: BTreeMap<String, String>,
}

impl ResultLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// The result already accepted for a job, if any.
    pub fn result_for_job(&self, job_id: &str) -> Option<&StoredResult> {
        self.job_index
            .get(job_id)
            .and_then(|result_id| self.results.get(result_id))
    }

    pub fn get(&self, result_id: &str) -> Option<&StoredResult> {
        self.results.get(result_id)
    }

    /// Apply an accepted result. A second result for the same job is
    /// ignored here; the writer rejects it before journaling.
    pub fn insert(&mut self, stored: StoredResult) {
        if self.job_index.contains_key(&stored.job_id) {
            return;
        }
        self.job_index
            .insert(stored.job_id.clone(), stored.result_id.clone());
        self.results.insert(stored.result_id.clone(), stored);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
