//! The node table and its heartbeat state machine.

use crate::config::RegistryConfig;
use serde::{Deserialize, Serialize};
use shared_types::{
    AttestationState, AttestationStatus, HeartbeatObservation, NodeHealth, NodeId, NodeRecord,
    TimestampMs,
};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// What a single heartbeat resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatOutcome {
    pub attestation_status: AttestationStatus,
    pub health: NodeHealth,
}

/// Explicitly owned registry table. All mutation goes through
/// [`NodeTable::observe`]; records are never deleted (a silent node just
/// ages with its last known state). Serializable so replicas can
/// checkpoint it as part of their derived-state snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeTable {
    nodes: BTreeMap<NodeId, NodeRecord>,
}

impl NodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one heartbeat at `now` and report the resolved statuses.
    ///
    /// Deterministic in `(self, observation, now, config)` so the same
    /// event stream folds to the same table on the writer and on every
    /// replica.
    pub fn observe(
        &mut self,
        observation: &HeartbeatObservation,
        now: TimestampMs,
        config: &RegistryConfig,
    ) -> HeartbeatOutcome {
        let record = self
            .nodes
            .entry(observation.node_id.clone())
            .or_insert_with(|| NodeRecord {
                node_id: observation.node_id.clone(),
                health: NodeHealth::Green,
                attestation: AttestationState {
                    fingerprint: None,
                    status: AttestationStatus::Missing,
                    first_seen_at: now,
                    last_seen_at: now,
                    change_count: 0,
                    window_start: now,
                },
                current_jobs: Vec::new(),
            });

        record.attestation.last_seen_at = now;
        if let Some(health) = observation.health {
            record.health = health;
        }
        if let Some(jobs) = &observation.current_jobs {
            record.current_jobs = jobs.clone();
        }

        let status = match &observation.attestation {
            None => AttestationStatus::Missing,
            Some(incoming) => match record.attestation.fingerprint.take() {
                None => {
                    record.attestation.fingerprint = Some(incoming.clone());
                    AttestationStatus::Ok
                }
                Some(stored) if stored.matches(incoming) => {
                    record.attestation.fingerprint = Some(incoming.clone());
                    AttestationStatus::Ok
                }
                Some(_) => {
                    if now - record.attestation.window_start > config.drift_window_ms {
                        record.attestation.window_start = now;
                        record.attestation.change_count = 1;
                    } else {
                        record.attestation.change_count += 1;
                    }
                    record.attestation.fingerprint = Some(incoming.clone());

                    if record.attestation.change_count >= config.drift_threshold {
                        AttestationStatus::SpoofSuspect
                    } else {
                        AttestationStatus::Drift
                    }
                }
            },
        };
        record.attestation.status = status;

        let floor = match status {
            AttestationStatus::Drift => Some(NodeHealth::Yellow),
            AttestationStatus::SpoofSuspect => Some(NodeHealth::Red),
            _ => None,
        };
        if let Some(floor) = floor {
            let intended = record.health.max(floor);
            if intended != record.health {
                if !config.governance_enabled {
                    debug!(
                        node_id = %record.node_id,
                        ?status,
                        "governance disabled, leaving health untouched"
                    );
                } else if config.governance_dry_run {
                    info!(
                        node_id = %record.node_id,
                        current = ?record.health,
                        intended = ?intended,
                        "governance dry-run: would downgrade health"
                    );
                } else {
                    record.health = intended;
                }
            }
        }

        HeartbeatOutcome {
            attestation_status: status,
            health: record.health,
        }
    }

    pub fn get(&self, node_id: &str) -> Option<&NodeRecord> {
        self.nodes.get(node_id)
    }

    /// Full registry snapshot.
    pub fn snapshot(&self) -> &BTreeMap<NodeId, NodeRecord> {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
