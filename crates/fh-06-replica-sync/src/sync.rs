//! The sync loop service.

use crate::checkpoint::ReplicaCheckpoint;
use crate::ports::{EventSink, WriterFeed};
use fh_02_journal::framing::{parse_records, split_complete};
use shared_types::{HubError, SyncStatus};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Ceiling on the buffered partial tail. A tail that grows past this
/// without completing is treated as corruption: the buffer is discarded
/// and the range re-fetched from the last known-good offset.
pub const MAX_TAIL_BYTES: usize = 1024 * 1024;

/// Sync loop configuration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub writer_address: String,
    pub checkpoint_path: PathBuf,
    pub interval: Duration,
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickReport {
    /// Parsed, verified, and applied this many records.
    Applied { events: usize },
    /// Nothing new past the cursor.
    CaughtUp,
    /// Fetch failed; last-applied state keeps serving, retry next tick.
    WriterUnreachable,
    /// Chunk ended mid-record; trailing bytes buffered for the next tick.
    Buffered,
    /// Partial tail exceeded the ceiling and was discarded.
    TailDiscarded,
    /// Loop already halted by an earlier chain corruption.
    Halted,
}

/// Pulls journal ranges and replays them into the local projection.
///
/// Owns the replica cursor. The cursor and the projection snapshot are
/// persisted together after each applied batch, never before.
pub struct SyncService<F: WriterFeed> {
    feed: F,
    sink: Arc<dyn EventSink>,
    config: SyncConfig,
    state: ReplicaCheckpoint,
    tail: Vec<u8>,
    lag_bytes: u64,
    halted: bool,
}

impl<F: WriterFeed> std::fmt::Debug for SyncService<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncService")
            .field("lag_bytes", &self.lag_bytes)
            .field("halted", &self.halted)
            .finish_non_exhaustive()
    }
}

impl<F: WriterFeed> SyncService<F> {
    /// Resume from the persisted checkpoint, or start fresh at offset 0.
    ///
    /// A checkpoint pointing at a different writer is refused: replaying
    /// an unrelated journal would silently diverge.
    pub fn resume(feed: F, sink: Arc<dyn EventSink>, config: SyncConfig) -> Result<Self, HubError> {
        let state = match ReplicaCheckpoint::load(&config.checkpoint_path)? {
            Some(checkpoint) => {
                if checkpoint.writer_address != config.writer_address {
                    return Err(HubError::Config(format!(
                        "checkpoint belongs to writer {}, configured writer is {}",
                        checkpoint.writer_address, config.writer_address
                    )));
                }
                if let Some(snapshot) = checkpoint.snapshot.clone() {
                    sink.restore(snapshot)?;
                }
                info!(
                    offset = checkpoint.sync_offset,
                    events = checkpoint.total_events_synced,
                    "resuming replica from checkpoint"
                );
                checkpoint
            }
            None => ReplicaCheckpoint::fresh(&config.writer_address),
        };

        Ok(Self {
            feed,
            sink,
            config,
            state,
            tail: Vec::new(),
            lag_bytes: 0,
            halted: false,
        })
    }

    /// One sync tick. Returns `Err` only for chain corruption, which
    /// permanently halts this service; every transient condition is a
    /// `TickReport`.
    pub async fn tick(&mut self) -> Result<TickReport, HubError> {
        if self.halted {
            return Ok(TickReport::Halted);
        }

        let fetch_offset = self.state.sync_offset + self.tail.len() as u64;
        let chunk = match self.feed.fetch(fetch_offset).await {
            Ok(chunk) => chunk,
            Err(e) => {
                warn!(offset = fetch_offset, error = %e, "writer unreachable, serving stale state");
                return Ok(TickReport::WriterUnreachable);
            }
        };
        self.lag_bytes = chunk.writer_size_bytes.saturating_sub(self.state.sync_offset);

        if chunk.bytes.is_empty() {
            if self.tail.is_empty() {
                return Ok(TickReport::CaughtUp);
            }
            // The writer has nothing past a tail it started but never
            // finished in our view; wait for more bytes.
            return Ok(TickReport::Buffered);
        }

        let mut combined = std::mem::take(&mut self.tail);
        combined.extend_from_slice(&chunk.bytes);
        let (complete, partial) = split_complete(&combined);

        if partial.len() > MAX_TAIL_BYTES {
            warn!(
                tail_bytes = partial.len(),
                offset = self.state.sync_offset,
                "partial tail exceeded ceiling, discarding and re-syncing"
            );
            return Ok(TickReport::TailDiscarded);
        }

        if complete.is_empty() {
            self.tail = partial.to_vec();
            return Ok(TickReport::Buffered);
        }

        let records = match parse_records(complete) {
            Ok(records) => records,
            Err(e) => return self.halt(e),
        };

        // Chain verification against our own last applied record. A
        // mismatch means corruption or an unrelated journal.
        let mut expected_prev = self.state.last_hash.clone();
        for record in &records {
            if record.prev_hash != expected_prev {
                return self.halt(HubError::ChainCorruption(format!(
                    "record at offset {} chains to {}, expected {}",
                    record.offset, record.prev_hash, expected_prev
                )));
            }
            if !record.verify_hash() {
                return self.halt(HubError::ChainCorruption(format!(
                    "record at offset {} fails hash verification",
                    record.offset
                )));
            }
            expected_prev = record.hash.clone();
        }

        if let Err(e) = self.sink.apply_batch(&records) {
            return self.halt(e);
        }

        // The batch applied: only now advance and persist the cursor.
        self.state.sync_offset += complete.len() as u64;
        if let Some(last) = records.last() {
            self.state.last_hash = last.hash.clone();
            self.state.last_event_ts = Some(last.timestamp);
        }
        self.state.total_events_synced += records.len() as u64;
        self.state.last_sync_at = Some(chrono::Utc::now().timestamp_millis());

        // A failed checkpoint write is transient: the on-disk pair stays
        // at the previous consistent cursor+snapshot and a restart simply
        // re-fetches and re-folds the difference.
        match self.sink.snapshot() {
            Ok(snapshot) => {
                self.state.snapshot = Some(snapshot);
                if let Err(e) = self.state.persist(&self.config.checkpoint_path) {
                    warn!(error = %e, "checkpoint persist failed, retrying after the next batch");
                }
            }
            Err(e) => warn!(error = %e, "derived-state snapshot failed, checkpoint not advanced"),
        }

        self.tail = partial.to_vec();
        self.lag_bytes = chunk.writer_size_bytes.saturating_sub(self.state.sync_offset);
        Ok(TickReport::Applied {
            events: records.len(),
        })
    }

    /// Fixed-interval loop. Publishes status into `status_slot` after
    /// every tick so request handling can report lag without touching the
    /// loop; exits only on chain corruption.
    pub async fn run(mut self, status_slot: Arc<parking_lot::RwLock<SyncStatus>>) {
        let mut interval = tokio::time::interval(self.config.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let outcome = self.tick().await;
            *status_slot.write() = self.status();
            if let Err(e) = outcome {
                error!(error = %e, "replica sync loop stopped");
                break;
            }
        }
    }

    fn halt(&mut self, err: HubError) -> Result<TickReport, HubError> {
        error!(error = %err, "halting replica sync, manual reconciliation required");
        self.halted = true;
        Err(err)
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn status(&self) -> SyncStatus {
        SyncStatus {
            writer_address: self.state.writer_address.clone(),
            sync_offset: self.state.sync_offset,
            last_hash: self.state.last_hash.clone(),
            last_event_ts: self.state.last_event_ts,
            last_sync_at: self.state.last_sync_at,
            total_events_synced: self.state.total_events_synced,
            lag_bytes: self.lag_bytes,
            halted: self.halted,
        }
    }
}
