//! Ports for the sync loop: the writer feed and the local projection.

use async_trait::async_trait;
use serde_json::Value;
use shared_types::{EventRecord, HubError, TimestampMs};

/// One fetched journal range, complete records only.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedChunk {
    pub bytes: Vec<u8>,
    /// Writer's offset after the last complete record in `bytes`.
    pub next_offset: u64,
    /// Hash of the last complete record, if the chunk is non-empty.
    pub last_hash: Option<String>,
    pub last_timestamp: Option<TimestampMs>,
    /// Total journal size at fetch time, for lag reporting.
    pub writer_size_bytes: u64,
}

/// Transport to the writer. Implementations must bound their own
/// timeouts: an expired fetch is "writer unreachable", never a hang.
#[async_trait]
pub trait WriterFeed: Send + Sync {
    async fn fetch(&self, offset: u64) -> Result<FeedChunk, HubError>;
}

/// The replica's derived-state projection.
///
/// `apply_batch` must be all-or-nothing from the sync loop's point of
/// view: an error means the batch cannot be trusted and the loop halts.
pub trait EventSink: Send + Sync {
    fn apply_batch(&self, records: &[EventRecord]) -> Result<(), HubError>;

    /// Serialize the current derived state for checkpointing.
    fn snapshot(&self) -> Result<Value, HubError>;

    /// Restore derived state from a checkpoint snapshot.
    fn restore(&self, snapshot: Value) -> Result<(), HubError>;
}
