//! In-memory writer feed for sync-loop tests.

use crate::ports::{FeedChunk, WriterFeed};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::HubError;
use std::sync::Arc;

/// Serves raw byte windows of a shared journal buffer.
///
/// Deliberately byte-oriented, not record-oriented: a small
/// `chunk_limit` slices records mid-way, which is exactly what the
/// partial-tail handling in the sync loop has to cope with.
#[derive(Clone)]
pub struct MemoryWriterFeed {
    journal: Arc<Mutex<Vec<u8>>>,
    chunk_limit: usize,
    unreachable: Arc<Mutex<bool>>,
}

impl MemoryWriterFeed {
    pub fn new(journal: Arc<Mutex<Vec<u8>>>, chunk_limit: usize) -> Self {
        Self {
            journal,
            chunk_limit,
            unreachable: Arc::new(Mutex::new(false)),
        }
    }

    /// Simulate the writer going away.
    pub fn set_unreachable(&self, unreachable: bool) {
        *self.unreachable.lock() = unreachable;
    }
}

#[async_trait]
impl WriterFeed for MemoryWriterFeed {
    async fn fetch(&self, offset: u64) -> Result<FeedChunk, HubError> {
        if *self.unreachable.lock() {
            return Err(HubError::WriterUnreachable("simulated outage".into()));
        }

        let journal = self.journal.lock();
        let start = (offset as usize).min(journal.len());
        let end = start.saturating_add(self.chunk_limit).min(journal.len());
        let bytes = journal[start..end].to_vec();

        Ok(FeedChunk {
            next_offset: offset + bytes.len() as u64,
            last_hash: None,
            last_timestamp: None,
            writer_size_bytes: journal.len() as u64,
            bytes,
        })
    }
}
