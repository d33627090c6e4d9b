//! The journal writer service: append, chain maintenance, range reads.

use crate::framing::{parse_records, split_complete};
use crate::ports::JournalStorage;
use serde_json::Value;
use shared_types::{EventKind, EventRecord, HubError, TimestampMs, GENESIS_HASH};
use tracing::{info, warn};

/// Default range-read chunk ceiling.
pub const DEFAULT_CHUNK_BYTES: usize = 256 * 1024;

/// One range read: complete records only, plus the metadata a replica
/// needs to advance its cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalChunk {
    pub bytes: Vec<u8>,
    /// Offset of the first byte after the last complete record returned.
    pub next_offset: u64,
    /// Hash of the last complete record in the chunk, if any.
    pub last_hash: Option<String>,
    /// Timestamp of the last complete record in the chunk, if any.
    pub last_timestamp: Option<TimestampMs>,
}

/// Writer-side journal tail state.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalStats {
    pub size_bytes: u64,
    pub last_hash: String,
    pub last_event_ts: Option<TimestampMs>,
    pub total_events: u64,
}

/// Owns the single append path of a journal.
///
/// Only the writer role ever constructs one of these; replicas hold no
/// `JournalWriter` at all (see the runtime's write guard).
pub struct JournalWriter {
    storage: Box<dyn JournalStorage>,
    size_bytes: u64,
    last_hash: String,
    last_event_ts: Option<TimestampMs>,
    total_events: u64,
}

impl std::fmt::Debug for JournalWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JournalWriter")
            .field("size_bytes", &self.size_bytes)
            .field("last_hash", &self.last_hash)
            .field("last_event_ts", &self.last_event_ts)
            .field("total_events", &self.total_events)
            .finish_non_exhaustive()
    }
}

impl JournalWriter {
    /// Open a journal, scanning any existing records to rebuild the tail
    /// state and verify the chain.
    ///
    /// A torn tail (crash mid-append) is dropped: range reads only ever
    /// served complete records, so no reader can have observed it.
    pub fn open(mut storage: Box<dyn JournalStorage>) -> Result<Self, HubError> {
        let total_len = storage.len()?;
        let raw = storage.read_from(0, total_len as usize)?;
        let (complete, torn) = split_complete(&raw);

        if !torn.is_empty() {
            warn!(
                torn_bytes = torn.len(),
                "journal ends mid-record, dropping torn tail"
            );
            storage.truncate(complete.len() as u64)?;
        }

        let records = parse_records(complete)?;
        let mut last_hash = GENESIS_HASH.to_string();
        let mut last_event_ts = None;

        for record in &records {
            if record.prev_hash != last_hash || !record.verify_hash() {
                return Err(HubError::ChainCorruption(format!(
                    "broken chain at offset {}",
                    record.offset
                )));
            }
            last_hash = record.hash.clone();
            last_event_ts = Some(record.timestamp);
        }

        info!(events = records.len(), size_bytes = complete.len(), "journal opened");
        Ok(Self {
            storage,
            size_bytes: complete.len() as u64,
            last_hash,
            last_event_ts,
            total_events: records.len() as u64,
        })
    }

    /// Append one event, extending the hash chain.
    pub fn append_event(
        &mut self,
        kind: EventKind,
        payload: Value,
        timestamp: TimestampMs,
    ) -> Result<EventRecord, HubError> {
        let record = EventRecord::new(self.size_bytes, kind, payload, timestamp, &self.last_hash);
        let line = record.encode_line()?;
        self.storage.append(&line)?;

        self.size_bytes += line.len() as u64;
        self.last_hash = record.hash.clone();
        self.last_event_ts = Some(timestamp);
        self.total_events += 1;
        Ok(record)
    }

    /// Replay every record in the journal, in order.
    pub fn replay(&mut self) -> Result<Vec<EventRecord>, HubError> {
        let raw = self.storage.read_from(0, self.size_bytes as usize)?;
        parse_records(&raw)
    }

    /// Range read starting at `offset`, truncated to the last complete
    /// record so the chunk is always independently parseable.
    pub fn read_chunk(&mut self, offset: u64, max_len: usize) -> Result<JournalChunk, HubError> {
        if offset >= self.size_bytes {
            return Ok(JournalChunk {
                bytes: Vec::new(),
                next_offset: offset,
                last_hash: None,
                last_timestamp: None,
            });
        }

        let raw = self.storage.read_from(offset, max_len)?;
        let (complete, _partial) = split_complete(&raw);
        let records = parse_records(complete)?;
        let last = records.last();

        Ok(JournalChunk {
            next_offset: offset + complete.len() as u64,
            last_hash: last.map(|r| r.hash.clone()),
            last_timestamp: last.map(|r| r.timestamp),
            bytes: complete.to_vec(),
        })
    }

    pub fn stats(&self) -> JournalStats {
        JournalStats {
            size_bytes: self.size_bytes,
            last_hash: self.last_hash.clone(),
            last_event_ts: self.last_event_ts,
            total_events: self.total_events,
        }
    }
}
