//! In-memory journal storage for tests and offline folds.

use crate::ports::JournalStorage;
use shared_types::HubError;

/// Journal bytes held in a plain buffer.
#[derive(Default)]
pub struct MemoryJournalStorage {
    bytes: Vec<u8>,
}

impl MemoryJournalStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the buffer, e.g. with a journal captured from a writer.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl JournalStorage for MemoryJournalStorage {
    fn append(&mut self, bytes: &[u8]) -> Result<(), HubError> {
        self.bytes.extend_from_slice(bytes);
        Ok(())
    }

    fn read_from(&mut self, offset: u64, max_len: usize) -> Result<Vec<u8>, HubError> {
        let start = (offset as usize).min(self.bytes.len());
        let end = start.saturating_add(max_len).min(self.bytes.len());
        Ok(self.bytes[start..end].to_vec())
    }

    fn len(&mut self) -> Result<u64, HubError> {
        Ok(self.bytes.len() as u64)
    }

    fn truncate(&mut self, len: u64) -> Result<(), HubError> {
        self.bytes.truncate(len as usize);
        Ok(())
    }
}
