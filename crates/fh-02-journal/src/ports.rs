//! Storage port for the journal byte stream.

use shared_types::HubError;

/// Offset-addressed append-only byte storage.
///
/// The chain fold and record framing are deliberately independent of this
/// port so they can be tested against the in-memory adapter without I/O.
pub trait JournalStorage: Send {
    /// Append raw bytes at the end of the stream.
    fn append(&mut self, bytes: &[u8]) -> Result<(), HubError>;

    /// Read up to `max_len` bytes starting at `offset`. Short reads at
    /// the end of the stream are normal.
    fn read_from(&mut self, offset: u64, max_len: usize) -> Result<Vec<u8>, HubError>;

    /// Current stream length in bytes.
    fn len(&mut self) -> Result<u64, HubError>;

    /// Discard everything at and after `len`. Used once, at open, to drop
    /// a torn tail left by a crash mid-append.
    fn truncate(&mut self, len: u64) -> Result<(), HubError>;
}
