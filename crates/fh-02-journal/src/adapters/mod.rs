//! Storage adapters for the journal port.

pub mod file;
pub mod memory;

pub use file::FileJournalStorage;
pub use memory::MemoryJournalStorage;
