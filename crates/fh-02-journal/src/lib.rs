//! # FH-02 Durable Journal
//!
//! Single-writer, hash-chained, append-only event log.
//!
//! The journal is the only durable state the writer owns; the registry
//! and the idempotency store are derived projections rebuilt by replaying
//! it. Records are newline-delimited canonical JSON, addressed by byte
//! offset, and chained by `prev_hash`/`hash` (see
//! `shared_types::events::chain_hash`).
//!
//! ## Architecture
//!
//! ```text
//! JournalWriter ──► JournalStorage (port)
//!                    ├── FileJournalStorage   (fs2 exclusive flock)
//!                    └── MemoryJournalStorage (tests, offline folds)
//! ```
//!
//! Range reads return only complete records: a chunk is truncated at the
//! last `\n` so every response is independently parseable, which is what
//! lets replicas buffer a partial tail and resume mid-record.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod framing;
pub mod ports;
pub mod writer;

pub use adapters::{FileJournalStorage, MemoryJournalStorage};
pub use ports::JournalStorage;
pub use writer::{JournalChunk, JournalStats, JournalWriter, DEFAULT_CHUNK_BYTES};
