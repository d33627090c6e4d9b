//! # FH-06 Replication Sync
//!
//! Per-replica loop pulling journal ranges from the writer and replaying
//! them into local derived state.
//!
//! ## Architecture
//!
//! ```text
//! SyncService ──► WriterFeed (port)
//!  │               ├── HttpWriterFeed   (reqwest, bounded timeout)
//!  │               └── MemoryWriterFeed (tests)
//!  └─────────────► EventSink  (port)    — the replica's projection
//! ```
//!
//! Each tick fetches from the cursor, prepends any buffered partial tail,
//! parses only complete records, verifies the hash chain against the last
//! applied record, applies the whole batch, and only then advances and
//! persists the checkpoint (cursor + derived-state snapshot in one atomic
//! file). An unreachable writer is reported as lag, not an error; a chain
//! mismatch halts this replica's loop only; a partial tail growing past
//! [`sync::MAX_TAIL_BYTES`] is discarded and the range re-fetched from the
//! last known-good offset.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod checkpoint;
pub mod ports;
pub mod sync;

pub use adapters::{HttpWriterFeed, MemoryWriterFeed};
pub use checkpoint::ReplicaCheckpoint;
pub use ports::{EventSink, FeedChunk, WriterFeed};
pub use sync::{SyncConfig, SyncService, TickReport, MAX_TAIL_BYTES};
