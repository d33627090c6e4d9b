//! # Shared Types Crate
//!
//! This crate contains all cross-subsystem domain entities, the journal
//! event record, the shared error taxonomy, and the canonical
//! serialization/digest helpers.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that crosses a subsystem
//!   boundary (node records, idempotency records, result submissions,
//!   journal events) is defined here.
//! - **Deterministic Serialization**: fingerprints, result digests, and
//!   chain hashes are all computed over the canonical JSON form produced
//!   by [`canon`], so two parties serializing the same value always hash
//!   the same bytes.
//! - **Structured Failures**: every rejection the hub produces carries a
//!   stable [`HubError`] category that callers and verification tooling
//!   can assert on.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod canon;
pub mod entities;
pub mod errors;
pub mod events;

pub use entities::*;
pub use errors::HubError;
pub use events::{chain_hash, EventKind, EventRecord, GENESIS_HASH};
