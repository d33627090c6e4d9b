//! # FH-03 Node Registry & Attestation Tracker
//!
//! Ingests heartbeats and maintains the per-node health/attestation state
//! machine:
//!
//! - no attestation block → `MISSING`, independent of history
//! - unseen node → `OK` (any first fingerprint is accepted as baseline)
//! - fingerprint unchanged → `OK`
//! - fingerprint changed → `DRIFT`, health downgraded to at least `YELLOW`
//! - threshold changes within the rolling window → `SPOOF_SUSPECT`,
//!   health forced to `RED`
//!
//! The stored fingerprint is replaced on every heartbeat, so drift is
//! always measured against the most recent value rather than the original
//! baseline. Detection is returned as data; a heartbeat never fails
//! because drift or spoofing was detected.
//!
//! The table is an explicitly owned structure reachable only through
//! [`NodeTable::observe`]; callers provide the timestamp, which is what
//! lets the projection replay heartbeats deterministically.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod table;

pub use config::RegistryConfig;
pub use table::{HeartbeatOutcome, NodeTable};
