//! # FH-04 Idempotent Request Intake
//!
//! Deduplicates mutating submissions by caller-supplied key plus payload
//! fingerprint:
//!
//! - unseen key → new record, `dedup=false`
//! - seen key, equal fingerprint → stored ids replayed, `dedup=true`
//!   (including the cached result once completed — never recomputed)
//! - seen key, different fingerprint → conflict, original untouched
//!
//! The store is a pure keyed table; decisions and mutations are separate
//! steps so the writer can decide, journal the acceptance, and apply it
//! through the same projection fold replicas use. Completed records are
//! pruned after a TTL evaluated against event timestamps, keeping writer
//! and replica state identical.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod store;

pub use config::IntakeConfig;
pub use store::{IdempotencyStore, SubmitDecision};
