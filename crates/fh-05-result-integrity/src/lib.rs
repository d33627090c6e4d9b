//! # FH-05 Result Integrity Verifier
//!
//! Checks a caller-attached digest against a freshly recomputed digest
//! before a result is accepted. The submitter hashes the canonical form
//! of `{job_id, ok, result, error}` (`result_id` excluded); any byte
//! difference between that and the received core fields rejects the
//! submission without persisting it.
//!
//! This detects tampering of result content after digest computation. It
//! does not authenticate the origin node; origin trust is delegated to
//! the Credential Authority.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod ledger;
pub mod verifier;

pub use ledger::ResultLedger;
pub use verifier::verify_submission;
