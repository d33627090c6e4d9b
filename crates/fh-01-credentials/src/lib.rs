//! # FH-01 Credential Authority
//!
//! Verifies bearer-style tokens for every non-public endpoint.
//!
//! Two configurations exist: a legacy single fixed secret, and a
//! dual-secret mode where an `active` and an optional `next` secret are
//! both valid until an absolute rotation deadline passes, at which point
//! `next` silently becomes the sole valid secret. Promotion is implicit;
//! there is no separate admin action, so a fleet can be rotated without
//! downtime by distributing `next` ahead of the deadline.
//!
//! # Security
//!
//! - Token comparison is constant-time (`subtle`), including across the
//!   set of currently-valid secrets.
//! - Rejections never indicate which secret nearly matched.
//! - The no-secret + enforcement-off combination is an explicit dev-mode
//!   escape hatch; with enforcement on, a missing secret is a startup
//!   configuration error.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod authority;
pub mod config;

pub use authority::CredentialAuthority;
pub use config::CredentialConfig;
