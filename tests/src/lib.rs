//! # Fleet-Hub Test Suite
//!
//! Unified test crate containing cross-subsystem integration flows:
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── writer_flows.rs   # heartbeat/attestation, dedup, results on a live core
//!     ├── replication.rs    # writer → replica replay, checkpoint resume
//!     └── gateway_e2e.rs    # full HTTP round trips through the router
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p fh-tests
//!
//! # By category
//! cargo test -p fh-tests integration::replication
//! ```

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
