//! Cross-subsystem integration flows.

pub mod gateway_e2e;
pub mod replication;
pub mod writer_flows;
