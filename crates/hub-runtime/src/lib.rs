//! # Fleet-Hub Runtime
//!
//! Composition root: builds the validated [`HubConfig`] once at startup,
//! owns the [`core::HubCore`] container (journal writer + derived-state
//! projection behind a single serialized apply path), and wires the HTTP
//! gateway plus, in replica mode, the sync loop.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from `FH_*` environment variables
//! 2. Validate (mode/address combinations, secrets, numeric limits)
//! 3. Writer: open + flock the journal, replay it into the projection
//!    Replica: restore the checkpoint, spawn the sync loop
//! 4. Bind the gateway and serve

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod wiring;

pub use config::HubConfig;
pub use self::core::HubCore;
pub use wiring::run;
