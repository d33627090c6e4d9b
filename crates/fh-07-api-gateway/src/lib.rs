//! # FH-07 API Gateway
//!
//! The hub's HTTP surface.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  API GATEWAY (fh-07)                  │
//! ├──────────────────────────────────────────────────────┤
//! │  ┌────────────────────────────────────────────────┐  │
//! │  │          Middleware Stack                       │  │
//! │  │  Auth (fh-01) → RateLimit → Trace               │  │
//! │  └───────────────────┬────────────────────────────┘  │
//! │                      │                                │
//! │  ┌───────────────────┴────────────────────────────┐  │
//! │  │          Handlers over the HubApi port          │  │
//! │  └───────────────────┬────────────────────────────┘  │
//! └──────────────────────┼────────────────────────────────┘
//!                        │
//!                   hub-runtime (HubCore)
//! ```
//!
//! Every endpoint except `GET /health` passes the Credential Authority,
//! via either of two equivalent header forms (`Authorization: Bearer` or
//! `X-API-Key`). Mutating endpoints additionally pass the per-source rate
//! limiter (reject, never queue) and are refused outright when the hub
//! runs in replica mode.
//!
//! Every rejection is a structured JSON body
//! `{"ok": false, "error": {"category", "message"}}` with a stable
//! category from `shared_types::HubError`.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod ports;
pub mod router;

pub use config::{GatewayConfig, HubMode, RateLimitConfig};
pub use error::ApiRejection;
pub use ports::{HeartbeatReply, HubApi, JournalView};
pub use router::{build_router, AppState};
