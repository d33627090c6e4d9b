//! Middleware stack: authentication, per-source rate limiting.

pub mod auth;
pub mod rate_limit;

pub use auth::AuthLayer;
pub use rate_limit::{RateLimitLayer, RateLimitState};
