//! Router assembly and shared application state.

use crate::config::{GatewayConfig, HubMode};
use crate::handlers;
use crate::middleware::{AuthLayer, RateLimitLayer, RateLimitState};
use crate::ports::HubApi;
use axum::{
    routing::{get, post},
    Router,
};
use fh_01_credentials::CredentialAuthority;
use shared_types::HubError;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<dyn HubApi>,
    pub config: Arc<GatewayConfig>,
}

impl AppState {
    pub fn new(hub: Arc<dyn HubApi>, config: GatewayConfig) -> Self {
        Self {
            hub,
            config: Arc::new(config),
        }
    }

    /// The replica write guard: mutating endpoints are refused outright
    /// on a replica. The missing journal writer in the runtime backstops
    /// this even when the guard is disabled.
    pub fn guard_mutating(&self) -> Result<(), HubError> {
        if self.config.mode == HubMode::Replica && self.config.replica_write_guard {
            return Err(HubError::ReplicaReadOnly(
                "mutating endpoints are disabled on replicas".into(),
            ));
        }
        Ok(())
    }
}

/// Build the HTTP router.
///
/// Layer order (outermost first): trace → auth → rate limit, so every
/// inbound call passes the Credential Authority before anything else
/// besides logging.
pub fn build_router(state: AppState, authority: Arc<CredentialAuthority>) -> Router {
    let rate_limit_state = Arc::new(RateLimitState::new(state.config.rate_limit.clone()));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/heartbeat", post(handlers::heartbeat))
        .route("/registry", get(handlers::registry))
        .route("/submit_request", post(handlers::submit_request))
        .route("/submit_result", post(handlers::submit_result))
        .route("/journal", get(handlers::journal))
        .route("/writer_status", get(handlers::writer_status))
        .layer(RateLimitLayer::new(rate_limit_state))
        .layer(AuthLayer::new(authority))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
