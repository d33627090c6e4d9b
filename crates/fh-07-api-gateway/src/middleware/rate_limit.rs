//! Per-source rate limiting for mutating submissions.
//!
//! Token buckets per source IP via `governor`. Excess requests are
//! rejected immediately with a `rate_limited` category; nothing is ever
//! queued — backoff is the caller's responsibility.

use crate::config::RateLimitConfig;
use crate::error::ApiRejection;
use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Method, Request},
    response::IntoResponse,
    response::Response,
};
use dashmap::DashMap;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use shared_types::HubError;
use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use tower::{Layer, Service};
use tracing::{debug, warn};

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rate limiter state shared across requests.
pub struct RateLimitState {
    /// Per-source token buckets.
    buckets: DashMap<IpAddr, DirectLimiter>,
    config: RateLimitConfig,
}

impl RateLimitState {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            buckets: DashMap::new(),
            config,
        }
    }

    /// Check one submission from `source`.
    pub fn check(&self, source: IpAddr) -> Result<(), HubError> {
        if !self.config.enabled {
            return Ok(());
        }

        let per_minute = NonZeroU32::new(self.config.submissions_per_minute)
            .unwrap_or(NonZeroU32::MIN);
        let bucket = self.buckets.entry(source).or_insert_with(|| {
            debug!(source = %source, "creating rate limit bucket");
            RateLimiter::direct(Quota::per_minute(per_minute))
        });

        bucket
            .check()
            .map_err(|_| HubError::RateLimited(source.to_string()))
    }
}

/// Rate limiting layer. Only mutating (POST) requests are counted.
#[derive(Clone)]
pub struct RateLimitLayer {
    state: Arc<RateLimitState>,
}

impl RateLimitLayer {
    pub fn new(state: Arc<RateLimitState>) -> Self {
        Self { state }
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitService {
            inner,
            state: Arc::clone(&self.state),
        }
    }
}

/// Rate limiting service.
#[derive(Clone)]
pub struct RateLimitService<S> {
    inner: S,
    state: Arc<RateLimitState>,
}

impl<S> Service<Request<Body>> for RateLimitService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let state = Arc::clone(&self.state);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            if req.method() == Method::POST {
                if let Some(source) = source_ip(&req) {
                    if let Err(err) = state.check(source) {
                        warn!(source = %source, "rejecting over-limit submission");
                        return Ok(ApiRejection(err).into_response());
                    }
                } else {
                    debug!("no source address on request, skipping rate limit");
                }
            }
            inner.call(req).await
        })
    }
}

/// Resolve the source IP of a request.
fn source_ip<B>(req: &Request<B>) -> Option<IpAddr> {
    if let Some(connect_info) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return Some(connect_info.0.ip());
    }

    // Behind a proxy, fall back to the first forwarded hop.
    if let Some(forwarded) = req.headers().get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            if let Some(first_ip) = forwarded_str.split(',').next() {
                if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                    return Some(ip);
                }
            }
        }
    }

    None
}
