//! Authentication middleware.
//!
//! Delegates token verification to the Credential Authority. Accepts two
//! equivalent header forms: `Authorization: Bearer <token>` and
//! `X-API-Key: <token>`. Public endpoints (liveness) bypass the check
//! entirely.

use crate::error::ApiRejection;
use axum::{body::Body, http::Request, response::IntoResponse, response::Response};
use fh_01_credentials::CredentialAuthority;
use std::sync::Arc;
use tower::{Layer, Service};
use tracing::debug;

/// Authentication layer.
#[derive(Clone)]
pub struct AuthLayer {
    authority: Arc<CredentialAuthority>,
}

impl AuthLayer {
    pub fn new(authority: Arc<CredentialAuthority>) -> Self {
        Self { authority }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            authority: Arc::clone(&self.authority),
        }
    }
}

/// Authentication service.
#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    authority: Arc<CredentialAuthority>,
}

impl<S> Service<Request<Body>> for AuthService<S>
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
        let authority = Arc::clone(&self.authority);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            if is_public_path(req.uri().path()) {
                return inner.call(req).await;
            }

            let token = extract_token(&req);
            match authority.verify(token.as_deref()) {
                Ok(()) => inner.call(req).await,
                Err(err) => {
                    debug!(path = req.uri().path(), "rejecting unauthenticated request");
                    Ok(ApiRejection(err).into_response())
                }
            }
        })
    }
}

/// Liveness is the only endpoint that bypasses authentication.
fn is_public_path(path: &str) -> bool {
    path == "/health"
}

/// Pull the caller token from either accepted header form.
fn extract_token<B>(req: &Request<B>) -> Option<String> {
    if let Some(auth) = req.headers().get("authorization") {
        if let Ok(auth_str) = auth.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    if let Some(api_key) = req.headers().get("x-api-key") {
        if let Ok(key_str) = api_key.to_str() {
            return Some(key_str.to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_path_detection() {
        assert!(is_public_path("/health"));
        assert!(!is_public_path("/registry"));
        assert!(!is_public_path("/heartbeat"));
    }

    #[test]
    fn test_extract_token_bearer() {
        let req = Request::builder()
            .header("Authorization", "Bearer token-123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_token(&req).as_deref(), Some("token-123"));
    }

    #[test]
    fn test_extract_token_api_key_header() {
        let req = Request::builder()
            .header("X-API-Key", "token-123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_token(&req).as_deref(), Some("token-123"));
    }

    #[test]
    fn test_extract_token_missing() {
        let req = Request::builder().body(Body::empty()).unwrap();
        assert!(extract_token(&req).is_none());
    }

    #[test]
    fn test_bearer_wins_over_api_key() {
        let req = Request::builder()
            .header("Authorization", "Bearer first")
            .header("X-API-Key", "second")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_token(&req).as_deref(), Some("first"));
    }
}
