//! HTTP mapping for the shared error taxonomy.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use shared_types::HubError;

/// A structured rejection: stable category + message, mapped to an HTTP
/// status.
#[derive(Debug)]
pub struct ApiRejection(pub HubError);

impl From<HubError> for ApiRejection {
    fn from(err: HubError) -> Self {
        Self(err)
    }
}

impl ApiRejection {
    pub fn status_code(&self) -> StatusCode {
        match self.0 {
            HubError::Auth(_) => StatusCode::UNAUTHORIZED,
            HubError::Conflict(_) => StatusCode::CONFLICT,
            HubError::Integrity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            HubError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            HubError::WriterUnreachable(_) => StatusCode::SERVICE_UNAVAILABLE,
            HubError::ReplicaReadOnly(_) => StatusCode::FORBIDDEN,
            HubError::NotFound(_) => StatusCode::NOT_FOUND,
            HubError::ChainCorruption(_) | HubError::Storage(_) | HubError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiRejection {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "ok": false,
            "error": {
                "category": self.0.category(),
                "message": self.0.to_string(),
            },
        });
        (self.status_code(), Json(body)).into_response()
    }
}
