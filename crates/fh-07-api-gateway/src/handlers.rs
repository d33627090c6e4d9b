//! HTTP handlers over the `HubApi` port.

use crate::error::ApiRejection;
use crate::router::AppState;
use axum::extract::{Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use shared_types::events::headers;
use shared_types::{HeartbeatObservation, HubError, ResultSubmission, SubmitRequest};

/// `GET /health` — public liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({"ok": true, "status": "alive"}))
}

/// `POST /heartbeat`
pub async fn heartbeat(
    State(state): State<AppState>,
    Json(observation): Json<HeartbeatObservation>,
) -> Result<Json<Value>, ApiRejection> {
    state.guard_mutating()?;
    let reply = state.hub.heartbeat(observation)?;
    Ok(Json(json!({
        "ok": true,
        "attestation_status": reply.attestation_status,
        "health": reply.health,
    })))
}

/// `GET /registry`
pub async fn registry(State(state): State<AppState>) -> Result<Json<Value>, ApiRejection> {
    let nodes = state.hub.registry()?;
    Ok(Json(json!({"ok": true, "nodes": nodes})))
}

/// `POST /submit_request`
pub async fn submit_request(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<Value>, ApiRejection> {
    state.guard_mutating()?;
    let outcome = state.hub.submit_request(request)?;

    let mut body = serde_json::to_value(&outcome).map_err(HubError::from)?;
    if let Value::Object(map) = &mut body {
        map.insert("ok".into(), Value::Bool(true));
    }
    Ok(Json(body))
}

/// `POST /submit_result`
pub async fn submit_result(
    State(state): State<AppState>,
    Json(submission): Json<ResultSubmission>,
) -> Result<Json<Value>, ApiRejection> {
    state.guard_mutating()?;
    state.hub.submit_result(submission)?;
    Ok(Json(json!({"ok": true})))
}

#[derive(Debug, Deserialize)]
pub struct JournalQuery {
    #[serde(default)]
    pub offset: u64,
}

/// `GET /journal?offset=N` — raw newline-delimited records, metadata in
/// response headers.
pub async fn journal(
    State(state): State<AppState>,
    Query(query): Query<JournalQuery>,
) -> Result<Response, ApiRejection> {
    let view = state.hub.journal_chunk(query.offset)?;

    let mut response = (StatusCode::OK, view.bytes).into_response();
    let response_headers = response.headers_mut();
    response_headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/x-ndjson"),
    );
    insert_header(response_headers, headers::NEXT_OFFSET, &view.next_offset.to_string());
    insert_header(
        response_headers,
        headers::JOURNAL_SIZE,
        &view.journal_size_bytes.to_string(),
    );
    if let Some(hash) = &view.last_hash {
        insert_header(response_headers, headers::LAST_HASH, hash);
    }
    if let Some(ts) = view.last_timestamp {
        insert_header(response_headers, headers::LAST_TIMESTAMP, &ts.to_string());
    }
    Ok(response)
}

/// `GET /writer_status`
pub async fn writer_status(State(state): State<AppState>) -> Result<Json<Value>, ApiRejection> {
    let status = state.hub.writer_status()?;
    Ok(Json(serde_json::to_value(&status).map_err(HubError::from)?))
}

fn insert_header(map: &mut axum::http::HeaderMap, name: &'static str, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        map.insert(name, value);
    }
}
