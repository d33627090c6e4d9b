//! Full HTTP round trips: real router, real middleware, real journal-backed
//! core behind the `HubApi` port.

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use fh_01_credentials::{CredentialAuthority, CredentialConfig};
    use fh_07_api_gateway::{build_router, AppState, GatewayConfig};
    use hub_runtime::core::{HubCore, ProjectionConfig};
    use serde_json::{json, Value};
    use shared_types::canon;
    use shared_types::events::headers;
    use std::sync::Arc;
    use tower::ServiceExt;

    const SECRET: &str = "fleet-secret";

    fn writer_router(dir: &tempfile::TempDir) -> Router {
        let core = Arc::new(
            HubCore::open_writer(dir.path().join("journal.log"), ProjectionConfig::default())
                .unwrap(),
        );
        let authority = Arc::new(
            CredentialAuthority::new(CredentialConfig {
                legacy_secret: Some(SECRET.into()),
                enforce: true,
                ..Default::default()
            })
            .unwrap(),
        );
        build_router(
            AppState::new(core, GatewayConfig::default()),
            authority,
        )
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {SECRET}"))
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("x-api-key", SECRET)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_heartbeat_then_registry_over_http() {
        let dir = tempfile::tempdir().unwrap();
        let router = writer_router(&dir);

        let response = router
            .clone()
            .oneshot(post(
                "/heartbeat",
                json!({
                    "node_id": "node-A",
                    "attestation": {
                        "build_id": "b1",
                        "capability_hash": "c1",
                        "runtime_descriptor": "linux",
                    },
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["attestation_status"], json!("OK"));

        let response = router.oneshot(get("/registry")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["nodes"]["node-A"]["health"], json!("GREEN"));
        assert_eq!(
            body["nodes"]["node-A"]["attestation"]["status"],
            json!("OK")
        );
    }

    #[tokio::test]
    async fn test_submission_conflict_is_structured() {
        let dir = tempfile::tempdir().unwrap();
        let router = writer_router(&dir);

        let first = router
            .clone()
            .oneshot(post(
                "/submit_request",
                json!({"idempotency_key": "k1", "kind": "run", "params": {"x": 1}}),
            ))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        let first = body_json(first).await;
        assert_eq!(first["dedup"], json!(false));

        let conflict = router
            .oneshot(post(
                "/submit_request",
                json!({"idempotency_key": "k1", "kind": "run", "params": {"x": 2}}),
            ))
            .await
            .unwrap();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);
        let conflict = body_json(conflict).await;
        assert_eq!(conflict["ok"], json!(false));
        assert_eq!(conflict["error"]["category"], json!("conflict"));
    }

    #[tokio::test]
    async fn test_result_rejection_is_structured() {
        let dir = tempfile::tempdir().unwrap();
        let router = writer_router(&dir);

        let accepted = router
            .clone()
            .oneshot(post(
                "/submit_request",
                json!({"idempotency_key": "k1", "kind": "run", "params": {}}),
            ))
            .await
            .unwrap();
        let job_id = body_json(accepted).await["job_id"]
            .as_str()
            .unwrap()
            .to_string();

        // Digest computed over different content than submitted.
        let stale_digest = canon::result_digest(&job_id, true, &Some(json!({"v": 1})), &None);
        let response = router
            .clone()
            .oneshot(post(
                "/submit_result",
                json!({
                    "result_id": "res-1",
                    "job_id": job_id,
                    "ok": true,
                    "result": {"v": 2},
                    "error": null,
                    "integrity": {"mode": "sha256", "digest": stale_digest},
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["category"], json!("integrity"));

        // The rejection is observable in writer status.
        let status = body_json(router.oneshot(get("/writer_status")).await.unwrap()).await;
        assert_eq!(status["integrity_rejections"], json!(1));
        assert_eq!(status["status"], json!("writer"));
    }

    #[tokio::test]
    async fn test_journal_endpoint_streams_records_with_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let router = writer_router(&dir);

        router
            .clone()
            .oneshot(post("/heartbeat", json!({"node_id": "node-A"})))
            .await
            .unwrap();

        let response = router.oneshot(get("/journal?offset=0")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let next_offset: u64 = response
            .headers()
            .get(headers::NEXT_OFFSET)
            .unwrap()
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!(next_offset > 0);
        assert!(response.headers().contains_key(headers::LAST_HASH));
        assert!(response.headers().contains_key(headers::JOURNAL_SIZE));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(bytes.len() as u64, next_offset);
        // The body is one complete newline-terminated record.
        assert_eq!(bytes.last(), Some(&b'\n'));
        let record: Value = serde_json::from_slice(&bytes[..bytes.len() - 1]).unwrap();
        assert_eq!(record["type"], json!("node_heartbeat"));
    }

    #[tokio::test]
    async fn test_missing_credential_rejected_everywhere_but_health() {
        let dir = tempfile::tempdir().unwrap();
        let router = writer_router(&dir);

        let health = router
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(health.status(), StatusCode::OK);

        for uri in ["/registry", "/writer_status", "/journal?offset=0"] {
            let response = router
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
    }
}
