//! Writer-mode flows exercised on a live `HubCore` with a real journal
//! file: the attestation scenario, dedup semantics, and result integrity
//! all working against the same durable event stream.

#[cfg(test)]
mod tests {
    use fh_07_api_gateway::HubApi;
    use hub_runtime::core::{HubCore, ProjectionConfig};
    use serde_json::json;
    use shared_types::canon;
    use shared_types::{
        AttestationFingerprint, AttestationStatus, HeartbeatObservation, IntegritySpec,
        NodeHealth, RequestStatus, ResultSubmission, SubmitRequest,
    };

    fn writer_core(dir: &tempfile::TempDir) -> HubCore {
        HubCore::open_writer(dir.path().join("journal.log"), ProjectionConfig::default()).unwrap()
    }

    fn heartbeat_with(node: &str, build: &str) -> HeartbeatObservation {
        HeartbeatObservation {
            node_id: node.into(),
            health: None,
            attestation: Some(AttestationFingerprint {
                build_id: build.into(),
                capability_hash: format!("caps-{build}"),
                runtime_descriptor: "linux/x86_64".into(),
            }),
            current_jobs: None,
        }
    }

    fn signed_result(result_id: &str, job_id: &str, value: serde_json::Value) -> ResultSubmission {
        let result = Some(value);
        let error = None;
        ResultSubmission {
            result_id: result_id.into(),
            job_id: job_id.into(),
            ok: true,
            integrity: IntegritySpec {
                mode: "sha256".into(),
                digest: canon::result_digest(job_id, true, &result, &error),
            },
            result,
            error,
        }
    }

    #[test]
    fn test_attestation_scenario_on_live_core() {
        // [F1, F1, F2, F3, F4] → [OK, OK, DRIFT, DRIFT, SPOOF_SUSPECT],
        // this time through the journal-backed core rather than the bare
        // table.
        let dir = tempfile::tempdir().unwrap();
        let core = writer_core(&dir);

        let expected = [
            AttestationStatus::Ok,
            AttestationStatus::Ok,
            AttestationStatus::Drift,
            AttestationStatus::Drift,
            AttestationStatus::SpoofSuspect,
        ];
        for (build, want) in ["f1", "f1", "f2", "f3", "f4"].iter().zip(expected.iter()) {
            let reply = core.heartbeat(heartbeat_with("node-A", build)).unwrap();
            assert_eq!(reply.attestation_status, *want);
        }

        let registry = core.registry().unwrap();
        assert_eq!(registry["node-A"].health, NodeHealth::Red);
        assert_eq!(core.writer_status().unwrap().total_events, 5);
    }

    #[test]
    fn test_missing_attestation_never_fails_the_call() {
        let dir = tempfile::tempdir().unwrap();
        let core = writer_core(&dir);

        let reply = core
            .heartbeat(HeartbeatObservation {
                node_id: "node-B".into(),
                health: Some(NodeHealth::Green),
                attestation: None,
                current_jobs: None,
            })
            .unwrap();
        assert_eq!(reply.attestation_status, AttestationStatus::Missing);
        assert_eq!(reply.health, NodeHealth::Green);
    }

    #[test]
    fn test_full_job_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let core = writer_core(&dir);

        // Accept a request.
        let outcome = core
            .submit_request(SubmitRequest {
                idempotency_key: "k-lifecycle".into(),
                kind: "run".into(),
                params: json!({"cmd": "echo", "args": ["hi"]}),
            })
            .unwrap();
        assert_eq!(outcome.status, RequestStatus::Accepted);

        // Worker submits a digest-verified result, which completes the job.
        core.submit_result(signed_result("res-1", &outcome.job_id, json!({"stdout": "hi"})))
            .unwrap();

        // Dedup resubmission replays the completed job with the cached
        // result, no recomputation.
        let replay = core
            .submit_request(SubmitRequest {
                idempotency_key: "k-lifecycle".into(),
                kind: "run".into(),
                params: json!({"args": ["hi"], "cmd": "echo"}),
            })
            .unwrap();
        assert!(replay.dedup);
        assert_eq!(replay.status, RequestStatus::Completed);
        assert_eq!(replay.result.unwrap()["result"]["stdout"], json!("hi"));

        // Tampered resubmission of the result is rejected and counted.
        let mut tampered = signed_result("res-2", &outcome.job_id, json!({"stdout": "hi"}));
        tampered.result = Some(json!({"stdout": "evil"}));
        let err = core.submit_result(tampered).unwrap_err();
        assert_eq!(err.category(), "integrity");
        assert_eq!(core.writer_status().unwrap().integrity_rejections, 1);
    }

    #[test]
    fn test_lifecycle_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let job_id;
        {
            let core = writer_core(&dir);
            core.heartbeat(heartbeat_with("node-A", "f1")).unwrap();
            let outcome = core
                .submit_request(SubmitRequest {
                    idempotency_key: "k1".into(),
                    kind: "run".into(),
                    params: json!({"x": 1}),
                })
                .unwrap();
            job_id = outcome.job_id.clone();
            core.submit_result(signed_result("res-1", &job_id, json!({"v": 7})))
                .unwrap();
        }

        // Reopen: registry, dedup record, and cached result all rebuilt
        // from the journal alone.
        let core = writer_core(&dir);
        assert!(core.registry().unwrap().contains_key("node-A"));
        let replay = core
            .submit_request(SubmitRequest {
                idempotency_key: "k1".into(),
                kind: "run".into(),
                params: json!({"x": 1}),
            })
            .unwrap();
        assert!(replay.dedup);
        assert_eq!(replay.job_id, job_id);
        assert_eq!(replay.status, RequestStatus::Completed);
        assert_eq!(replay.result.unwrap()["result"]["v"], json!(7));
    }
}
