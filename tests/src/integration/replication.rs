//! Writer → replica replay: a replica syncing a real writer journal ends
//! with identical derived state, and checkpoint resume neither duplicates
//! nor skips events.

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use fh_06_replica_sync::{
        EventSink, FeedChunk, SyncConfig, SyncService, TickReport, WriterFeed,
    };
    use fh_07_api_gateway::HubApi;
    use hub_runtime::core::{initial_sync_status, HubCore, ProjectionConfig};
    use parking_lot::RwLock;
    use serde_json::json;
    use shared_types::canon;
    use shared_types::{
        AttestationFingerprint, HeartbeatObservation, IntegritySpec, ResultSubmission,
        SubmitRequest,
    };
    use std::sync::Arc;
    use std::time::Duration;

    /// Feed that serves ranges straight off a writer core, exactly like
    /// the HTTP adapter does off the journal endpoint.
    struct CoreFeed {
        writer: Arc<HubCore>,
    }

    #[async_trait]
    impl WriterFeed for CoreFeed {
        async fn fetch(&self, offset: u64) -> Result<FeedChunk, shared_types::HubError> {
            let view = self.writer.journal_chunk(offset)?;
            Ok(FeedChunk {
                bytes: view.bytes,
                next_offset: view.next_offset,
                last_hash: view.last_hash,
                last_timestamp: view.last_timestamp,
                writer_size_bytes: view.journal_size_bytes,
            })
        }
    }

    fn writer_core(dir: &tempfile::TempDir) -> Arc<HubCore> {
        Arc::new(
            HubCore::open_writer(dir.path().join("journal.log"), ProjectionConfig::default())
                .unwrap(),
        )
    }

    fn replica_core() -> Arc<HubCore> {
        let slot = Arc::new(RwLock::new(initial_sync_status("core://writer")));
        Arc::new(HubCore::new_replica(ProjectionConfig::default(), slot))
    }

    fn sync_config(dir: &tempfile::TempDir) -> SyncConfig {
        SyncConfig {
            writer_address: "core://writer".into(),
            checkpoint_path: dir.path().join("checkpoint.json"),
            interval: Duration::from_millis(10),
        }
    }

    fn populate_writer(writer: &HubCore) -> String {
        for build in ["f1", "f2"] {
            writer
                .heartbeat(HeartbeatObservation {
                    node_id: "node-A".into(),
                    health: None,
                    attestation: Some(AttestationFingerprint {
                        build_id: build.into(),
                        capability_hash: format!("caps-{build}"),
                        runtime_descriptor: "linux".into(),
                    }),
                    current_jobs: None,
                })
                .unwrap();
        }

        let outcome = writer
            .submit_request(SubmitRequest {
                idempotency_key: "k1".into(),
                kind: "run".into(),
                params: json!({"x": 1}),
            })
            .unwrap();

        let result = Some(json!({"v": 42}));
        let error = None;
        writer
            .submit_result(ResultSubmission {
                result_id: "res-1".into(),
                job_id: outcome.job_id.clone(),
                ok: true,
                integrity: IntegritySpec {
                    mode: "sha256".into(),
                    digest: canon::result_digest(&outcome.job_id, true, &result, &error),
                },
                result,
                error,
            })
            .unwrap();
        outcome.job_id
    }

    async fn sync_until_caught_up<F: WriterFeed>(service: &mut SyncService<F>) {
        for _ in 0..500 {
            if service.tick().await.unwrap() == TickReport::CaughtUp {
                return;
            }
        }
        panic!("replica never caught up");
    }

    #[tokio::test]
    async fn test_replica_reaches_writer_state() {
        let writer_dir = tempfile::tempdir().unwrap();
        let replica_dir = tempfile::tempdir().unwrap();

        let writer = writer_core(&writer_dir);
        populate_writer(&writer);

        let replica = replica_core();
        let mut service = SyncService::resume(
            CoreFeed {
                writer: Arc::clone(&writer),
            },
            Arc::clone(&replica) as Arc<dyn EventSink>,
            sync_config(&replica_dir),
        )
        .unwrap();
        sync_until_caught_up(&mut service).await;

        // Derived state equality, checked via the same snapshots the
        // checkpoint persists.
        assert_eq!(writer.snapshot().unwrap(), replica.snapshot().unwrap());

        // And via the public read surface.
        let writer_registry = writer.registry().unwrap();
        let replica_registry = replica.registry().unwrap();
        assert_eq!(writer_registry, replica_registry);

        let status = service.status();
        assert_eq!(status.total_events_synced, 4);
        assert_eq!(status.lag_bytes, 0);
        assert!(!status.halted);
    }

    #[tokio::test]
    async fn test_checkpoint_restart_neither_duplicates_nor_skips() {
        let writer_dir = tempfile::tempdir().unwrap();
        let replica_dir = tempfile::tempdir().unwrap();

        let writer = writer_core(&writer_dir);
        populate_writer(&writer);

        // First replica session syncs everything, then goes away.
        {
            let replica = replica_core();
            let mut service = SyncService::resume(
                CoreFeed {
                    writer: Arc::clone(&writer),
                },
                Arc::clone(&replica) as Arc<dyn EventSink>,
                sync_config(&replica_dir),
            )
            .unwrap();
            sync_until_caught_up(&mut service).await;
        }

        // Writer keeps moving while the replica is down.
        writer
            .heartbeat(HeartbeatObservation {
                node_id: "node-B".into(),
                health: None,
                attestation: None,
                current_jobs: None,
            })
            .unwrap();

        // Second session restores the snapshot and picks up only the new
        // event.
        let replica = replica_core();
        let mut service = SyncService::resume(
            CoreFeed {
                writer: Arc::clone(&writer),
            },
            Arc::clone(&replica) as Arc<dyn EventSink>,
            sync_config(&replica_dir),
        )
        .unwrap();

        assert_eq!(service.tick().await.unwrap(), TickReport::Applied { events: 1 });
        assert_eq!(service.status().total_events_synced, 5);
        assert_eq!(writer.snapshot().unwrap(), replica.snapshot().unwrap());

        // Dedup state replicated: the replica knows k1 without ever
        // having handled the submission.
        let record = replica.registry().unwrap();
        assert!(record.contains_key("node-A"));
        assert!(record.contains_key("node-B"));
    }

    #[tokio::test]
    async fn test_replica_serves_while_writer_grows() {
        let writer_dir = tempfile::tempdir().unwrap();
        let replica_dir = tempfile::tempdir().unwrap();

        let writer = writer_core(&writer_dir);
        populate_writer(&writer);

        let replica = replica_core();
        let mut service = SyncService::resume(
            CoreFeed {
                writer: Arc::clone(&writer),
            },
            Arc::clone(&replica) as Arc<dyn EventSink>,
            sync_config(&replica_dir),
        )
        .unwrap();
        sync_until_caught_up(&mut service).await;

        // New writer events appear on the replica after the next ticks.
        writer
            .submit_request(SubmitRequest {
                idempotency_key: "k2".into(),
                kind: "run".into(),
                params: json!({"y": 2}),
            })
            .unwrap();
        sync_until_caught_up(&mut service).await;

        assert_eq!(writer.snapshot().unwrap(), replica.snapshot().unwrap());
    }
}
