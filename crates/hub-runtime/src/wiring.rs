//! Startup wiring: container construction, sync-loop spawn, serving.

use crate::config::HubConfig;
use crate::core::{initial_sync_status, HubCore, ProjectionConfig};
use fh_01_credentials::CredentialAuthority;
use fh_06_replica_sync::{HttpWriterFeed, SyncConfig, SyncService};
use fh_07_api_gateway::{build_router, AppState, HubMode};
use parking_lot::RwLock;
use shared_types::HubError;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Build everything and serve until the process is stopped.
pub async fn run(config: HubConfig) -> anyhow::Result<()> {
    config.validate()?;
    let authority = Arc::new(CredentialAuthority::new(config.credentials.clone())?);
    let projection = ProjectionConfig {
        registry: config.registry.clone(),
        intake: config.intake.clone(),
    };

    let core: Arc<HubCore> = match config.mode {
        HubMode::Writer => {
            info!(journal = %config.journal_path.display(), "starting hub in writer mode");
            Arc::new(HubCore::open_writer(&config.journal_path, projection)?)
        }
        HubMode::Replica => {
            let writer_address = config
                .writer_address
                .clone()
                .ok_or_else(|| HubError::Config("replica mode without writer address".into()))?;
            info!(writer = %writer_address, "starting hub in replica mode");

            let sync_slot = Arc::new(RwLock::new(initial_sync_status(&writer_address)));
            let core = Arc::new(HubCore::new_replica(projection, Arc::clone(&sync_slot)));

            let feed = HttpWriterFeed::new(
                &writer_address,
                config.writer_token.clone(),
                config.fetch_timeout,
            )?;
            let service = SyncService::resume(
                feed,
                Arc::clone(&core) as Arc<dyn fh_06_replica_sync::EventSink>,
                SyncConfig {
                    writer_address,
                    checkpoint_path: config.checkpoint_path.clone(),
                    interval: config.sync_interval,
                },
            )?;
            *sync_slot.write() = service.status();
            tokio::spawn(service.run(sync_slot));
            core
        }
    };

    let state = AppState::new(core, config.gateway_config());
    let router = build_router(state, authority);

    let addr = SocketAddr::new(config.listen_host, config.listen_port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "gateway listening");
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
