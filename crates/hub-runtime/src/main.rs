//! Fleet-Hub binary entry point.

use anyhow::Context;
use hub_runtime::{run, HubConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = HubConfig::from_env().context("loading configuration from environment")?;
    run(config).await
}
