use anyhow::Context;
use savant_fetcher::SavantClient;
use snapshot_builder::{logging, BuilderConfig, SnapshotPipeline};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = BuilderConfig::load_default().context("Failed to load configuration")?;
    logging::initialize_from_config(&config.logging)?;

    info!("Fetching pitch arsenals for seasons {:?}", config.fetcher.seasons);

    let client = SavantClient::new(config.fetcher.provider.clone())
        .context("Failed to create provider client")?;
    let pipeline = SnapshotPipeline::new(config, Arc::new(client))?;

    let snapshot = pipeline.run_arsenals().await?;
    info!("Done: {} pitchers with arsenals", snapshot.len());

    Ok(())
}
