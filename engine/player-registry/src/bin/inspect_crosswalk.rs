use player_registry::{display_name, IdentityCrosswalk, NameResolver};
use savant_fetcher::{FetcherConfig, SavantClient, SavantFetcher};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Inspecting player ID crosswalk...");

    let config = FetcherConfig::load(Some(Path::new("savant.toml")))?;
    let client = Arc::new(SavantClient::new(config.provider.clone())?);
    let request_delay = config.provider.request_delay();
    let fetcher = SavantFetcher::new(config, Arc::clone(&client))?;

    let crosswalk = IdentityCrosswalk::load(&fetcher).await;
    info!("Crosswalk loaded with {} FanGraphs IDs", crosswalk.len());

    // FanGraphs IDs to look up, defaulting to a few well-known players
    let mut fangraphs_ids: Vec<i64> =
        std::env::args().skip(1).filter_map(|arg| arg.parse().ok()).collect();
    if fangraphs_ids.is_empty() {
        fangraphs_ids = vec![15640, 13611, 19755];
    }

    let mlbam_ids: Vec<_> = fangraphs_ids.iter().map(|id| crosswalk.lookup(*id)).collect();
    let names = NameResolver::new(client, 200)?
        .with_request_delay(request_delay)
        .resolve(mlbam_ids.iter().copied())
        .await;

    println!("\nFanGraphs ID  MLBAM ID  Name");
    println!("------------------------------------------");
    for (fangraphs_id, mlbam_id) in fangraphs_ids.iter().zip(&mlbam_ids) {
        if *mlbam_id == 0 {
            println!("{:12}  {:>8}  -", fangraphs_id, "unmapped");
        } else {
            println!("{:12}  {:8}  {}", fangraphs_id, mlbam_id, display_name(&names, *mlbam_id));
        }
    }

    info!("Crosswalk inspection completed");
    Ok(())
}
