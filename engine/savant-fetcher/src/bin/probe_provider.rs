use savant_fetcher::{
    ArsenalKind, FetcherConfig, PlayerRole, ProviderQuery, SavantClient, StatsProvider,
};
use std::path::Path;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("Probing statistics providers");

    let config = FetcherConfig::load(Some(Path::new("savant.toml")))?;
    let season = config.season_list()?[0];
    let client = SavantClient::new(config.provider.clone())?;
    info!("Created client, probing season {}", season);

    let queries = [
        ProviderQuery::ExpectedStats { role: PlayerRole::Batter, season, min_pa: 100 },
        ProviderQuery::ExitVeloBarrels { role: PlayerRole::Pitcher, season, min_bbe: 30 },
        ProviderQuery::SprintSpeed { season, min_opportunities: 10 },
        ProviderQuery::ArsenalStats { season, min_pa: 20 },
        ProviderQuery::PercentileRanks { role: PlayerRole::Pitcher, season },
        ProviderQuery::PitchArsenal { season, min_pitches: 100, kind: ArsenalKind::Usage },
        ProviderQuery::FanGraphsLeaders { role: PlayerRole::Batter, season, qual: 1 },
        ProviderQuery::RegisterShard { shard: '0' },
    ];

    for query in &queries {
        match client.query(query).await {
            Ok(rows) => {
                let columns: Vec<&str> = rows
                    .first()
                    .map(|row| row.keys().map(String::as_str).take(8).collect())
                    .unwrap_or_default();
                info!("{}: {} rows, columns {:?}", query, rows.len(), columns);
            }
            Err(e) => error!("{}: {}", query, e),
        }
        tokio::time::sleep(config.provider.request_delay()).await;
    }

    info!("Probe completed");
    Ok(())
}
