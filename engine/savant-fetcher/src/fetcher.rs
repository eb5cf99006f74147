use crate::arsenal::build_arsenals;
use crate::config::FetcherConfig;
use crate::error::{FetchError, Result};
use crate::families::{aggregate_arsenal_stats, extract_records, spec_for};
use crate::models::*;
use crate::provider::{ArsenalKind, PlayerRole, ProviderQuery, Row, StatsProvider};
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{info, warn};

/// Hex digits naming the Chadwick register shards
pub const REGISTER_SHARDS: [char; 16] =
    ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f'];

/// Best-effort fetcher for every metric family.
///
/// Provider faults never escape: each fetch resolves to a [`FetchOutcome`] and a
/// failed outcome simply contributes no records downstream.
pub struct SavantFetcher<P: StatsProvider> {
    config: FetcherConfig,
    provider: Arc<P>,
    seasons: Vec<Season>,
}

impl<P: StatsProvider> SavantFetcher<P> {
    /// Create a new fetcher instance
    pub fn new(config: FetcherConfig, provider: Arc<P>) -> Result<Self> {
        config.validate()?;
        let seasons = config.season_list()?;
        Ok(Self { config, provider, seasons })
    }

    /// Seasons in descending priority order
    pub fn seasons(&self) -> &[Season] {
        &self.seasons
    }

    pub fn provider(&self) -> Arc<P> {
        Arc::clone(&self.provider)
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    fn validate_request(&self, season: Season, threshold: u32) -> Result<()> {
        if !self.seasons.contains(&season) {
            return Err(FetchError::invalid_request(format!(
                "season {season} is not one of the configured seasons"
            )));
        }
        if threshold == 0 {
            return Err(FetchError::invalid_request("threshold must be a positive integer"));
        }
        Ok(())
    }

    fn query_for(family: MetricFamily, season: Season, threshold: u32) -> ProviderQuery {
        match family {
            MetricFamily::BatterExpected => {
                ProviderQuery::ExpectedStats { role: PlayerRole::Batter, season, min_pa: threshold }
            }
            MetricFamily::BatterExitVelo => {
                ProviderQuery::ExitVeloBarrels { role: PlayerRole::Batter, season, min_bbe: threshold }
            }
            MetricFamily::SprintSpeed => {
                ProviderQuery::SprintSpeed { season, min_opportunities: threshold }
            }
            MetricFamily::BattingFanGraphs => {
                ProviderQuery::FanGraphsLeaders { role: PlayerRole::Batter, season, qual: threshold }
            }
            MetricFamily::PitcherExpected => {
                ProviderQuery::ExpectedStats { role: PlayerRole::Pitcher, season, min_pa: threshold }
            }
            MetricFamily::PitcherExitVelo => ProviderQuery::ExitVeloBarrels {
                role: PlayerRole::Pitcher,
                season,
                min_bbe: threshold,
            },
            MetricFamily::PitcherArsenalStats => {
                ProviderQuery::ArsenalStats { season, min_pa: threshold }
            }
            MetricFamily::PitchingFanGraphs => ProviderQuery::FanGraphsLeaders {
                role: PlayerRole::Pitcher,
                season,
                qual: threshold,
            },
            MetricFamily::PitcherPercentileRanks => {
                ProviderQuery::PercentileRanks { role: PlayerRole::Pitcher, season }
            }
            MetricFamily::PitchArsenal => ProviderQuery::PitchArsenal {
                season,
                min_pitches: threshold,
                kind: ArsenalKind::AvgSpeed,
            },
        }
    }

    /// Politeness delay, then one query; an empty answer counts as a failure
    async fn rows(&self, query: &ProviderQuery) -> Result<Vec<Row>> {
        sleep(self.config.provider.request_delay()).await;
        let rows = self.provider.query(query).await?;
        if rows.is_empty() {
            return Err(FetchError::EmptyResult(query.to_string()));
        }
        Ok(rows)
    }

    async fn try_fetch(
        &self,
        family: MetricFamily,
        season: Season,
        threshold: u32,
        ids: &dyn IdTranslator,
    ) -> Result<FamilyRecords> {
        self.validate_request(season, threshold)?;
        let rows = self.rows(&Self::query_for(family, season, threshold)).await?;

        let records = match spec_for(family) {
            Some(spec) => match family.namespace() {
                IdNamespace::Mlbam => extract_records(spec, &rows, &MlbamIds),
                IdNamespace::FanGraphs => extract_records(spec, &rows, ids),
            },
            None if family == MetricFamily::PitcherArsenalStats => aggregate_arsenal_stats(&rows),
            None => {
                return Err(FetchError::invalid_request(format!(
                    "{family} is not a row-per-player family"
                )))
            }
        };
        Ok(records)
    }

    /// Fetch one metric family for one season with an explicit threshold.
    ///
    /// `crosswalk` translates FanGraphs IDs; it is ignored for families keyed by MLBAM ID.
    pub async fn fetch_family_with(
        &self,
        family: MetricFamily,
        season: Season,
        threshold: u32,
        crosswalk: &dyn IdTranslator,
    ) -> FetchOutcome {
        info!("Fetching {} for {}", family, season);

        match self.try_fetch(family, season, threshold, crosswalk).await {
            Ok(records) => {
                info!("Got {} for {} players ({})", family, records.len(), season);
                FetchOutcome::fetched(family, season, records)
            }
            Err(e) => {
                warn!("Error fetching {} for {}: {}", family, season, e);
                FetchOutcome::failed(family, season, e)
            }
        }
    }

    /// Fetch one metric family for one season with its configured threshold
    pub async fn fetch_family(
        &self,
        family: MetricFamily,
        season: Season,
        crosswalk: &dyn IdTranslator,
    ) -> FetchOutcome {
        let threshold = self.config.thresholds.for_family(family);
        self.fetch_family_with(family, season, threshold, crosswalk).await
    }

    async fn try_fetch_arsenals(&self, season: Season, min_pitches: u32) -> Result<ArsenalRecords> {
        self.validate_request(season, min_pitches)?;

        let speed = self
            .rows(&ProviderQuery::PitchArsenal { season, min_pitches, kind: ArsenalKind::AvgSpeed })
            .await?;
        let usage = self
            .rows(&ProviderQuery::PitchArsenal { season, min_pitches, kind: ArsenalKind::Usage })
            .await?;

        // Spin is optional; the arsenal stands without it
        let spin = match self
            .rows(&ProviderQuery::PitchArsenal { season, min_pitches, kind: ArsenalKind::AvgSpin })
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                warn!("No spin data for {}: {}", season, e);
                Vec::new()
            }
        };

        info!("Retrieved {} pitchers for {}", speed.len(), season);
        Ok(build_arsenals(&speed, &usage, &spin))
    }

    /// Fetch the shaped pitch arsenals of one season
    pub async fn fetch_pitch_arsenals(&self, season: Season) -> FetchOutcome<ArsenalRecords> {
        let family = MetricFamily::PitchArsenal;
        let min_pitches = self.config.thresholds.for_family(family);
        info!("Fetching {} for {}", family, season);

        match self.try_fetch_arsenals(season, min_pitches).await {
            Ok(arsenals) => {
                info!("Processed {} pitchers for {}", arsenals.len(), season);
                FetchOutcome::fetched(family, season, arsenals)
            }
            Err(e) => {
                warn!("Error fetching {} for {}: {}", family, season, e);
                FetchOutcome::failed(family, season, e)
            }
        }
    }

    /// Fetch every Chadwick register shard; failing shards are skipped
    pub async fn fetch_register(&self) -> Vec<Row> {
        let mut rows = Vec::new();
        for shard in REGISTER_SHARDS {
            match self.rows(&ProviderQuery::RegisterShard { shard }).await {
                Ok(shard_rows) => rows.extend(shard_rows),
                Err(e) => warn!("Skipping register shard {}: {}", shard, e),
            }
        }
        info!("Loaded {} register rows", rows.len());
        rows
    }
}
