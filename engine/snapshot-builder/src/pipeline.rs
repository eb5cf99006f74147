//! End-to-end snapshot runs: fetch, merge, enrich, aggregate, name, write

use crate::aggregate::{build_histories, PlayerHistory};
use crate::config::BuilderConfig;
use crate::enrich::{enrich_chase, enrich_fastballs};
use crate::error::Result;
use crate::merge::{merge_season, YearlyRecords};
use crate::quality::QualityReport;
use crate::records::{BatterSeasonStats, PitcherSeasonStats, SeasonRecord};
use crate::snapshot::{ArsenalSchema, BatterSchema, PitcherSchema, Snapshot, SnapshotSchema};
use player_registry::{IdentityCrosswalk, NameResolver};
use savant_fetcher::{
    IdNamespace, MetricFamily, MlbamIds, PlayerId, SavantFetcher, Season, StatsProvider,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{info, warn};

/// Number of entries logged after a snapshot is written
const SAMPLE_ENTRIES: usize = 5;

/// Builds and writes the batter, pitcher and pitch-arsenal snapshots
pub struct SnapshotPipeline<P: StatsProvider> {
    config: BuilderConfig,
    fetcher: SavantFetcher<P>,
}

impl<P: StatsProvider> SnapshotPipeline<P> {
    /// Create a new pipeline; fails only on invalid configuration
    pub fn new(config: BuilderConfig, provider: Arc<P>) -> Result<Self> {
        config.validate()?;
        let fetcher = SavantFetcher::new(config.fetcher.clone(), provider)?;
        Ok(Self { config, fetcher })
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    fn seasons(&self) -> &[Season] {
        self.fetcher.seasons()
    }

    /// Crosswalk for records that need one; an empty crosswalk otherwise
    async fn crosswalk_for<R: SeasonRecord>(&self) -> IdentityCrosswalk {
        if R::FAMILIES.iter().any(|family| family.namespace() == IdNamespace::FanGraphs) {
            IdentityCrosswalk::load(&self.fetcher).await
        } else {
            IdentityCrosswalk::new()
        }
    }

    /// Fetch every family of `R` for every season and merge season by season
    async fn merge_all<R: SeasonRecord>(&self, crosswalk: &IdentityCrosswalk) -> YearlyRecords<R> {
        let mut yearly = YearlyRecords::new();

        for season in self.seasons() {
            info!("Fetching {} data...", season);
            let mut outcomes = Vec::with_capacity(R::FAMILIES.len());
            for family in R::FAMILIES {
                outcomes.push(self.fetcher.fetch_family(*family, *season, crosswalk).await);
            }
            yearly.insert(*season, merge_season::<R>(*season, &outcomes));
        }

        yearly
    }

    async fn assemble<S: SnapshotSchema>(
        &self,
        source: &str,
        histories: &BTreeMap<PlayerId, PlayerHistory<S::Record>>,
    ) -> Result<Snapshot<S>> {
        let names = NameResolver::new(self.fetcher.provider(), self.config.name_batch_size)?
            .with_request_delay(self.config.fetcher.provider.request_delay())
            .resolve(histories.keys().copied())
            .await;

        Ok(Snapshot::from_histories(source, self.seasons(), histories, &names))
    }

    /// Batter snapshot: expected stats, exit velocity, sprint speed and FanGraphs rates
    pub async fn build_batters(&self) -> Result<Snapshot<BatterSchema>> {
        let crosswalk = self.crosswalk_for::<BatterSeasonStats>().await;
        let yearly = self.merge_all::<BatterSeasonStats>(&crosswalk).await;
        let histories = build_histories(self.seasons(), &yearly, []);

        self.assemble(&self.config.sources.batter, &histories).await
    }

    /// Patch fastball velocity/extension from the arsenal snapshot, if one exists
    fn enrich_from_arsenals(&self, yearly: &mut YearlyRecords<PitcherSeasonStats>) -> BTreeSet<PlayerId> {
        let path = self.config.output.arsenal_path();
        match Snapshot::<ArsenalSchema>::read(&path) {
            Ok(arsenals) => {
                info!("Enriching with {} ({} pitchers)...", path.display(), arsenals.len());
                enrich_fastballs(yearly, &arsenals)
            }
            Err(e) if e.is_not_found() => {
                info!("{} not found, skipping fastball enrichment", path.display());
                BTreeSet::new()
            }
            Err(e) => {
                warn!("Could not read {}: {}", path.display(), e);
                BTreeSet::new()
            }
        }
    }

    /// Back-fill missing chase rates from each season's percentile ranks
    async fn enrich_chase_rates(&self, yearly: &mut YearlyRecords<PitcherSeasonStats>) {
        info!("Enriching missing chase% from percentile ranks...");
        let mut filled = 0;

        for season in self.seasons() {
            let Some(records) = yearly.get_mut(season) else {
                continue;
            };
            let percentiles = self
                .fetcher
                .fetch_family(MetricFamily::PitcherPercentileRanks, *season, &MlbamIds)
                .await;
            filled += enrich_chase(records, &percentiles, &self.config.chase);
        }

        info!("Enriched {} additional chase% entries from percentile ranks", filled);
    }

    /// Pitcher snapshot: merged families plus fastball and chase enrichment
    pub async fn build_pitchers(&self) -> Result<Snapshot<PitcherSchema>> {
        let crosswalk = self.crosswalk_for::<PitcherSeasonStats>().await;
        let mut yearly = self.merge_all::<PitcherSeasonStats>(&crosswalk).await;

        let arsenal_pitchers = self.enrich_from_arsenals(&mut yearly);
        self.enrich_chase_rates(&mut yearly).await;

        let histories = build_histories(self.seasons(), &yearly, arsenal_pitchers);
        self.assemble(&self.config.sources.pitcher, &histories).await
    }

    /// Pitch-arsenal snapshot: shaped arsenals per pitcher and season
    pub async fn build_arsenals(&self) -> Result<Snapshot<ArsenalSchema>> {
        let mut yearly = YearlyRecords::new();
        for season in self.seasons() {
            let outcome = self.fetcher.fetch_pitch_arsenals(*season).await;
            yearly.insert(*season, outcome.into_data().unwrap_or_default());
        }

        let histories = build_histories(self.seasons(), &yearly, []);
        self.assemble(&self.config.sources.arsenal, &histories).await
    }

    pub async fn run_batters(&self) -> Result<Snapshot<BatterSchema>> {
        let snapshot = self.build_batters().await?;
        snapshot.write(&self.config.output.batter_path())?;

        QualityReport::for_snapshot(&snapshot).log();
        for entry in snapshot.entries.values().take(SAMPLE_ENTRIES) {
            let stats = &entry.current;
            info!("  {} (ID: {})", entry.name, entry.mlb_id);
            info!("    xwOBA: {}, xBA: {}, xSLG: {}", stats.xwoba, stats.xba, stats.xslg);
            info!(
                "    Avg EV: {}, Barrel%: {}, HH%: {}",
                stats.avg_exit_velo, stats.barrel_pct, stats.hard_hit_pct
            );
            info!("    Sprint: {}, K%: {}, BB%: {}", stats.sprint_speed, stats.k_pct, stats.bb_pct);
        }

        Ok(snapshot)
    }

    pub async fn run_pitchers(&self) -> Result<Snapshot<PitcherSchema>> {
        let snapshot = self.build_pitchers().await?;
        snapshot.write(&self.config.output.pitcher_path())?;

        QualityReport::for_snapshot(&snapshot).log();
        for entry in snapshot.entries.values().take(SAMPLE_ENTRIES) {
            let stats = &entry.current;
            info!("  {} (ID: {})", entry.name, entry.mlb_id);
            info!("    xERA: {}, xwOBA: {}, K%: {}, BB%: {}", stats.xera, stats.xwoba, stats.k_pct, stats.bb_pct);
            info!("    Whiff%: {}, Chase%: {}, GB%: {}", stats.whiff_pct, stats.chase_pct, stats.gb_pct);
            info!("    FB Velo: {}, EV Against: {}", stats.fastball_velo, stats.avg_exit_velo_against);
        }

        Ok(snapshot)
    }

    pub async fn run_arsenals(&self) -> Result<Snapshot<ArsenalSchema>> {
        let snapshot = self.build_arsenals().await?;
        snapshot.write(&self.config.output.arsenal_path())?;

        for entry in snapshot.entries.values().take(SAMPLE_ENTRIES) {
            let years: Vec<String> = entry.history.keys().rev().map(|season| season.key()).collect();
            let leading: Vec<&str> =
                entry.current.iter().take(2).map(|pitch| pitch.pitch_type.as_str()).collect();
            info!("  {} (ID: {})", entry.name, entry.mlb_id);
            info!("    Years: {:?}, leading pitches: {:?}", years, leading);
        }

        Ok(snapshot)
    }
}
