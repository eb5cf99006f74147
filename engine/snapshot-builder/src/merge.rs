//! Per-season merge of independent metric families

use crate::records::{SeasonRecord, SeasonSources};
use savant_fetcher::{FetchOutcome, PlayerId, Season};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Merged records of one season, keyed by player
pub type SeasonRecords<R> = BTreeMap<PlayerId, R>;

/// Merged records of every season
pub type YearlyRecords<R> = BTreeMap<Season, SeasonRecords<R>>;

/// Merge one season's fetch outcomes into one record per player.
///
/// Every player seen by at least one contributing family gets a record;
/// failed families simply contribute nothing.
pub fn merge_season<R: SeasonRecord>(season: Season, outcomes: &[FetchOutcome]) -> SeasonRecords<R> {
    let sources = SeasonSources::new(season, outcomes);
    debug!("{} of {} families delivered data for {}", sources.delivered(), R::FAMILIES.len(), season);

    let merged: SeasonRecords<R> = sources
        .player_ids(R::FAMILIES)
        .into_iter()
        .map(|player| (player, R::assemble(&sources, player)))
        .collect();

    info!("Combined {} players for {}", merged.len(), season);
    merged
}
