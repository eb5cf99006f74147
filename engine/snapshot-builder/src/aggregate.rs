//! Cross-season aggregation into per-player histories

use crate::merge::YearlyRecords;
use savant_fetcher::{PlayerId, Season};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// A player's records across seasons
///
/// The current record is not stored separately; it is always the history entry
/// of the highest-priority season present, so the two cannot drift apart.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerHistory<R> {
    player_id: PlayerId,
    current_season: Season,
    history: BTreeMap<Season, R>,
}

impl<R> PlayerHistory<R> {
    /// Build a history; `None` when the player has no season at all.
    ///
    /// `seasons` is the priority order (most recent first). History entries for
    /// seasons outside that list are kept but never chosen as current.
    pub fn new(player_id: PlayerId, seasons: &[Season], history: BTreeMap<Season, R>) -> Option<Self> {
        let current_season = seasons.iter().copied().find(|season| history.contains_key(season))?;
        Some(Self { player_id, current_season, history })
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    /// Record of the most recent season with data
    pub fn current(&self) -> &R {
        &self.history[&self.current_season]
    }

    pub fn history(&self) -> &BTreeMap<Season, R> {
        &self.history
    }
}

/// Fold per-season records into one history per player.
///
/// `extra_ids` widens the candidate set (e.g. pitchers only known from an
/// enrichment source); candidates with no season data are dropped.
pub fn build_histories<R: Clone>(
    seasons: &[Season],
    yearly: &YearlyRecords<R>,
    extra_ids: impl IntoIterator<Item = PlayerId>,
) -> BTreeMap<PlayerId, PlayerHistory<R>> {
    let mut candidates: BTreeSet<PlayerId> = extra_ids.into_iter().collect();
    for season in seasons {
        if let Some(records) = yearly.get(season) {
            candidates.extend(records.keys().copied());
        }
    }

    let mut histories = BTreeMap::new();
    let mut dropped = 0usize;

    for player in candidates {
        let history: BTreeMap<Season, R> = seasons
            .iter()
            .filter_map(|season| {
                yearly.get(season)?.get(&player).map(|record| (*season, record.clone()))
            })
            .collect();

        match PlayerHistory::new(player, seasons, history) {
            Some(entry) => {
                histories.insert(player, entry);
            }
            None => dropped += 1,
        }
    }

    debug!("Dropped {} candidates without any season data", dropped);
    info!("Total unique players: {}", histories.len());
    histories
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seasons() -> Vec<Season> {
        [2025, 2024, 2023, 2022].into_iter().map(|y| Season::new(y).unwrap()).collect()
    }

    fn season(year: u16) -> Season {
        Season::new(year).unwrap()
    }

    #[test]
    fn test_current_is_most_recent_available_season() {
        let yearly: YearlyRecords<&str> = BTreeMap::from([
            (season(2023), BTreeMap::from([(1, "r2023")])),
            (season(2022), BTreeMap::from([(1, "r2022"), (2, "only2022")])),
        ]);

        let histories = build_histories(&seasons(), &yearly, []);

        let first = &histories[&1];
        assert_eq!(*first.current(), "r2023");
        assert_eq!(first.current(), &first.history()[&season(2023)]);
        assert_eq!(first.history().len(), 2);
        assert_eq!(first.player_id(), 1);

        assert_eq!(*histories[&2].current(), "only2022");
    }

    #[test]
    fn test_history_is_sparse() {
        let yearly: YearlyRecords<u8> = BTreeMap::from([
            (season(2025), BTreeMap::from([(7, 1)])),
            (season(2024), BTreeMap::new()),
            (season(2022), BTreeMap::from([(7, 3)])),
        ]);

        let histories = build_histories(&seasons(), &yearly, []);
        let keys: Vec<_> = histories[&7].history().keys().map(|s| s.year()).collect();
        assert_eq!(keys, vec![2022, 2025]);
    }

    #[test]
    fn test_players_without_history_are_excluded() {
        let yearly: YearlyRecords<u8> =
            BTreeMap::from([(season(2024), BTreeMap::from([(1, 10)]))]);

        let histories = build_histories(&seasons(), &yearly, [1, 99]);
        assert_eq!(histories.len(), 1);
        assert!(!histories.contains_key(&99));
    }

    #[test]
    fn test_empty_history_has_no_current() {
        assert!(PlayerHistory::<u8>::new(5, &seasons(), BTreeMap::new()).is_none());
    }
}
