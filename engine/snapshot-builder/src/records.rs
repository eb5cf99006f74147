//! Merged per-season records for batters and pitchers

use savant_fetcher::{FetchOutcome, MetricFamily, PartialRecord, PlayerId, Season};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Debug;

/// The fetch outcomes of every family contributing to one season
pub struct SeasonSources<'a> {
    season: Season,
    outcomes: Vec<&'a FetchOutcome>,
}

impl<'a> SeasonSources<'a> {
    /// Collect the outcomes for `season`; outcomes for other seasons are ignored
    pub fn new(season: Season, outcomes: &'a [FetchOutcome]) -> Self {
        let outcomes = outcomes.iter().filter(|outcome| outcome.season() == season).collect();
        Self { season, outcomes }
    }

    pub fn season(&self) -> Season {
        self.season
    }

    /// Partial record of one family for one player, empty when the family has none
    pub fn record(&self, family: MetricFamily, player: PlayerId) -> &'a PartialRecord {
        self.outcomes
            .iter()
            .copied()
            .find(|outcome| outcome.family() == family)
            .map(|outcome| outcome.record(player))
            .unwrap_or(PartialRecord::empty())
    }

    /// Union of the player IDs seen by any of `families`
    pub fn player_ids(&self, families: &[MetricFamily]) -> BTreeSet<PlayerId> {
        self.outcomes
            .iter()
            .filter(|outcome| families.contains(&outcome.family()))
            .flat_map(|outcome| outcome.records().keys().copied())
            .collect()
    }

    /// Number of families that actually delivered data
    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|outcome| !outcome.is_failed()).count()
    }
}

/// A flat, fully-enumerated record of one player in one season
pub trait SeasonRecord:
    Debug + Clone + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync
{
    /// Metric families merged into this record
    const FAMILIES: &'static [MetricFamily];

    /// Fields counted by the data-quality report
    const QUALITY_FIELDS: &'static [&'static str];

    /// Build the record from one season's contributions, defaulting absent fields to zero
    fn assemble(sources: &SeasonSources<'_>, player: PlayerId) -> Self;

    /// Numeric value of a named field
    fn stat(&self, name: &str) -> Option<f64>;
}

/// First non-zero value in precedence order, else zero
pub fn first_nonzero(candidates: &[f64]) -> f64 {
    candidates.iter().copied().find(|value| *value != 0.0).unwrap_or(0.0)
}

/// Batter season line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatterSeasonStats {
    pub xwoba: f64,
    pub xba: f64,
    pub xslg: f64,
    pub woba: f64,
    pub ba: f64,
    pub slg: f64,
    pub pa: i64,

    pub k_pct: f64,
    pub bb_pct: f64,
    pub chase_pct: f64,
    pub whiff_pct: f64,

    pub avg_exit_velo: f64,
    pub max_exit_velo: f64,
    pub barrel_pct: f64,
    pub hard_hit_pct: f64,
    pub la_sweet_spot_pct: f64,
    pub avg_launch_angle: f64,

    /// Feet per second
    pub sprint_speed: f64,
}

impl SeasonRecord for BatterSeasonStats {
    const FAMILIES: &'static [MetricFamily] = &[
        MetricFamily::BatterExpected,
        MetricFamily::BatterExitVelo,
        MetricFamily::SprintSpeed,
        MetricFamily::BattingFanGraphs,
    ];

    const QUALITY_FIELDS: &'static [&'static str] =
        &["k_pct", "bb_pct", "chase_pct", "whiff_pct", "sprint_speed", "barrel_pct", "avg_exit_velo"];

    fn assemble(sources: &SeasonSources<'_>, player: PlayerId) -> Self {
        let expected = sources.record(MetricFamily::BatterExpected, player);
        let exit_velo = sources.record(MetricFamily::BatterExitVelo, player);
        let sprint = sources.record(MetricFamily::SprintSpeed, player);
        let fangraphs = sources.record(MetricFamily::BattingFanGraphs, player);

        Self {
            xwoba: expected.float("xwoba"),
            xba: expected.float("xba"),
            xslg: expected.float("xslg"),
            woba: expected.float("woba"),
            ba: expected.float("ba"),
            slg: expected.float("slg"),
            pa: expected.int("pa"),

            k_pct: fangraphs.float("k_pct"),
            bb_pct: fangraphs.float("bb_pct"),
            chase_pct: fangraphs.float("chase_pct"),
            whiff_pct: fangraphs.float("whiff_pct"),

            avg_exit_velo: exit_velo.float("avg_exit_velo"),
            max_exit_velo: exit_velo.float("max_exit_velo"),
            barrel_pct: exit_velo.float("barrel_pct"),
            hard_hit_pct: exit_velo.float("hard_hit_pct"),
            la_sweet_spot_pct: exit_velo.float("la_sweet_spot_pct"),
            avg_launch_angle: exit_velo.float("avg_launch_angle"),

            sprint_speed: sprint.float("sprint_speed"),
        }
    }

    fn stat(&self, name: &str) -> Option<f64> {
        let value = match name {
            "xwoba" => self.xwoba,
            "xba" => self.xba,
            "xslg" => self.xslg,
            "woba" => self.woba,
            "ba" => self.ba,
            "slg" => self.slg,
            "pa" => self.pa as f64,
            "k_pct" => self.k_pct,
            "bb_pct" => self.bb_pct,
            "chase_pct" => self.chase_pct,
            "whiff_pct" => self.whiff_pct,
            "avg_exit_velo" => self.avg_exit_velo,
            "max_exit_velo" => self.max_exit_velo,
            "barrel_pct" => self.barrel_pct,
            "hard_hit_pct" => self.hard_hit_pct,
            "la_sweet_spot_pct" => self.la_sweet_spot_pct,
            "avg_launch_angle" => self.avg_launch_angle,
            "sprint_speed" => self.sprint_speed,
            _ => return None,
        };
        Some(value)
    }
}

/// Pitcher season line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitcherSeasonStats {
    pub xera: f64,
    pub xba: f64,
    pub xwoba: f64,

    pub avg_exit_velo_against: f64,
    pub barrel_pct: f64,
    pub hard_hit_pct: f64,

    pub gb_pct: f64,
    pub k_pct: f64,
    pub bb_pct: f64,
    pub whiff_pct: f64,
    pub chase_pct: f64,

    pub pitching_run_value: f64,
    pub fastball_run_value: f64,
    pub breaking_run_value: f64,
    pub offspeed_run_value: f64,

    /// Filled from the pitch-arsenal snapshot
    pub fastball_velo: f64,
    pub extension: f64,
}

impl SeasonRecord for PitcherSeasonStats {
    const FAMILIES: &'static [MetricFamily] = &[
        MetricFamily::PitcherExpected,
        MetricFamily::PitcherExitVelo,
        MetricFamily::PitcherArsenalStats,
        MetricFamily::PitchingFanGraphs,
    ];

    const QUALITY_FIELDS: &'static [&'static str] =
        &["k_pct", "bb_pct", "whiff_pct", "chase_pct", "gb_pct", "pitching_run_value"];

    fn assemble(sources: &SeasonSources<'_>, player: PlayerId) -> Self {
        let expected = sources.record(MetricFamily::PitcherExpected, player);
        let exit_velo = sources.record(MetricFamily::PitcherExitVelo, player);
        let arsenal = sources.record(MetricFamily::PitcherArsenalStats, player);
        let fangraphs = sources.record(MetricFamily::PitchingFanGraphs, player);

        Self {
            xera: expected.float("xera"),
            xba: expected.float("xba"),
            xwoba: expected.float("xwoba"),

            avg_exit_velo_against: exit_velo.float("avg_exit_velo_against"),
            barrel_pct: exit_velo.float("barrel_pct"),
            hard_hit_pct: exit_velo.float("hard_hit_pct"),

            gb_pct: fangraphs.float("gb_pct"),
            k_pct: fangraphs.float("k_pct"),
            bb_pct: fangraphs.float("bb_pct"),
            // Arsenal whiff rate first, FanGraphs swinging-strike rate as fallback
            whiff_pct: first_nonzero(&[arsenal.float("whiff_pct"), fangraphs.float("swstr_pct")]),
            chase_pct: fangraphs.float("chase_pct"),

            pitching_run_value: arsenal.float("pitching_run_value"),
            fastball_run_value: arsenal.float("fastball_run_value"),
            breaking_run_value: arsenal.float("breaking_run_value"),
            offspeed_run_value: arsenal.float("offspeed_run_value"),

            fastball_velo: 0.0,
            extension: 0.0,
        }
    }

    fn stat(&self, name: &str) -> Option<f64> {
        let value = match name {
            "xera" => self.xera,
            "xba" => self.xba,
            "xwoba" => self.xwoba,
            "avg_exit_velo_against" => self.avg_exit_velo_against,
            "barrel_pct" => self.barrel_pct,
            "hard_hit_pct" => self.hard_hit_pct,
            "gb_pct" => self.gb_pct,
            "k_pct" => self.k_pct,
            "bb_pct" => self.bb_pct,
            "whiff_pct" => self.whiff_pct,
            "chase_pct" => self.chase_pct,
            "pitching_run_value" => self.pitching_run_value,
            "fastball_run_value" => self.fastball_run_value,
            "breaking_run_value" => self.breaking_run_value,
            "offspeed_run_value" => self.offspeed_run_value,
            "fastball_velo" => self.fastball_velo,
            "extension" => self.extension,
            _ => return None,
        };
        Some(value)
    }
}
