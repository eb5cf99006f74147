use crate::error::{FetchError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Canonical (MLBAM) player identifier
pub type PlayerId = u32;

/// Partial records of one metric family, keyed by canonical player ID
pub type FamilyRecords = BTreeMap<PlayerId, PartialRecord>;

/// Pitch arsenals of one season, keyed by canonical player ID
pub type ArsenalRecords = BTreeMap<PlayerId, Vec<PitchEntry>>;

static EMPTY_RECORDS: FamilyRecords = BTreeMap::new();
static EMPTY_RECORD: PartialRecord = PartialRecord { fields: BTreeMap::new() };

/// A four-digit season year
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Season(u16);

impl Season {
    pub fn new(year: u16) -> Result<Self> {
        if (1000..=9999).contains(&year) {
            Ok(Self(year))
        } else {
            Err(FetchError::invalid_request(format!("season {year} is not a four-digit year")))
        }
    }

    pub fn year(self) -> u16 {
        self.0
    }

    /// Key used for per-season history maps
    pub fn key(self) -> String {
        self.0.to_string()
    }
}

impl TryFrom<u16> for Season {
    type Error = FetchError;

    fn try_from(year: u16) -> Result<Self> {
        Season::new(year)
    }
}

impl From<Season> for u16 {
    fn from(season: Season) -> Self {
        season.0
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single numeric statistic
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Int(i64),
    Float(f64),
}

impl StatValue {
    pub fn as_f64(self) -> f64 {
        match self {
            StatValue::Int(v) => v as f64,
            StatValue::Float(v) => v,
        }
    }

    pub fn as_i64(self) -> i64 {
        match self {
            StatValue::Int(v) => v,
            StatValue::Float(v) => v as i64,
        }
    }
}

/// The fields one metric family supplied for one player in one season
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PartialRecord {
    fields: BTreeMap<&'static str, StatValue>,
}

impl PartialRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared empty record, used when a family has nothing for a player
    pub fn empty() -> &'static PartialRecord {
        &EMPTY_RECORD
    }

    pub fn insert(&mut self, name: &'static str, value: StatValue) {
        self.fields.insert(name, value);
    }

    pub fn with(mut self, name: &'static str, value: StatValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<StatValue> {
        self.fields.get(name).copied()
    }

    /// Float value of a field, 0.0 when absent
    pub fn float(&self, name: &str) -> f64 {
        self.get(name).map(StatValue::as_f64).unwrap_or(0.0)
    }

    /// Integer value of a field, 0 when absent
    pub fn int(&self, name: &str) -> i64 {
        self.get(name).map(StatValue::as_i64).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Which numbering system a provider keys its rows by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdNamespace {
    /// MLB Advanced Media IDs, used by Baseball Savant
    Mlbam,
    /// FanGraphs IDs
    FanGraphs,
}

/// Translates IDs from a foreign namespace into canonical player IDs.
///
/// Unmapped IDs translate to 0 and must be skipped by the caller.
pub trait IdTranslator {
    fn translate(&self, source_id: i64) -> PlayerId;
}

/// Identity translation for sources already keyed by MLBAM ID
pub struct MlbamIds;

impl IdTranslator for MlbamIds {
    fn translate(&self, source_id: i64) -> PlayerId {
        PlayerId::try_from(source_id).unwrap_or(0)
    }
}

/// Metric families fetched from the providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricFamily {
    BatterExpected,
    BatterExitVelo,
    SprintSpeed,
    BattingFanGraphs,
    PitcherExpected,
    PitcherExitVelo,
    PitcherArsenalStats,
    PitchingFanGraphs,
    PitcherPercentileRanks,
    PitchArsenal,
}

impl MetricFamily {
    pub fn namespace(self) -> IdNamespace {
        match self {
            MetricFamily::BattingFanGraphs | MetricFamily::PitchingFanGraphs => {
                IdNamespace::FanGraphs
            }
            _ => IdNamespace::Mlbam,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MetricFamily::BatterExpected => "batter expected stats",
            MetricFamily::BatterExitVelo => "batter exit velo/barrels",
            MetricFamily::SprintSpeed => "sprint speed",
            MetricFamily::BattingFanGraphs => "FanGraphs batting",
            MetricFamily::PitcherExpected => "pitcher expected stats",
            MetricFamily::PitcherExitVelo => "pitcher exit velo/barrels",
            MetricFamily::PitcherArsenalStats => "pitcher arsenal stats",
            MetricFamily::PitchingFanGraphs => "FanGraphs pitching",
            MetricFamily::PitcherPercentileRanks => "pitcher percentile ranks",
            MetricFamily::PitchArsenal => "pitch arsenal",
        }
    }
}

impl fmt::Display for MetricFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One pitch of a pitcher's arsenal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchEntry {
    /// Pitch name (e.g. "Four-Seam Fastball")
    #[serde(rename = "type")]
    pub pitch_type: String,

    /// Average velocity in mph
    #[serde(default)]
    pub speed: f64,

    /// Usage share in percent
    #[serde(default)]
    pub usage: f64,

    /// Average spin rate in rpm, 0 when unknown
    #[serde(default)]
    pub spin: f64,

    /// Release extension in feet, 0 when unknown
    #[serde(default, skip_serializing_if = "is_zero")]
    pub extension: f64,
}

fn is_zero(value: &f64) -> bool {
    *value == 0.0
}

/// Result of one fetch: data on success, the reason on failure
#[derive(Debug)]
pub enum FetchOutcome<T = FamilyRecords> {
    Fetched { family: MetricFamily, season: Season, data: T },
    Failed { family: MetricFamily, season: Season, reason: FetchError },
}

impl<T> FetchOutcome<T> {
    pub fn fetched(family: MetricFamily, season: Season, data: T) -> Self {
        FetchOutcome::Fetched { family, season, data }
    }

    pub fn failed(family: MetricFamily, season: Season, reason: FetchError) -> Self {
        FetchOutcome::Failed { family, season, reason }
    }

    pub fn family(&self) -> MetricFamily {
        match self {
            FetchOutcome::Fetched { family, .. } | FetchOutcome::Failed { family, .. } => *family,
        }
    }

    pub fn season(&self) -> Season {
        match self {
            FetchOutcome::Fetched { season, .. } | FetchOutcome::Failed { season, .. } => *season,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            FetchOutcome::Fetched { data, .. } => Some(data),
            FetchOutcome::Failed { .. } => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            FetchOutcome::Fetched { data, .. } => Some(data),
            FetchOutcome::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed { .. })
    }
}

impl FetchOutcome<FamilyRecords> {
    /// Records of this family; a failed fetch contributes nothing
    pub fn records(&self) -> &FamilyRecords {
        self.data().unwrap_or(&EMPTY_RECORDS)
    }

    /// Record for one player, or the shared empty record
    pub fn record(&self, player: PlayerId) -> &PartialRecord {
        self.records().get(&player).unwrap_or(PartialRecord::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_validation() {
        assert!(Season::new(2024).is_ok());
        assert!(Season::new(24).is_err());
        assert_eq!(Season::new(2023).unwrap().key(), "2023");
    }

    #[test]
    fn test_partial_record_defaults() {
        let record = PartialRecord::new()
            .with("xwoba", StatValue::Float(0.35))
            .with("pa", StatValue::Int(150));

        assert_eq!(record.float("xwoba"), 0.35);
        assert_eq!(record.int("pa"), 150);
        assert_eq!(record.float("barrel_pct"), 0.0);
        assert_eq!(record.int("attempts"), 0);
    }

    #[test]
    fn test_failed_outcome_contributes_nothing() {
        let season = Season::new(2024).unwrap();
        let outcome: FetchOutcome = FetchOutcome::failed(
            MetricFamily::BatterExitVelo,
            season,
            FetchError::EmptyResult("exit velo".to_string()),
        );

        assert!(outcome.is_failed());
        assert!(outcome.records().is_empty());
        assert!(outcome.record(101).is_empty());
        assert_eq!(outcome.family(), MetricFamily::BatterExitVelo);
    }

    #[test]
    fn test_mlbam_identity_translation() {
        assert_eq!(MlbamIds.translate(660271), 660271);
        assert_eq!(MlbamIds.translate(-4), 0);
    }

    #[test]
    fn test_pitch_entry_reads_missing_fields_as_zero() {
        let pitch: PitchEntry =
            serde_json::from_str(r#"{"type": "Sinker", "speed": 95.1, "usage": 40.0}"#).unwrap();
        assert_eq!(pitch.spin, 0.0);
        assert_eq!(pitch.extension, 0.0);
    }
}
