//! Snapshot documents: the JSON files consumed downstream
//!
//! Every snapshot has the same outer shape; only the entity key names and the
//! per-season record type differ, and those are fixed per [`SnapshotSchema`].

use crate::aggregate::PlayerHistory;
use crate::error::{Result, SnapshotError};
use crate::records::{BatterSeasonStats, PitcherSeasonStats};
use chrono::{DateTime, NaiveDateTime, Utc};
use player_registry::display_name;
use savant_fetcher::{PitchEntry, PlayerId, Season};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Key names and record type of one kind of snapshot
pub trait SnapshotSchema: Debug + Clone {
    type Record: Debug + Clone + PartialEq + Serialize + DeserializeOwned;

    /// Singular entity name for log lines
    const ENTITY: &'static str;
    const COUNT_KEY: &'static str;
    const ENTITIES_KEY: &'static str;
    const CURRENT_KEY: &'static str;
    const HISTORY_KEY: &'static str;
}

#[derive(Debug, Clone, Copy)]
pub struct BatterSchema;

impl SnapshotSchema for BatterSchema {
    type Record = BatterSeasonStats;

    const ENTITY: &'static str = "batter";
    const COUNT_KEY: &'static str = "batterCount";
    const ENTITIES_KEY: &'static str = "batters";
    const CURRENT_KEY: &'static str = "currentStats";
    const HISTORY_KEY: &'static str = "statsHistory";
}

#[derive(Debug, Clone, Copy)]
pub struct PitcherSchema;

impl SnapshotSchema for PitcherSchema {
    type Record = PitcherSeasonStats;

    const ENTITY: &'static str = "pitcher";
    const COUNT_KEY: &'static str = "pitcherCount";
    const ENTITIES_KEY: &'static str = "pitchers";
    const CURRENT_KEY: &'static str = "currentStats";
    const HISTORY_KEY: &'static str = "statsHistory";
}

#[derive(Debug, Clone, Copy)]
pub struct ArsenalSchema;

impl SnapshotSchema for ArsenalSchema {
    type Record = Vec<PitchEntry>;

    const ENTITY: &'static str = "pitcher";
    const COUNT_KEY: &'static str = "pitcherCount";
    const ENTITIES_KEY: &'static str = "pitchers";
    const CURRENT_KEY: &'static str = "currentArsenal";
    const HISTORY_KEY: &'static str = "arsenalHistory";
}

/// One player's entry in a snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotEntry<R> {
    pub name: String,
    pub mlb_id: PlayerId,
    pub current: R,
    pub history: BTreeMap<Season, R>,
}

/// A complete snapshot document
#[derive(Debug, Clone)]
pub struct Snapshot<S: SnapshotSchema> {
    pub last_updated: DateTime<Utc>,
    pub source: String,
    /// Seasons in priority order, most recent first
    pub years: Vec<Season>,
    pub entries: BTreeMap<PlayerId, SnapshotEntry<S::Record>>,
}

impl<S: SnapshotSchema> Snapshot<S> {
    /// Assemble a snapshot from aggregated histories and resolved names
    pub fn from_histories(
        source: impl Into<String>,
        years: &[Season],
        histories: &BTreeMap<PlayerId, PlayerHistory<S::Record>>,
        names: &BTreeMap<PlayerId, String>,
    ) -> Self {
        let entries = histories
            .values()
            .map(|history| {
                let player_id = history.player_id();
                let entry = SnapshotEntry {
                    name: display_name(names, player_id),
                    mlb_id: player_id,
                    current: history.current().clone(),
                    history: history.history().clone(),
                };
                (player_id, entry)
            })
            .collect();

        Self { last_updated: Utc::now(), source: source.into(), years: years.to_vec(), entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the snapshot document
    pub fn to_json(&self) -> Result<Value> {
        let mut entities = Map::new();
        for (player_id, entry) in &self.entries {
            let mut history = Map::new();
            for (season, record) in &entry.history {
                history.insert(season.key(), serde_json::to_value(record)?);
            }

            let mut object = Map::new();
            object.insert("name".to_string(), Value::String(entry.name.clone()));
            object.insert("mlbId".to_string(), json!(entry.mlb_id));
            object.insert(S::CURRENT_KEY.to_string(), serde_json::to_value(&entry.current)?);
            object.insert(S::HISTORY_KEY.to_string(), Value::Object(history));
            entities.insert(player_id.to_string(), Value::Object(object));
        }

        let mut root = Map::new();
        root.insert("lastUpdated".to_string(), Value::String(self.last_updated.to_rfc3339()));
        root.insert("source".to_string(), Value::String(self.source.clone()));
        root.insert("years".to_string(), json!(self.years.iter().map(|s| s.year()).collect::<Vec<_>>()));
        root.insert(S::COUNT_KEY.to_string(), json!(self.entries.len()));
        root.insert(S::ENTITIES_KEY.to_string(), Value::Object(entities));
        Ok(Value::Object(root))
    }

    /// Parse a snapshot document
    pub fn from_json(value: Value) -> Result<Self> {
        let Value::Object(mut root) = value else {
            return Err(SnapshotError::schema("snapshot root is not an object"));
        };

        let last_updated = parse_timestamp(root.get("lastUpdated"))?;
        let source = root.get("source").and_then(Value::as_str).unwrap_or_default().to_string();

        let years = match root.remove("years") {
            Some(value) => serde_json::from_value::<Vec<u16>>(value)?
                .into_iter()
                .map(|year| Season::new(year).map_err(|e| SnapshotError::schema(e.to_string())))
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        let Some(Value::Object(entities)) = root.remove(S::ENTITIES_KEY) else {
            return Err(SnapshotError::schema(format!("missing \"{}\" object", S::ENTITIES_KEY)));
        };

        let mut entries = BTreeMap::new();
        for (key, entry) in entities {
            let entry = parse_entry::<S>(&key, entry)?;
            entries.insert(entry.mlb_id, entry);
        }

        if let Some(count) = root.get(S::COUNT_KEY).and_then(Value::as_u64) {
            if count as usize != entries.len() {
                warn!("{} says {} but the snapshot holds {} entries", S::COUNT_KEY, count, entries.len());
            }
        }

        Ok(Self { last_updated, source, years, entries })
    }

    /// Write the snapshot as pretty-printed JSON, replacing any previous file
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.to_json()?)?;
        fs::write(path, content)?;

        info!("Saved {} {}s to {}", self.len(), S::ENTITY, path.display());
        Ok(())
    }

    /// Read a snapshot file
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(serde_json::from_str(&content)?)
    }
}

fn parse_entry<S: SnapshotSchema>(key: &str, entry: Value) -> Result<SnapshotEntry<S::Record>> {
    let player_id: PlayerId =
        key.parse().map_err(|_| SnapshotError::schema(format!("invalid player key \"{key}\"")))?;

    let Value::Object(mut entry) = entry else {
        return Err(SnapshotError::schema(format!("entry {key} is not an object")));
    };

    let name = entry
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Unknown ({player_id})"));

    let current = match entry.remove(S::CURRENT_KEY) {
        Some(value) if !value.is_null() => serde_json::from_value(value)?,
        _ => {
            return Err(SnapshotError::schema(format!("entry {key} has no {}", S::CURRENT_KEY)))
        }
    };

    let mut history = BTreeMap::new();
    if let Some(Value::Object(seasons)) = entry.remove(S::HISTORY_KEY) {
        for (season_key, record) in seasons {
            let season = season_key
                .parse::<u16>()
                .ok()
                .and_then(|year| Season::new(year).ok())
                .ok_or_else(|| SnapshotError::schema(format!("invalid season \"{season_key}\"")))?;
            history.insert(season, serde_json::from_value(record)?);
        }
    }

    Ok(SnapshotEntry { name, mlb_id: player_id, current, history })
}

/// RFC 3339, or a naive ISO-8601 timestamp taken as UTC
fn parse_timestamp(value: Option<&Value>) -> Result<DateTime<Utc>> {
    let text = value
        .and_then(Value::as_str)
        .ok_or_else(|| SnapshotError::schema("missing lastUpdated"))?;

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| SnapshotError::schema(format!("invalid lastUpdated \"{text}\"")))
}
