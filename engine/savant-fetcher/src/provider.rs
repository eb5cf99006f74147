//! Provider abstraction
//!
//! Every call into an external collaborator is described by a [`ProviderQuery`]
//! and answered with a list of loosely-typed rows. Concrete providers only
//! translate queries into requests; all interpretation of the rows happens in
//! the family tables so schema drift stays in one place.

use crate::error::Result;
use crate::models::{PlayerId, Season};
use std::fmt;

/// A provider row: column name -> raw value
pub type Row = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerRole {
    Batter,
    Pitcher,
}

impl PlayerRole {
    pub fn as_str(self) -> &'static str {
        match self {
            PlayerRole::Batter => "batter",
            PlayerRole::Pitcher => "pitcher",
        }
    }
}

/// Which pitch-arsenal leaderboard to pull
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArsenalKind {
    AvgSpeed,
    Usage,
    AvgSpin,
}

impl ArsenalKind {
    /// Leaderboard type parameter
    pub fn type_param(self) -> &'static str {
        match self {
            ArsenalKind::AvgSpeed => "avg_speed",
            ArsenalKind::Usage => "n_",
            ArsenalKind::AvgSpin => "avg_spin",
        }
    }

    /// Column holding this value for a pitch code
    pub fn column(self, code: &str) -> String {
        match self {
            ArsenalKind::AvgSpeed => format!("{code}_avg_speed"),
            ArsenalKind::Usage => format!("n_{code}"),
            ArsenalKind::AvgSpin => format!("{code}_avg_spin"),
        }
    }
}

/// A single raw query against an external provider
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderQuery {
    ExpectedStats { role: PlayerRole, season: Season, min_pa: u32 },
    ExitVeloBarrels { role: PlayerRole, season: Season, min_bbe: u32 },
    SprintSpeed { season: Season, min_opportunities: u32 },
    ArsenalStats { season: Season, min_pa: u32 },
    PercentileRanks { role: PlayerRole, season: Season },
    PitchArsenal { season: Season, min_pitches: u32, kind: ArsenalKind },
    FanGraphsLeaders { role: PlayerRole, season: Season, qual: u32 },
    RegisterShard { shard: char },
    PeopleLookup { ids: Vec<PlayerId> },
}

impl fmt::Display for ProviderQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderQuery::ExpectedStats { role, season, .. } => {
                write!(f, "{} expected stats {}", role.as_str(), season)
            }
            ProviderQuery::ExitVeloBarrels { role, season, .. } => {
                write!(f, "{} exit velo/barrels {}", role.as_str(), season)
            }
            ProviderQuery::SprintSpeed { season, .. } => write!(f, "sprint speed {season}"),
            ProviderQuery::ArsenalStats { season, .. } => write!(f, "arsenal stats {season}"),
            ProviderQuery::PercentileRanks { role, season } => {
                write!(f, "{} percentile ranks {}", role.as_str(), season)
            }
            ProviderQuery::PitchArsenal { season, kind, .. } => {
                write!(f, "pitch arsenal ({}) {}", kind.type_param(), season)
            }
            ProviderQuery::FanGraphsLeaders { role, season, .. } => {
                write!(f, "FanGraphs {} leaders {}", role.as_str(), season)
            }
            ProviderQuery::RegisterShard { shard } => write!(f, "register shard {shard}"),
            ProviderQuery::PeopleLookup { ids } => write!(f, "people lookup ({} ids)", ids.len()),
        }
    }
}

/// An external statistics provider
#[async_trait::async_trait]
pub trait StatsProvider: Send + Sync {
    /// Run one query and return its rows
    async fn query(&self, query: &ProviderQuery) -> Result<Vec<Row>>;
}
