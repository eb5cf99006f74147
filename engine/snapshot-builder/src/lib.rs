//! # Snapshot Builder
//!
//! Turns per-season provider data into the three JSON snapshots read by the
//! projection services: batters, pitchers and pitch arsenals.
//!
//! Each run fetches every metric family for every configured season, merges the
//! families into one flat record per player and season, folds the seasons into a
//! history whose current entry is the most recent season with data, resolves
//! display names and writes the document. Pitcher runs additionally patch
//! fastball velocity and extension from the arsenal snapshot and back-fill chase
//! rates from percentile ranks.

pub mod aggregate;
pub mod config;
pub mod enrich;
pub mod error;
pub mod logging;
pub mod merge;
pub mod pipeline;
pub mod quality;
pub mod records;
pub mod snapshot;


pub use aggregate::{build_histories, PlayerHistory};
pub use crate::config::{BuilderConfig, ChaseCalibration, OutputConfig};
pub use error::{Result, SnapshotError};
pub use merge::{merge_season, SeasonRecords, YearlyRecords};
pub use pipeline::SnapshotPipeline;
pub use records::{BatterSeasonStats, PitcherSeasonStats, SeasonRecord};
pub use snapshot::{ArsenalSchema, BatterSchema, PitcherSchema, Snapshot, SnapshotEntry, SnapshotSchema};

/// Current version of the snapshot builder
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
