//! Configuration for the snapshot builders

use crate::error::{Result, SnapshotError};
use player_registry::types::MAX_NAME_BATCH;
use savant_fetcher::fields::round_to;
use savant_fetcher::FetcherConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "SAVANT";

/// Default configuration file, read when present
pub const DEFAULT_CONFIG_FILE: &str = "savant.toml";

/// Main configuration for a snapshot run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Provider access, seasons and thresholds
    pub fetcher: FetcherConfig,

    /// Where snapshots are written
    pub output: OutputConfig,

    /// Provenance labels written into each snapshot
    pub sources: SourceLabels,

    /// Players per name lookup request
    pub name_batch_size: usize,

    /// Percentile -> raw chase rate rescaling
    pub chase: ChaseCalibration,

    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory, created when missing
    pub dir: PathBuf,
    pub batter_file: String,
    pub pitcher_file: String,
    pub arsenal_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceLabels {
    pub batter: String,
    pub pitcher: String,
    pub arsenal: String,
}

/// Linear rescaling of a chase-rate percentile into an approximate raw rate.
///
/// raw = floor + percentile / 100 * span. The constants are a rough league
/// range, not a fitted model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChaseCalibration {
    /// Raw chase rate (percent) at the 0th percentile
    pub floor: f64,

    /// Raw chase-rate range (percent) covered by percentiles 0..100
    pub span: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when RUST_LOG is not set
    pub level: String,

    /// Log format: "pretty", "json" or "compact"
    pub format: String,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            fetcher: FetcherConfig::default(),
            output: OutputConfig::default(),
            sources: SourceLabels::default(),
            name_batch_size: MAX_NAME_BATCH,
            chase: ChaseCalibration::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("services"),
            batter_file: "batterSavant.json".to_string(),
            pitcher_file: "pitcherSavant.json".to_string(),
            arsenal_file: "pitchArsenals.json".to_string(),
        }
    }
}

impl Default for SourceLabels {
    fn default() -> Self {
        Self {
            batter: "Baseball Savant".to_string(),
            pitcher: "Baseball Savant + FanGraphs".to_string(),
            arsenal: "Baseball Savant".to_string(),
        }
    }
}

impl Default for ChaseCalibration {
    fn default() -> Self {
        Self { floor: 20.0, span: 18.0 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "compact".to_string() }
    }
}

impl ChaseCalibration {
    /// Approximate raw chase rate for a percentile, 1 decimal
    pub fn raw_chase(&self, percentile: f64) -> f64 {
        round_to(self.floor + percentile / 100.0 * self.span, 1)
    }
}

impl OutputConfig {
    pub fn batter_path(&self) -> PathBuf {
        self.dir.join(&self.batter_file)
    }

    pub fn pitcher_path(&self) -> PathBuf {
        self.dir.join(&self.pitcher_file)
    }

    pub fn arsenal_path(&self) -> PathBuf {
        self.dir.join(&self.arsenal_file)
    }
}

impl BuilderConfig {
    /// Load configuration from an optional TOML file and `SAVANT_*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let config: Self = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("fetcher.seasons"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Load from `savant.toml` in the working directory plus the environment
    pub fn load_default() -> Result<Self> {
        Self::load(Some(Path::new(DEFAULT_CONFIG_FILE)))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.fetcher.validate()?;

        if self.name_batch_size == 0 || self.name_batch_size > MAX_NAME_BATCH {
            return Err(SnapshotError::config(format!(
                "name_batch_size must be within 1..={MAX_NAME_BATCH}"
            )));
        }

        if !self.chase.floor.is_finite() || !self.chase.span.is_finite() || self.chase.span <= 0.0
        {
            return Err(SnapshotError::config("chase calibration must be finite with a positive span"));
        }

        for (name, file) in [
            ("batter_file", &self.output.batter_file),
            ("pitcher_file", &self.output.pitcher_file),
            ("arsenal_file", &self.output.arsenal_file),
        ] {
            if file.trim().is_empty() {
                return Err(SnapshotError::config(format!("output.{name} cannot be empty")));
            }
        }

        Ok(())
    }
}
