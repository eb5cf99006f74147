use crate::error::{FetchError, Result};
use crate::models::{MetricFamily, Season};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "SAVANT";

/// Configuration for the Savant fetchers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Provider endpoints and HTTP behaviour
    pub provider: ProviderConfig,

    /// Seasons to fetch, most recent first
    pub seasons: Vec<u16>,

    /// Minimum-sample thresholds per metric family
    pub thresholds: Thresholds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Baseball Savant base URL
    pub savant_base_url: String,

    /// FanGraphs leaders API URL
    pub fangraphs_leaders_url: String,

    /// Base URL of the Chadwick register data directory
    pub register_base_url: String,

    /// MLB people lookup endpoint
    pub people_url: String,

    /// User agent sent with every request
    pub user_agent: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Courtesy delay before each fetch in milliseconds
    pub request_delay_ms: u64,

    /// Retry configuration for a single request
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per request
    pub max_retries: u32,

    /// Initial retry delay in milliseconds
    pub initial_delay_ms: u64,

    /// Maximum retry delay in milliseconds
    pub max_delay_ms: u64,

    /// Backoff multiplier
    pub backoff_multiplier: f64,
}

/// Minimum-sample thresholds, one per metric family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    pub batter_expected_min_pa: u32,
    pub batter_exit_velo_min_bbe: u32,
    pub sprint_speed_min_opportunities: u32,
    pub batting_qual: u32,
    pub pitcher_expected_min_pa: u32,
    pub pitcher_exit_velo_min_bbe: u32,
    pub arsenal_stats_min_pa: u32,
    pub pitching_qual: u32,
    pub pitch_arsenal_min_pitches: u32,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            seasons: vec![2025, 2024, 2023, 2022],
            thresholds: Thresholds::default(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            savant_base_url: "https://baseballsavant.mlb.com".to_string(),
            fangraphs_leaders_url: "https://www.fangraphs.com/api/leaders/major-league/data"
                .to_string(),
            register_base_url:
                "https://raw.githubusercontent.com/chadwickbureau/register/master/data".to_string(),
            people_url: "https://statsapi.mlb.com/api/v1/people".to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36".to_string(),
            request_timeout_secs: 60,
            request_delay_ms: 500,
            retry: RetryConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_retries: 3, initial_delay_ms: 1_000, max_delay_ms: 10_000, backoff_multiplier: 2.0 }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            batter_expected_min_pa: 100,
            batter_exit_velo_min_bbe: 50,
            sprint_speed_min_opportunities: 10,
            batting_qual: 1,
            pitcher_expected_min_pa: 50,
            pitcher_exit_velo_min_bbe: 30,
            arsenal_stats_min_pa: 20,
            pitching_qual: 1,
            pitch_arsenal_min_pitches: 100,
        }
    }
}

impl Thresholds {
    /// Threshold configured for a metric family
    pub fn for_family(&self, family: MetricFamily) -> u32 {
        match family {
            MetricFamily::BatterExpected => self.batter_expected_min_pa,
            MetricFamily::BatterExitVelo => self.batter_exit_velo_min_bbe,
            MetricFamily::SprintSpeed => self.sprint_speed_min_opportunities,
            MetricFamily::BattingFanGraphs => self.batting_qual,
            MetricFamily::PitcherExpected => self.pitcher_expected_min_pa,
            MetricFamily::PitcherExitVelo => self.pitcher_exit_velo_min_bbe,
            MetricFamily::PitcherArsenalStats => self.arsenal_stats_min_pa,
            MetricFamily::PitchingFanGraphs => self.pitching_qual,
            MetricFamily::PitcherPercentileRanks => 1,
            MetricFamily::PitchArsenal => self.pitch_arsenal_min_pitches,
        }
    }

    fn all(&self) -> [(&'static str, u32); 9] {
        [
            ("batter_expected_min_pa", self.batter_expected_min_pa),
            ("batter_exit_velo_min_bbe", self.batter_exit_velo_min_bbe),
            ("sprint_speed_min_opportunities", self.sprint_speed_min_opportunities),
            ("batting_qual", self.batting_qual),
            ("pitcher_expected_min_pa", self.pitcher_expected_min_pa),
            ("pitcher_exit_velo_min_bbe", self.pitcher_exit_velo_min_bbe),
            ("arsenal_stats_min_pa", self.arsenal_stats_min_pa),
            ("pitching_qual", self.pitching_qual),
            ("pitch_arsenal_min_pitches", self.pitch_arsenal_min_pitches),
        ]
    }
}

impl RetryConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

impl ProviderConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl FetcherConfig {
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
                    .with_list_parse_key("seasons"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let seasons = self.season_list()?;
        if seasons.windows(2).any(|pair| pair[0] <= pair[1]) {
            return Err(FetchError::config("seasons must be listed most recent first without repeats"));
        }

        for (name, value) in self.thresholds.all() {
            if value == 0 {
                return Err(FetchError::config(format!("threshold {name} must be positive")));
            }
        }

        if self.provider.retry.max_retries == 0 {
            return Err(FetchError::config("retry.max_retries must be at least 1"));
        }

        if self.provider.retry.backoff_multiplier < 1.0 {
            return Err(FetchError::config("retry.backoff_multiplier must be >= 1.0"));
        }

        Ok(())
    }

    /// Seasons in descending priority order
    pub fn season_list(&self) -> Result<Vec<Season>> {
        if self.seasons.is_empty() {
            return Err(FetchError::config("at least one season is required"));
        }
        self.seasons.iter().map(|year| Season::new(*year)).collect()
    }
}
