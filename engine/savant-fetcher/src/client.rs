use crate::config::{ProviderConfig, RetryConfig};
use crate::error::{FetchError, Result};
use crate::fields::text_field;
use crate::provider::{PlayerRole, ProviderQuery, Row, StatsProvider};
use anyhow::Context;
use reqwest::Client;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Body format of a provider endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResponseFormat {
    Csv,
    FanGraphsJson,
    PeopleJson,
}

/// A fully described HTTP request for one query
#[derive(Debug, Clone)]
struct RequestSpec {
    url: String,
    params: Vec<(&'static str, String)>,
    format: ResponseFormat,
}

/// HTTP provider for Baseball Savant, FanGraphs, the Chadwick register and MLB people lookups
pub struct SavantClient {
    client: Client,
    config: ProviderConfig,
}

impl SavantClient {
    /// Create a new client instance
    pub fn new(config: ProviderConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    fn savant(&self, path: &str) -> String {
        format!("{}/leaderboard/{}", self.config.savant_base_url.trim_end_matches('/'), path)
    }

    fn request_spec(&self, query: &ProviderQuery) -> RequestSpec {
        let csv = |url: String, mut params: Vec<(&'static str, String)>| {
            params.push(("csv", "true".to_string()));
            RequestSpec { url, params, format: ResponseFormat::Csv }
        };

        match query {
            ProviderQuery::ExpectedStats { role, season, min_pa } => csv(
                self.savant("expected_statistics"),
                vec![
                    ("type", role.as_str().to_string()),
                    ("year", season.to_string()),
                    ("position", String::new()),
                    ("team", String::new()),
                    ("min", min_pa.to_string()),
                ],
            ),
            ProviderQuery::ExitVeloBarrels { role, season, min_bbe } => csv(
                self.savant("statcast"),
                vec![
                    ("type", role.as_str().to_string()),
                    ("year", season.to_string()),
                    ("position", String::new()),
                    ("team", String::new()),
                    ("min", min_bbe.to_string()),
                ],
            ),
            ProviderQuery::SprintSpeed { season, min_opportunities } => csv(
                self.savant("sprint_speed"),
                vec![
                    ("min_season", season.to_string()),
                    ("max_season", season.to_string()),
                    ("position", String::new()),
                    ("team", String::new()),
                    ("min", min_opportunities.to_string()),
                ],
            ),
            ProviderQuery::ArsenalStats { season, min_pa } => csv(
                self.savant("pitch-arsenal-stats"),
                vec![
                    ("type", "pitcher".to_string()),
                    ("pitchType", String::new()),
                    ("year", season.to_string()),
                    ("team", String::new()),
                    ("min", min_pa.to_string()),
                ],
            ),
            ProviderQuery::PercentileRanks { role, season } => csv(
                self.savant("percentile-rankings"),
                vec![
                    ("type", role.as_str().to_string()),
                    ("year", season.to_string()),
                    ("position", String::new()),
                    ("team", String::new()),
                ],
            ),
            ProviderQuery::PitchArsenal { season, min_pitches, kind } => csv(
                self.savant("pitch-arsenals"),
                vec![
                    ("year", season.to_string()),
                    ("min", min_pitches.to_string()),
                    ("type", kind.type_param().to_string()),
                    ("hand", String::new()),
                ],
            ),
            ProviderQuery::FanGraphsLeaders { role, season, qual } => RequestSpec {
                url: self.config.fangraphs_leaders_url.clone(),
                params: vec![
                    ("pos", "all".to_string()),
                    ("stats", if *role == PlayerRole::Batter { "bat" } else { "pit" }.to_string()),
                    ("lg", "all".to_string()),
                    ("qual", qual.to_string()),
                    ("season", season.to_string()),
                    ("season1", season.to_string()),
                    ("month", "0".to_string()),
                    ("ind", "0".to_string()),
                    ("type", "8".to_string()),
                    ("pageitems", "2000000000".to_string()),
                    ("pagenum", "1".to_string()),
                ],
                format: ResponseFormat::FanGraphsJson,
            },
            ProviderQuery::RegisterShard { shard } => RequestSpec {
                url: format!(
                    "{}/people-{}.csv",
                    self.config.register_base_url.trim_end_matches('/'),
                    shard
                ),
                params: Vec::new(),
                format: ResponseFormat::Csv,
            },
            ProviderQuery::PeopleLookup { ids } => RequestSpec {
                url: self.config.people_url.clone(),
                params: vec![(
                    "personIds",
                    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(","),
                )],
                format: ResponseFormat::PeopleJson,
            },
        }
    }

    /// One GET, no retries
    async fn get_text(&self, spec: &RequestSpec) -> Result<String> {
        let response = self.client.get(&spec.url).query(&spec.params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16(), url: spec.url.clone() });
        }

        Ok(response.text().await?)
    }

    /// GET with exponential backoff on transient failures
    async fn get_with_retry(&self, spec: &RequestSpec) -> Result<String> {
        run_with_retry(&self.config.retry, &spec.url, || self.get_text(spec)).await
    }
}

/// Backoff delay following `delay`: grown by the multiplier, capped at `max_delay`
pub fn next_delay(retry: &RetryConfig, delay: Duration) -> Duration {
    Duration::from_secs_f64(
        (delay.as_secs_f64() * retry.backoff_multiplier).min(retry.max_delay().as_secs_f64()),
    )
}

/// Run `f` until it succeeds, fails permanently or uses up `max_retries` attempts
pub async fn run_with_retry<F, Fut, T>(retry: &RetryConfig, label: &str, mut f: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut delay = retry.initial_delay();
    let mut attempt = 1;

    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < retry.max_retries && e.is_transient() => {
                warn!("Attempt {} for {} failed: {}, retrying in {:?}", attempt, label, e, delay);
                sleep(delay).await;
                delay = next_delay(retry, delay);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[async_trait::async_trait]
impl StatsProvider for SavantClient {
    async fn query(&self, query: &ProviderQuery) -> Result<Vec<Row>> {
        let spec = self.request_spec(query);
        debug!("Querying {} at {}", query, spec.url);

        let body = self.get_with_retry(&spec).await?;
        let rows = match spec.format {
            ResponseFormat::Csv => parse_csv(&body)?,
            ResponseFormat::FanGraphsJson => parse_fangraphs(&body)?,
            ResponseFormat::PeopleJson => parse_people(&body)?,
        };

        debug!("{} returned {} rows", query, rows.len());
        Ok(rows)
    }
}

/// Parse a CSV leaderboard into rows keyed by trimmed header names
pub fn parse_csv(body: &str) -> Result<Vec<Row>> {
    let body = body.trim_start_matches('\u{feff}');
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(body.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().trim_matches('"').trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(name, value)| (name.clone(), Value::String(value.trim().to_string())))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

fn object_rows(values: Vec<Value>) -> Vec<Row> {
    values
        .into_iter()
        .filter_map(|value| match value {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
}

/// Parse a FanGraphs leaders payload (`{"data": [...]}` or a bare array)
pub fn parse_fangraphs(body: &str) -> Result<Vec<Row>> {
    match serde_json::from_str::<Value>(body)? {
        Value::Array(items) => Ok(object_rows(items)),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => Ok(object_rows(items)),
            _ => Err(FetchError::EmptyResult("FanGraphs payload without data".to_string())),
        },
        _ => Err(FetchError::EmptyResult("FanGraphs payload is not JSON data".to_string())),
    }
}

/// Parse an MLB people payload into `key_mlbam`/`name_first`/`name_last` rows
pub fn parse_people(body: &str) -> Result<Vec<Row>> {
    let mut payload = serde_json::from_str::<Value>(body)?;
    let people = match payload.get_mut("people").map(Value::take) {
        Some(Value::Array(items)) => object_rows(items),
        _ => Vec::new(),
    };

    Ok(people
        .iter()
        .map(|person| {
            let mut row = Row::new();
            row.insert("key_mlbam".to_string(), person.get("id").cloned().unwrap_or(Value::Null));
            row.insert(
                "name_first".to_string(),
                Value::String(text_field(person, &["useName", "firstName"])),
            );
            row.insert("name_last".to_string(), Value::String(text_field(person, &["lastName"])));
            row
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Season;
    use crate::provider::ArsenalKind;

    fn client() -> SavantClient {
        SavantClient::new(ProviderConfig::default()).unwrap()
    }

    #[test]
    fn test_parse_csv_strips_bom_and_quotes() {
        let body = "\u{feff}\"last_name, first_name\",player_id,pa,est_woba\n\"Judge, Aaron\",592450,704,.477\n";
        let rows = parse_csv(body).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["last_name, first_name"], "Judge, Aaron");
        assert_eq!(rows[0]["player_id"], "592450");
        assert_eq!(rows[0]["est_woba"], ".477");
    }

    #[test]
    fn test_parse_fangraphs_payload() {
        let rows = parse_fangraphs(r#"{"data": [{"playerid": 15640, "K%": 0.25}], "totalCount": 1}"#)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["playerid"], 15640);

        assert!(parse_fangraphs(r#"{"error": "nope"}"#).is_err());
    }

    #[test]
    fn test_parse_people_payload() {
        let body = r#"{"people": [
            {"id": 660271, "firstName": "Shohei", "lastName": "Ohtani", "useName": "Shohei"},
            {"id": 605141, "firstName": "Markus", "lastName": "Betts", "useName": "Mookie"}
        ]}"#;
        let rows = parse_people(body).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["key_mlbam"], 605141);
        assert_eq!(rows[1]["name_first"], "Mookie");
        assert_eq!(rows[1]["name_last"], "Betts");
    }

    #[test]
    fn test_request_specs() {
        let client = client();
        let season = Season::new(2024).unwrap();

        let spec = client.request_spec(&ProviderQuery::ExpectedStats {
            role: PlayerRole::Pitcher,
            season,
            min_pa: 50,
        });
        assert_eq!(spec.url, "https://baseballsavant.mlb.com/leaderboard/expected_statistics");
        assert!(spec.params.contains(&("type", "pitcher".to_string())));
        assert!(spec.params.contains(&("min", "50".to_string())));
        assert!(spec.params.contains(&("csv", "true".to_string())));

        let spec = client.request_spec(&ProviderQuery::PitchArsenal {
            season,
            min_pitches: 100,
            kind: ArsenalKind::Usage,
        });
        assert!(spec.params.contains(&("type", "n_".to_string())));

        let spec = client.request_spec(&ProviderQuery::RegisterShard { shard: 'a' });
        assert!(spec.url.ends_with("/people-a.csv"));
        assert_eq!(spec.format, ResponseFormat::Csv);

        let spec = client.request_spec(&ProviderQuery::PeopleLookup { ids: vec![1, 2, 3] });
        assert_eq!(spec.params, vec![("personIds", "1,2,3".to_string())]);
        assert_eq!(spec.format, ResponseFormat::PeopleJson);
    }

    fn quick_retry(max_retries: u32) -> RetryConfig {
        RetryConfig { max_retries, initial_delay_ms: 1, max_delay_ms: 2, backoff_multiplier: 2.0 }
    }

    fn unavailable() -> FetchError {
        FetchError::Status { status: 503, url: "savant".to_string() }
    }

    #[test]
    fn test_backoff_grows_then_caps() {
        let retry = RetryConfig::default();
        let mut delay = retry.initial_delay();
        let mut delays = Vec::new();
        for _ in 0..5 {
            delay = next_delay(&retry, delay);
            delays.push(delay.as_millis());
        }
        assert_eq!(delays, vec![2_000, 4_000, 8_000, 10_000, 10_000]);

        let gentle = RetryConfig { backoff_multiplier: 1.5, ..RetryConfig::default() };
        assert_eq!(next_delay(&gentle, Duration::from_millis(1_000)), Duration::from_millis(1_500));
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failures() {
        let mut attempts = 0;
        let result = run_with_retry(&quick_retry(3), "savant", || {
            attempts += 1;
            let attempt = attempts;
            async move {
                if attempt < 3 {
                    Err(unavailable())
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(attempts, 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let mut attempts = 0;
        let result: Result<()> = run_with_retry(&quick_retry(4), "savant", || {
            attempts += 1;
            async { Err(unavailable()) }
        })
        .await;

        assert!(matches!(result, Err(FetchError::Status { status: 503, .. })));
        assert_eq!(attempts, 4);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let mut attempts = 0;
        let result: Result<()> = run_with_retry(&quick_retry(3), "savant", || {
            attempts += 1;
            async { Err(FetchError::Status { status: 404, url: "savant".to_string() }) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts, 1);
    }
}
