use savant_fetcher::fields::int_field;
use savant_fetcher::{IdTranslator, PlayerId, Row, SavantFetcher, StatsProvider};
use std::collections::HashMap;
use tracing::{debug, info};

/// FanGraphs -> MLBAM identity crosswalk
///
/// Built once per run from the Chadwick register and never mutated afterwards.
/// When the register lists a FanGraphs ID more than once, the first valid pair
/// is kept.
#[derive(Debug, Clone, Default)]
pub struct IdentityCrosswalk {
    /// Map from FanGraphs ID to MLBAM ID
    mlbam_by_fangraphs: HashMap<i64, PlayerId>,
}

impl IdentityCrosswalk {
    /// Create a new empty crosswalk
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the crosswalk from register rows (`key_fangraphs`, `key_mlbam` columns)
    pub fn from_register_rows(rows: &[Row]) -> Self {
        let mut mlbam_by_fangraphs = HashMap::new();
        let mut discarded = 0usize;

        for row in rows {
            let fangraphs_id = int_field(row, &["key_fangraphs"]);
            let mlbam_id = int_field(row, &["key_mlbam"]);

            let mlbam_id = match PlayerId::try_from(mlbam_id) {
                Ok(id) if id > 0 && fangraphs_id > 0 => id,
                _ => {
                    discarded += 1;
                    continue;
                }
            };

            mlbam_by_fangraphs.entry(fangraphs_id).or_insert(mlbam_id);
        }

        debug!("Discarded {} register rows without both IDs", discarded);
        Self { mlbam_by_fangraphs }
    }

    /// Fetch the register and build the crosswalk
    pub async fn load<P: StatsProvider>(fetcher: &SavantFetcher<P>) -> Self {
        info!("Loading player ID crosswalk...");
        let rows = fetcher.fetch_register().await;
        let crosswalk = Self::from_register_rows(&rows);
        info!("Built crosswalk with {} FanGraphs IDs", crosswalk.len());
        crosswalk
    }

    /// MLBAM ID for a FanGraphs ID, 0 when unmapped
    pub fn lookup(&self, fangraphs_id: i64) -> PlayerId {
        self.mlbam_by_fangraphs.get(&fangraphs_id).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.mlbam_by_fangraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mlbam_by_fangraphs.is_empty()
    }
}

impl IdTranslator for IdentityCrosswalk {
    fn translate(&self, source_id: i64) -> PlayerId {
        self.lookup(source_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use savant_fetcher::families::{extract_records, BATTING_FANGRAPHS};
    use serde_json::json;

    fn rows(values: Vec<serde_json::Value>) -> Vec<Row> {
        values.into_iter().map(|v| v.as_object().cloned().unwrap()).collect()
    }

    fn create_test_register() -> Vec<Row> {
        rows(vec![
            json!({"name_last": "Judge", "key_mlbam": "592450", "key_fangraphs": "15640"}),
            json!({"name_last": "Betts", "key_mlbam": "605141", "key_fangraphs": "13611"}),
            json!({"name_last": "Nobody", "key_mlbam": "", "key_fangraphs": "77"}),
            json!({"name_last": "Minors", "key_mlbam": "700001", "key_fangraphs": ""}),
            json!({"name_last": "Negative", "key_mlbam": "-1", "key_fangraphs": "88"}),
        ])
    }

    #[test]
    fn test_crosswalk_creation() {
        let crosswalk = IdentityCrosswalk::from_register_rows(&create_test_register());

        assert_eq!(crosswalk.len(), 2);
        assert_eq!(crosswalk.lookup(15640), 592450);
        assert_eq!(crosswalk.lookup(13611), 605141);
    }

    #[test]
    fn test_unmapped_ids_return_zero() {
        let crosswalk = IdentityCrosswalk::from_register_rows(&create_test_register());

        assert_eq!(crosswalk.lookup(77), 0);
        assert_eq!(crosswalk.lookup(88), 0);
        assert_eq!(crosswalk.lookup(0), 0);
        assert_eq!(crosswalk.translate(999_999), 0);
    }

    #[test]
    fn test_first_seen_pair_wins() {
        let register = rows(vec![
            json!({"key_mlbam": 1001, "key_fangraphs": 5}),
            json!({"key_mlbam": 2002, "key_fangraphs": 5}),
        ]);

        let crosswalk = IdentityCrosswalk::from_register_rows(&register);
        assert_eq!(crosswalk.lookup(5), 1001);

        // Same register, same answer
        let again = IdentityCrosswalk::from_register_rows(&register);
        assert_eq!(again.lookup(5), crosswalk.lookup(5));
    }

    #[test]
    fn test_fangraphs_rows_are_rekeyed_by_mlbam_id() {
        let mut register = create_test_register();
        // A second FanGraphs ID for Judge
        register.extend(rows(vec![json!({"key_mlbam": "592450", "key_fangraphs": "99999"})]));
        let crosswalk = IdentityCrosswalk::from_register_rows(&register);

        let leaders = rows(vec![
            json!({"IDfg": 99999, "K%": 0.31}),
            json!({"IDfg": 15640, "K%": 0.25}),
            json!({"IDfg": 77, "K%": 0.20}),
            json!({"playerid": 13611, "K%": 0.12}),
        ]);
        let records = extract_records(&BATTING_FANGRAPHS, &leaders, &crosswalk);

        assert_eq!(records.keys().copied().collect::<Vec<_>>(), vec![592450, 605141]);
        // Colliding rows: the first row in provider order is kept
        assert_eq!(records[&592450].float("k_pct"), 31.0);
        assert_eq!(records[&605141].float("k_pct"), 12.0);
    }
}
