//! Declared field tables for each metric family
//!
//! Each output field lists the provider column names it may arrive under, in
//! priority order. The first present column wins; a field whose columns are all
//! absent defaults to zero.

use crate::fields::{float_field, int_field, round_to, text_field};
use crate::models::{FamilyRecords, IdTranslator, MetricFamily, PartialRecord, PlayerId, StatValue};
use crate::provider::Row;
use std::collections::BTreeMap;

/// How a raw value becomes a stored statistic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Float rounded to 3 digits
    Float,
    /// Integer
    Int,
    /// Fraction scaled to a percentage, rounded to 1 digit
    Percent,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub candidates: &'static [&'static str],
    pub kind: FieldKind,
}

const fn float(name: &'static str, candidates: &'static [&'static str]) -> FieldSpec {
    FieldSpec { name, candidates, kind: FieldKind::Float }
}

const fn int(name: &'static str, candidates: &'static [&'static str]) -> FieldSpec {
    FieldSpec { name, candidates, kind: FieldKind::Int }
}

const fn percent(name: &'static str, candidates: &'static [&'static str]) -> FieldSpec {
    FieldSpec { name, candidates, kind: FieldKind::Percent }
}

/// Row layout of one metric family
#[derive(Debug, Clone, Copy)]
pub struct FamilySpec {
    pub family: MetricFamily,
    pub id_candidates: &'static [&'static str],
    pub fields: &'static [FieldSpec],
}

const SAVANT_IDS: &[&str] = &["player_id", "batter"];
const FANGRAPHS_IDS: &[&str] = &["IDfg", "playerid"];

pub const BATTER_EXPECTED: FamilySpec = FamilySpec {
    family: MetricFamily::BatterExpected,
    id_candidates: SAVANT_IDS,
    fields: &[
        int("pa", &["pa"]),
        float("xwoba", &["est_woba"]),
        float("xba", &["est_ba"]),
        float("xslg", &["est_slg"]),
        float("woba", &["woba"]),
        float("ba", &["ba"]),
        float("slg", &["slg"]),
    ],
};

pub const BATTER_EXIT_VELO: FamilySpec = FamilySpec {
    family: MetricFamily::BatterExitVelo,
    id_candidates: SAVANT_IDS,
    fields: &[
        float("avg_exit_velo", &["avg_hit_speed", "exit_velocity_avg"]),
        float("max_exit_velo", &["max_hit_speed", "exit_velocity_max"]),
        float("barrel_pct", &["brl_percent", "barrel_batted_rate"]),
        float("hard_hit_pct", &["ev95percent", "hard_hit_percent"]),
        float("la_sweet_spot_pct", &["anglesweetspotpercent", "sweetspot_percent"]),
        float("avg_launch_angle", &["avg_hit_angle", "launch_angle_avg"]),
        int("attempts", &["attempts", "batted_balls"]),
    ],
};

pub const SPRINT_SPEED: FamilySpec = FamilySpec {
    family: MetricFamily::SprintSpeed,
    id_candidates: &["player_id"],
    fields: &[float("sprint_speed", &["sprint_speed"])],
};

pub const BATTING_FANGRAPHS: FamilySpec = FamilySpec {
    family: MetricFamily::BattingFanGraphs,
    id_candidates: FANGRAPHS_IDS,
    fields: &[
        percent("k_pct", &["K%"]),
        percent("bb_pct", &["BB%"]),
        // O-Swing%: swings at pitches outside the zone
        percent("chase_pct", &["O-Swing%"]),
        // SwStr%: swinging strikes per pitch
        percent("whiff_pct", &["SwStr%"]),
    ],
};

pub const PITCHER_EXPECTED: FamilySpec = FamilySpec {
    family: MetricFamily::PitcherExpected,
    id_candidates: &["player_id"],
    fields: &[
        float("xera", &["xera"]),
        float("xba", &["est_ba"]),
        float("xwoba", &["est_woba"]),
    ],
};

pub const PITCHER_EXIT_VELO: FamilySpec = FamilySpec {
    family: MetricFamily::PitcherExitVelo,
    id_candidates: &["player_id"],
    fields: &[
        float("avg_exit_velo_against", &["avg_hit_speed"]),
        float("barrel_pct", &["brl_percent"]),
        float("hard_hit_pct", &["ev95percent"]),
    ],
};

pub const PITCHING_FANGRAPHS: FamilySpec = FamilySpec {
    family: MetricFamily::PitchingFanGraphs,
    id_candidates: FANGRAPHS_IDS,
    fields: &[
        percent("k_pct", &["K%"]),
        percent("bb_pct", &["BB%"]),
        percent("gb_pct", &["GB%"]),
        percent("chase_pct", &["O-Swing%"]),
        percent("swstr_pct", &["SwStr%"]),
    ],
};

pub const PITCHER_PERCENTILE_RANKS: FamilySpec = FamilySpec {
    family: MetricFamily::PitcherPercentileRanks,
    id_candidates: &["player_id"],
    fields: &[float("chase_percentile", &["chase_percent"])],
};

/// Table for a row-per-player family; `None` for families that need aggregation
pub fn spec_for(family: MetricFamily) -> Option<&'static FamilySpec> {
    match family {
        MetricFamily::BatterExpected => Some(&BATTER_EXPECTED),
        MetricFamily::BatterExitVelo => Some(&BATTER_EXIT_VELO),
        MetricFamily::SprintSpeed => Some(&SPRINT_SPEED),
        MetricFamily::BattingFanGraphs => Some(&BATTING_FANGRAPHS),
        MetricFamily::PitcherExpected => Some(&PITCHER_EXPECTED),
        MetricFamily::PitcherExitVelo => Some(&PITCHER_EXIT_VELO),
        MetricFamily::PitchingFanGraphs => Some(&PITCHING_FANGRAPHS),
        MetricFamily::PitcherPercentileRanks => Some(&PITCHER_PERCENTILE_RANKS),
        MetricFamily::PitcherArsenalStats | MetricFamily::PitchArsenal => None,
    }
}

fn extract_value(row: &Row, field: &FieldSpec) -> StatValue {
    match field.kind {
        FieldKind::Float => StatValue::Float(float_field(row, field.candidates)),
        FieldKind::Int => StatValue::Int(int_field(row, field.candidates)),
        FieldKind::Percent => {
            StatValue::Float(round_to(float_field(row, field.candidates) * 100.0, 1))
        }
    }
}

/// Resolve the canonical ID of a row; 0 when unresolved
pub fn row_player_id(row: &Row, id_candidates: &[&str], ids: &dyn IdTranslator) -> PlayerId {
    match int_field(row, id_candidates) {
        raw if raw > 0 => ids.translate(raw),
        _ => 0,
    }
}

/// Build partial records from a row-per-player family.
///
/// Rows without a resolvable player ID are dropped. When a player appears on
/// several rows the first one is kept.
pub fn extract_records(spec: &FamilySpec, rows: &[Row], ids: &dyn IdTranslator) -> FamilyRecords {
    let mut records = FamilyRecords::new();

    for row in rows {
        let player_id = row_player_id(row, spec.id_candidates, ids);
        if player_id == 0 {
            continue;
        }

        records.entry(player_id).or_insert_with(|| {
            spec.fields.iter().fold(PartialRecord::new(), |record, field| {
                record.with(field.name, extract_value(row, field))
            })
        });
    }

    records
}

/// Pitch classes used for run-value splits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PitchClass {
    Fastball,
    Breaking,
    Offspeed,
}

impl PitchClass {
    pub fn of(pitch_code: &str) -> Option<Self> {
        match pitch_code.to_ascii_uppercase().as_str() {
            "FF" | "SI" | "FA" | "FC" => Some(PitchClass::Fastball),
            "SL" | "CU" | "KC" | "ST" | "SV" | "CS" => Some(PitchClass::Breaking),
            "CH" | "FS" | "FO" | "SC" | "KN" | "EP" => Some(PitchClass::Offspeed),
            _ => None,
        }
    }
}

#[derive(Default)]
struct ArsenalAccumulator {
    rows: Vec<(i64, f64, f64, Option<PitchClass>)>,
}

/// Aggregate per-pitch arsenal rows into one record per pitcher.
///
/// Whiff rate is weighted by pitch count; run values are summed overall and
/// per pitch class.
pub fn aggregate_arsenal_stats(rows: &[Row]) -> FamilyRecords {
    let mut by_pitcher: BTreeMap<PlayerId, ArsenalAccumulator> = BTreeMap::new();

    for row in rows {
        let player_id = row_player_id(row, &["player_id"], &crate::models::MlbamIds);
        if player_id == 0 {
            continue;
        }
        let pitch_type = text_field(row, &["pitch_type"]);
        by_pitcher.entry(player_id).or_default().rows.push((
            int_field(row, &["pitches"]),
            float_field(row, &["whiff_percent"]),
            float_field(row, &["run_value"]),
            PitchClass::of(&pitch_type),
        ));
    }

    let mut records = FamilyRecords::new();
    for (player_id, acc) in by_pitcher {
        let total_pitches: i64 = acc.rows.iter().map(|(pitches, ..)| *pitches).sum();
        if total_pitches <= 0 {
            continue;
        }

        let mut weighted_whiff = 0.0;
        let mut total_rv = 0.0;
        let (mut fastball_rv, mut breaking_rv, mut offspeed_rv) = (0.0, 0.0, 0.0);

        for (pitches, whiff, run_value, class) in &acc.rows {
            weighted_whiff += whiff * (*pitches as f64 / total_pitches as f64);
            total_rv += run_value;
            match class {
                Some(PitchClass::Fastball) => fastball_rv += run_value,
                Some(PitchClass::Breaking) => breaking_rv += run_value,
                Some(PitchClass::Offspeed) => offspeed_rv += run_value,
                None => {}
            }
        }

        let record = PartialRecord::new()
            .with("whiff_pct", StatValue::Float(round_to(weighted_whiff, 1)))
            .with("pitching_run_value", StatValue::Float(round_to(total_rv, 1)))
            .with("fastball_run_value", StatValue::Float(round_to(fastball_rv, 1)))
            .with("breaking_run_value", StatValue::Float(round_to(breaking_rv, 1)))
            .with("offspeed_run_value", StatValue::Float(round_to(offspeed_rv, 1)));
        records.insert(player_id, record);
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MlbamIds;
    use serde_json::json;
    use std::collections::HashMap;

    fn rows(values: Vec<serde_json::Value>) -> Vec<Row> {
        values.into_iter().map(|v| v.as_object().cloned().unwrap()).collect()
    }

    struct FixedCrosswalk(HashMap<i64, PlayerId>);

    impl IdTranslator for FixedCrosswalk {
        fn translate(&self, source_id: i64) -> PlayerId {
            self.0.get(&source_id).copied().unwrap_or(0)
        }
    }

    #[test]
    fn test_expected_stats_extraction() {
        let rows = rows(vec![
            json!({"player_id": "592450", "pa": "612", "est_woba": "0.4116", "est_ba": ".301"}),
            json!({"player_id": "0", "pa": "100"}),
            json!({"pa": "100"}),
        ]);

        let records = extract_records(&BATTER_EXPECTED, &rows, &MlbamIds);
        assert_eq!(records.len(), 1);

        let judge = &records[&592450];
        assert_eq!(judge.int("pa"), 612);
        assert_eq!(judge.float("xwoba"), 0.412);
        assert_eq!(judge.float("xba"), 0.301);
        assert_eq!(judge.float("xslg"), 0.0);
    }

    #[test]
    fn test_exit_velo_alternate_columns() {
        let rows = rows(vec![json!({
            "batter": 605141,
            "exit_velocity_avg": 92.1,
            "barrel_batted_rate": 15.2,
            "batted_balls": 380
        })]);

        let records = extract_records(&BATTER_EXIT_VELO, &rows, &MlbamIds);
        let record = &records[&605141];
        assert_eq!(record.float("avg_exit_velo"), 92.1);
        assert_eq!(record.float("barrel_pct"), 15.2);
        assert_eq!(record.int("attempts"), 380);
        assert_eq!(record.float("max_exit_velo"), 0.0);
    }

    #[test]
    fn test_fangraphs_percentages_and_crosswalk() {
        let rows = rows(vec![
            json!({"IDfg": 15640, "K%": 0.2531, "BB%": 0.091, "O-Swing%": 0.284, "SwStr%": 0.118}),
            json!({"IDfg": 99999, "K%": 0.2}),
        ]);
        let crosswalk = FixedCrosswalk(HashMap::from([(15640, 592450)]));

        let records = extract_records(&BATTING_FANGRAPHS, &rows, &crosswalk);
        assert_eq!(records.len(), 1);

        let record = &records[&592450];
        assert_eq!(record.float("k_pct"), 25.3);
        assert_eq!(record.float("bb_pct"), 9.1);
        assert_eq!(record.float("chase_pct"), 28.4);
        assert_eq!(record.float("whiff_pct"), 11.8);
    }

    #[test]
    fn test_first_row_per_player_wins() {
        let rows = rows(vec![
            json!({"player_id": 1, "sprint_speed": 28.5}),
            json!({"player_id": 1, "sprint_speed": 30.0}),
        ]);
        let records = extract_records(&SPRINT_SPEED, &rows, &MlbamIds);
        assert_eq!(records[&1].float("sprint_speed"), 28.5);
    }

    #[test]
    fn test_arsenal_stats_aggregation() {
        let rows = rows(vec![
            json!({"player_id": 543037, "pitch_type": "FF", "pitches": 600, "whiff_percent": 20.0, "run_value": 5.0}),
            json!({"player_id": 543037, "pitch_type": "SL", "pitches": 300, "whiff_percent": 40.0, "run_value": 7.5}),
            json!({"player_id": 543037, "pitch_type": "CH", "pitches": 100, "whiff_percent": 30.0, "run_value": -1.2}),
            json!({"player_id": 111, "pitch_type": "FF", "pitches": 0, "whiff_percent": 10.0, "run_value": 1.0}),
        ]);

        let records = aggregate_arsenal_stats(&rows);
        assert_eq!(records.len(), 1);

        let record = &records[&543037];
        // 20*0.6 + 40*0.3 + 30*0.1
        assert_eq!(record.float("whiff_pct"), 27.0);
        assert_eq!(record.float("pitching_run_value"), 11.3);
        assert_eq!(record.float("fastball_run_value"), 5.0);
        assert_eq!(record.float("breaking_run_value"), 7.5);
        assert_eq!(record.float("offspeed_run_value"), -1.2);
    }

    #[test]
    fn test_pitch_classes() {
        assert_eq!(PitchClass::of("si"), Some(PitchClass::Fastball));
        assert_eq!(PitchClass::of("ST"), Some(PitchClass::Breaking));
        assert_eq!(PitchClass::of("FS"), Some(PitchClass::Offspeed));
        assert_eq!(PitchClass::of("PO"), None);
    }
}
