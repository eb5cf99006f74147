//! Pitch arsenal shaping from the per-pitcher speed/usage leaderboards

use crate::families::row_player_id;
use crate::fields::{float_field, round_to};
use crate::models::{ArsenalRecords, MlbamIds, PitchEntry, PlayerId};
use crate::provider::{ArsenalKind, Row};
use std::collections::HashMap;

/// Pitch codes in leaderboard column order
pub const PITCH_CODES: [&str; 16] =
    ["ff", "si", "fc", "sl", "ch", "cu", "fs", "kn", "st", "sv", "kc", "cs", "sc", "ep", "fo", "fa"];

/// Pitches thrown less often than this (percent) are left out
pub const MIN_USAGE_PCT: f64 = 3.0;

/// Maximum number of pitches kept per pitcher
pub const MAX_PITCHES: usize = 6;

const PITCHER_IDS: &[&str] = &["pitcher", "player_id"];

/// Display name for a pitch code
pub fn pitch_name(code: &str) -> String {
    let name = match code {
        "ff" => "Four-Seam Fastball",
        "si" => "Sinker",
        "fc" => "Cutter",
        "sl" => "Slider",
        "ch" => "Changeup",
        "cu" => "Curveball",
        "fs" => "Splitter",
        "kn" => "Knuckleball",
        "st" => "Sweeper",
        "sv" => "Slurve",
        "kc" => "Knuckle Curve",
        "cs" => "Slow Curve",
        "sc" => "Screwball",
        "ep" => "Eephus",
        "fo" => "Forkball",
        "fa" => "Fastball",
        other => return other.to_uppercase(),
    };
    name.to_string()
}

fn index_by_pitcher(rows: &[Row]) -> HashMap<PlayerId, &Row> {
    let mut index = HashMap::new();
    for row in rows {
        let id = row_player_id(row, PITCHER_IDS, &MlbamIds);
        if id != 0 {
            index.entry(id).or_insert(row);
        }
    }
    index
}

fn present(row: &Row, column: &str) -> Option<f64> {
    let value = crate::fields::lookup(row, &[column])?;
    let parsed = crate::fields::safe_float(Some(value), f64::NAN);
    (!parsed.is_nan()).then_some(parsed)
}

/// Normalize usage to sum to 100, pushing the rounding residual onto the first pitch
fn normalize_usage(pitches: &mut [PitchEntry]) {
    let total: f64 = pitches.iter().map(|p| p.usage).sum();
    if total <= 0.0 || pitches.is_empty() {
        return;
    }

    for pitch in pitches.iter_mut() {
        pitch.usage = round_to(pitch.usage / total * 100.0, 1);
    }

    let diff = 100.0 - pitches.iter().map(|p| p.usage).sum::<f64>();
    if diff.abs() > 0.1 {
        pitches[0].usage = round_to(pitches[0].usage + diff, 1);
    }
}

/// Build one season's arsenals from the speed, usage and (optional) spin tables.
///
/// Pitchers present in the speed table but not in the usage table, or with no
/// pitch above the usage floor, are left out.
pub fn build_arsenals(speed_rows: &[Row], usage_rows: &[Row], spin_rows: &[Row]) -> ArsenalRecords {
    let usage_index = index_by_pitcher(usage_rows);
    let spin_index = index_by_pitcher(spin_rows);
    let mut arsenals = ArsenalRecords::new();

    for speed_row in speed_rows {
        let pitcher_id = row_player_id(speed_row, PITCHER_IDS, &MlbamIds);
        if pitcher_id == 0 || arsenals.contains_key(&pitcher_id) {
            continue;
        }
        let Some(usage_row) = usage_index.get(&pitcher_id) else {
            continue;
        };
        let spin_row = spin_index.get(&pitcher_id);

        let mut pitches: Vec<PitchEntry> = PITCH_CODES
            .iter()
            .filter_map(|code| {
                let speed = present(speed_row, &ArsenalKind::AvgSpeed.column(code))?;
                let usage = present(usage_row, &ArsenalKind::Usage.column(code))?;
                if usage < MIN_USAGE_PCT {
                    return None;
                }
                let spin = spin_row
                    .map(|row| float_field(row, &[ArsenalKind::AvgSpin.column(code).as_str()]))
                    .unwrap_or(0.0);
                Some(PitchEntry {
                    pitch_type: pitch_name(code),
                    speed: round_to(speed, 1),
                    usage: round_to(usage, 1),
                    spin: spin.round(),
                    extension: 0.0,
                })
            })
            .collect();

        pitches.sort_by(|a, b| b.usage.total_cmp(&a.usage));
        pitches.truncate(MAX_PITCHES);
        normalize_usage(&mut pitches);

        if !pitches.is_empty() {
            arsenals.insert(pitcher_id, pitches);
        }
    }

    arsenals
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_build_arsenal_filters_sorts_and_normalizes() {
        let speed = vec![row(json!({
            "pitcher": "477132",
            "ff_avg_speed": "93.26",
            "sl_avg_speed": "87.9",
            "ch_avg_speed": "85.1",
            "cu_avg_speed": "78.0"
        }))];
        let usage = vec![row(json!({
            "pitcher": "477132",
            "n_ff": "48.0",
            "n_sl": "30.0",
            "n_ch": "20.0",
            "n_cu": "2.0"
        }))];
        let spin = vec![row(json!({"pitcher": "477132", "ff_avg_spin": "2301.4"}))];

        let arsenals = build_arsenals(&speed, &usage, &spin);
        let arsenal = &arsenals[&477132];

        assert_eq!(arsenal.len(), 3);
        assert_eq!(arsenal[0].pitch_type, "Four-Seam Fastball");
        assert_eq!(arsenal[0].speed, 93.3);
        assert_eq!(arsenal[0].spin, 2301.0);
        assert_eq!(arsenal[1].pitch_type, "Slider");
        assert_eq!(arsenal[1].spin, 0.0);

        let total: f64 = arsenal.iter().map(|p| p.usage).sum();
        assert!((total - 100.0).abs() <= 0.1 + 1e-9);
        assert_eq!(arsenal[0].usage, 49.0);
    }

    #[test]
    fn test_pitcher_missing_from_usage_is_skipped() {
        let speed = vec![row(json!({"pitcher": 1, "ff_avg_speed": 95.0}))];
        let usage = vec![row(json!({"pitcher": 2, "n_ff": 100.0}))];
        assert!(build_arsenals(&speed, &usage, &[]).is_empty());
    }

    #[test]
    fn test_keeps_at_most_six_pitches() {
        let mut speed = json!({"pitcher": 5});
        let mut usage = json!({"pitcher": 5});
        for code in PITCH_CODES.iter().take(8) {
            speed[format!("{code}_avg_speed")] = json!(90.0);
            usage[format!("n_{code}")] = json!(12.5);
        }

        let arsenals = build_arsenals(&[row(speed)], &[row(usage)], &[]);
        assert_eq!(arsenals[&5].len(), MAX_PITCHES);
    }

    #[test]
    fn test_unknown_code_name() {
        assert_eq!(pitch_name("xx"), "XX");
        assert_eq!(pitch_name("st"), "Sweeper");
    }
}
