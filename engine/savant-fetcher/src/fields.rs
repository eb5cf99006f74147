//! Tolerant field access over provider rows

use crate::provider::Row;
use serde_json::Value;

/// Round to a fixed number of decimal digits
pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

/// First candidate column that is present and not null
pub fn lookup<'a>(row: &'a Row, candidates: &[&str]) -> Option<&'a Value> {
    candidates.iter().find_map(|name| match row.get(*name) {
        Some(Value::Null) | None => None,
        Some(value) => Some(value),
    })
}

fn as_finite_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

/// Float coercion: missing or non-numeric yields `default`, otherwise rounded to 3 digits
pub fn safe_float(value: Option<&Value>, default: f64) -> f64 {
    value.and_then(as_finite_f64).map(|v| round_to(v, 3)).unwrap_or(default)
}

/// Integer coercion: missing or non-numeric yields `default`, fractions truncate
pub fn safe_int(value: Option<&Value>, default: i64) -> i64 {
    match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().filter(|v| v.is_finite()).map(|v| v as i64)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v as i64))
        }
        _ => None,
    }
    .unwrap_or(default)
}

/// Float from the first present candidate column
pub fn float_field(row: &Row, candidates: &[&str]) -> f64 {
    safe_float(lookup(row, candidates), 0.0)
}

/// Integer from the first present candidate column
pub fn int_field(row: &Row, candidates: &[&str]) -> i64 {
    safe_int(lookup(row, candidates), 0)
}

/// Text from the first present candidate column, empty when absent
pub fn text_field(row: &Row, candidates: &[&str]) -> String {
    match lookup(row, candidates) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_primary_name_wins() {
        let r = row(json!({"avg_hit_speed": "91.23456", "exit_velocity_avg": "80.0"}));
        assert_eq!(float_field(&r, &["avg_hit_speed", "exit_velocity_avg"]), 91.235);
    }

    #[test]
    fn test_falls_back_to_alternate_name() {
        let r = row(json!({"exit_velocity_avg": 88.4}));
        assert_eq!(float_field(&r, &["avg_hit_speed", "exit_velocity_avg"]), 88.4);
    }

    #[test]
    fn test_present_but_blank_does_not_fall_back() {
        let r = row(json!({"avg_hit_speed": "", "exit_velocity_avg": 88.4}));
        assert_eq!(float_field(&r, &["avg_hit_speed", "exit_velocity_avg"]), 0.0);
    }

    #[test]
    fn test_missing_and_nan_default() {
        let r = row(json!({"sprint_speed": "NaN", "pa": "abc"}));
        assert_eq!(float_field(&r, &["sprint_speed"]), 0.0);
        assert_eq!(float_field(&r, &["nope"]), 0.0);
        assert_eq!(int_field(&r, &["pa"]), 0);
        assert_eq!(safe_float(None, 1.5), 1.5);
    }

    #[test]
    fn test_int_coercion_truncates() {
        assert_eq!(safe_int(Some(&json!(150.0)), 0), 150);
        assert_eq!(safe_int(Some(&json!("42")), 0), 42);
        assert_eq!(safe_int(Some(&json!("12.9")), 0), 12);
        assert_eq!(safe_int(Some(&json!(null)), 7), 7);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(23.456, 1), 23.5);
        assert_eq!(round_to(0.33349, 3), 0.333);
    }
}
