use serde::{Deserialize, Serialize};

pub const MAX_METRIC_TYPE_LEN: usize = 64;
// 9999-12-31T23:59:59.999Z
pub const MAX_TIMESTAMP_MS: i64 = 253_402_300_799_999;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub source_id: String,
    pub metric_type: String,
    pub value: f64,
    pub timestamp_ms: i64,
}

impl TelemetrySample {
    pub fn new(source_id: impl Into<String>, metric_type: impl Into<String>, value: f64, timestamp_ms: i64) -> Self {
        Self {
            source_id: source_id.into(),
            metric_type: metric_type.into(),
            value,
            timestamp_ms,
        }
    }
}

pub fn validate_metric_type(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("metric_type must not be empty".into());
    }
    if name.len() > MAX_METRIC_TYPE_LEN {
        return Err(format!("metric_type must be at most {MAX_METRIC_TYPE_LEN} characters"));
    }
    let valid = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | '-'));
    if !valid {
        return Err(format!(
            "metric_type '{name}' may only contain lowercase letters, digits, '_', '.' and '-'"
        ));
    }
    Ok(())
}

pub fn validate_source_id(source_id: &str) -> Result<(), String> {
    if source_id.trim().is_empty() {
        return Err("source_id must not be empty".into());
    }
    if source_id.len() > 128 {
        return Err("source_id must be at most 128 characters".into());
    }
    Ok(())
}

pub fn validate_timestamp_ms(timestamp_ms: i64) -> Result<(), String> {
    if !(0..=MAX_TIMESTAMP_MS).contains(&timestamp_ms) {
        return Err(format!(
            "timestamp_ms {timestamp_ms} is outside 0..={MAX_TIMESTAMP_MS} (milliseconds since the epoch)"
        ));
    }
    Ok(())
}
