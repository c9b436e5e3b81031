use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    duration_ms: i64,
}

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;
const WEEK_MS: i64 = 7 * DAY_MS;

impl TimeRange {
    pub fn from_ms(duration_ms: i64) -> Self {
        Self { duration_ms }
    }

    pub fn duration_ms(&self) -> i64 {
        self.duration_ms
    }

    pub fn since_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.duration_ms)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvalidTimeRange(pub String);

impl fmt::Display for InvalidTimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid time_range '{}' (expected e.g. 30m, 24h, 7d, 2w)", self.0)
    }
}

impl std::error::Error for InvalidTimeRange {}

impl FromStr for TimeRange {
    type Err = InvalidTimeRange;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || InvalidTimeRange(s.to_string());
        let s = s.trim();
        if s.len() < 2 {
            return Err(err());
        }
        let (digits, unit) = s.split_at(s.len() - 1);
        let n: i64 = digits.parse().map_err(|_| err())?;
        if n <= 0 {
            return Err(err());
        }
        let unit_ms = match unit {
            "m" => MINUTE_MS,
            "h" => HOUR_MS,
            "d" => DAY_MS,
            "w" => WEEK_MS,
            _ => return Err(err()),
        };
        n.checked_mul(unit_ms).map(Self::from_ms).ok_or_else(err)
    }
}
