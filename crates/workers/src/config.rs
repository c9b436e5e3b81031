use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub nats_url: String,
    pub batch_size: usize,
    pub api_addr: String,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub thresholds_file: Option<PathBuf>,
    pub threshold_refresh: Duration,
    pub webhook_url: Option<String>,
    pub webhook_secret: Option<String>,
    pub alert_retention: Duration,
    pub retention_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            nats_url: "nats://127.0.0.1:4222".into(),
            batch_size: 50,
            api_addr: "0.0.0.0:9090".into(),
            database_url: None,
            db_max_connections: 5,
            thresholds_file: None,
            threshold_refresh: Duration::from_secs(30),
            webhook_url: None,
            webhook_secret: None,
            alert_retention: Duration::from_secs(30 * 86_400),
            retention_interval: Duration::from_secs(3600),
        }
    }
}

impl WorkerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let d = Self::default();

        Self {
            nats_url: get("NATS_URL").unwrap_or(d.nats_url),
            batch_size: get("BATCH_SIZE")
                .and_then(|v| parse::<usize>(&v))
                .filter(|n| *n > 0)
                .unwrap_or(d.batch_size),
            api_addr: get("WORKER_API_ADDR").unwrap_or(d.api_addr),
            database_url: get("DATABASE_URL"),
            db_max_connections: get("DB_MAX_CONNECTIONS")
                .and_then(|v| parse::<u32>(&v))
                .filter(|n| *n > 0)
                .unwrap_or(d.db_max_connections),
            thresholds_file: get("THRESHOLDS_FILE").map(PathBuf::from),
            threshold_refresh: get("THRESHOLD_REFRESH_SECS")
                .and_then(|v| parse::<u64>(&v))
                .filter(|n| *n > 0)
                .map(Duration::from_secs)
                .unwrap_or(d.threshold_refresh),
            webhook_url: get("WEBHOOK_URL"),
            webhook_secret: get("WEBHOOK_SECRET"),
            alert_retention: get("ALERT_RETENTION_DAYS")
                .and_then(|v| parse::<u64>(&v))
                .and_then(|days| days.checked_mul(86_400))
                .map(Duration::from_secs)
                .unwrap_or(d.alert_retention),
            retention_interval: get("RETENTION_INTERVAL_SECS")
                .and_then(|v| parse::<u64>(&v))
                .filter(|n| *n > 0)
                .map(Duration::from_secs)
                .unwrap_or(d.retention_interval),
        }
    }
}

fn parse<T: FromStr>(raw: &str) -> Option<T> {
    raw.trim().parse().ok()
}
