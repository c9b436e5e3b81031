use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub rest_addr: SocketAddr,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub jwt_secret: Option<Vec<u8>>,
    pub rate_limit_rps: u64,
    pub thresholds_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            rest_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_url: None,
            db_max_connections: 5,
            jwt_secret: None,
            rate_limit_rps: 100,
            thresholds_file: None,
        }
    }
}

impl ServerConfig {
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
            rest_addr: get("REST_ADDR")
                .and_then(|v| parse(&v))
                .unwrap_or(d.rest_addr),
            database_url: get("DATABASE_URL"),
            db_max_connections: get("DB_MAX_CONNECTIONS")
                .and_then(|v| parse::<u32>(&v))
                .filter(|n| *n > 0)
                .unwrap_or(d.db_max_connections),
            jwt_secret: get("JWT_SECRET").map(String::into_bytes),
            rate_limit_rps: get("RATE_LIMIT_RPS")
                .and_then(|v| parse::<u64>(&v))
                .filter(|n| *n > 0)
                .unwrap_or(d.rate_limit_rps),
            thresholds_file: get("THRESHOLDS_FILE").map(PathBuf::from),
        }
    }
}

fn parse<T: FromStr>(raw: &str) -> Option<T> {
    raw.trim().parse().ok()
}
