use std::sync::Arc;

use fleetwatch_common::clock::now_ms;
use fleetwatch_common::db::{create_pool, migrator};
use fleetwatch_common::ledger::{AlertLedger, MemoryLedger, PgLedger};
use fleetwatch_common::threshold::{loader, PgThresholdRepo, ThresholdRule, ThresholdStore};
use fleetwatch_server::config::ServerConfig;
use fleetwatch_server::metrics::server_metrics::ServerMetrics;
use fleetwatch_server::middleware::RateLimiter;
use fleetwatch_server::rest::{self, AppState};
use fleetwatch_server::store::ThresholdService;
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env();

    let seeds: Vec<ThresholdRule> = match &config.thresholds_file {
        Some(path) => {
            let rules = loader::load_from_file(path, now_ms())?;
            tracing::info!(path = %path.display(), rules = rules.len(), "loaded threshold seed file");
            rules
        }
        None => Vec::new(),
    };
    let store = ThresholdStore::new();

    let (ledger, thresholds): (Arc<dyn AlertLedger>, ThresholdService) = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url, config.db_max_connections).await?;
            let applied = migrator::run_migrations(&pool).await?;
            tracing::info!(applied = applied.len(), "database migrations complete");

            let repo = PgThresholdRepo::new(pool.clone());
            let added = repo.seed(&seeds).await?;
            store.replace_all(repo.load_all().await?);
            tracing::info!(seeded = added, rules = store.count(), "threshold rules loaded");

            (Arc::new(PgLedger::new(pool)), ThresholdService::persistent(store, repo))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, alerts and thresholds are kept in memory");
            store.replace_all(seeds);
            (Arc::new(MemoryLedger::new()), ThresholdService::in_memory(store))
        }
    };

    if config.jwt_secret.is_none() {
        tracing::warn!("JWT_SECRET not set, /v1 routes accept unauthenticated requests");
    }

    let state = AppState {
        ledger,
        thresholds,
        metrics: ServerMetrics::new(),
        jwt_secret: config.jwt_secret,
        rate_limiter: RateLimiter::new(config.rate_limit_rps),
    };
    let app = rest::router(state);

    let listener = tokio::net::TcpListener::bind(config.rest_addr).await?;
    tracing::info!(rest_addr = %config.rest_addr, "REST server starting");
    axum::serve(listener, app).await?;
    Ok(())
}
