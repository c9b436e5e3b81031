use std::sync::Arc;

use fleetwatch_common::clock::now_ms;
use fleetwatch_common::db::{create_pool, migrator};
use fleetwatch_common::ledger::{AlertLedger, MemoryLedger, PgLedger};
use fleetwatch_common::nats_config::StreamConfig;
use fleetwatch_common::retry::RetryConfig;
use fleetwatch_common::threshold::{loader, PgThresholdRepo, ThresholdRule, ThresholdStore};
use fleetwatch_workers::alert::Evaluator;
use fleetwatch_workers::api::{self, ApiState};
use fleetwatch_workers::config::WorkerConfig;
use fleetwatch_workers::consumer::{connect_jetstream, create_pull_consumer, ensure_stream, ConsumerLoop};
use fleetwatch_workers::maintenance::{RetentionSweeper, ThresholdRefresher};
use fleetwatch_workers::metrics::worker_metrics::WorkerMetrics;
use fleetwatch_workers::notifier::{RetryNotifier, WebhookNotifier};
use fleetwatch_workers::pipeline::IngestPipeline;
use fleetwatch_workers::storage::SampleWriter;
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();

    let config = WorkerConfig::from_env();
    let worker_metrics = WorkerMetrics::new();

    let seeds: Vec<ThresholdRule> = match &config.thresholds_file {
        Some(path) => {
            let rules = loader::load_from_file(path, now_ms())?;
            tracing::info!(path = %path.display(), rules = rules.len(), "loaded threshold seed file");
            rules
        }
        None => Vec::new(),
    };
    let thresholds = ThresholdStore::new();

    let mut pipeline_writer = None;
    let mut background = Vec::new();
    let ledger: Arc<dyn AlertLedger> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url, config.db_max_connections).await?;
            let applied = migrator::run_migrations(&pool).await?;
            tracing::info!(applied = applied.len(), "database migrations complete");

            let repo = PgThresholdRepo::new(pool.clone());
            let added = repo.seed(&seeds).await?;
            thresholds.replace_all(repo.load_all().await?);
            tracing::info!(seeded = added, rules = thresholds.count(), "threshold rules loaded");

            let refresher = ThresholdRefresher {
                source: Arc::new(repo),
                store: thresholds.clone(),
                interval: config.threshold_refresh,
                metrics: worker_metrics.clone(),
            };
            background.push(refresher.spawn());

            pipeline_writer = Some(SampleWriter::new(pool.clone()));
            Arc::new(PgLedger::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, alerts are kept in memory and telemetry is not stored");
            thresholds.replace_all(seeds);
            Arc::new(MemoryLedger::new())
        }
    };

    let sweeper = RetentionSweeper {
        ledger: ledger.clone(),
        retention: config.alert_retention,
        interval: config.retention_interval,
        metrics: worker_metrics.clone(),
    };
    background.push(sweeper.spawn());

    let mut pipeline = IngestPipeline::new(Evaluator::new(thresholds), ledger.clone(), worker_metrics.clone());
    if let Some(writer) = pipeline_writer {
        pipeline = pipeline.with_writer(writer);
    }
    if let Some(url) = &config.webhook_url {
        let secret = config.webhook_secret.as_ref().map(|s| s.as_bytes().to_vec());
        let webhook = WebhookNotifier::new(url.clone(), secret)?;
        tracing::info!(url = %webhook.url(), "webhook notifications enabled");
        pipeline = pipeline.with_notifier(Arc::new(RetryNotifier::new(webhook, RetryConfig::default())));
    }
    let pipeline = Arc::new(pipeline);

    let api_state = ApiState {
        metrics: worker_metrics.clone(),
        ledger,
    };
    let listener = tokio::net::TcpListener::bind(&config.api_addr).await?;
    tracing::info!(api_addr = %config.api_addr, "worker API server starting");
    let api_handle = tokio::spawn(api::serve(listener, api_state));

    tracing::info!(url = %config.nats_url, "connecting to NATS JetStream");
    let js = connect_jetstream(&config.nats_url).await?;

    let stream_config = StreamConfig::default();
    ensure_stream(&js, &stream_config).await?;
    tracing::info!(stream = %stream_config.name, "stream ready");

    let consumer = create_pull_consumer(&js).await?;
    tracing::info!(batch_size = config.batch_size, "pull consumer ready, entering loop");

    let consumer_loop = ConsumerLoop::new(consumer, config.batch_size, worker_metrics);
    let consumer_handle = tokio::spawn(async move {
        consumer_loop
            .run(|samples| {
                let pipeline = pipeline.clone();
                async move { pipeline.process_message(&samples).await.map(|_| ()) }
            })
            .await
    });

    tokio::select! {
        r = api_handle => {
            match r {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!(error = %e, "API server stopped"),
                Err(e) => tracing::error!(error = %e, "API join"),
            }
        }
        r = consumer_handle => {
            match r {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!(error = %e, "consumer stopped"),
                Err(e) => tracing::error!(error = %e, "consumer join"),
            }
        }
    }

    for task in background {
        task.abort();
    }
    Ok(())
}
