use std::sync::Arc;

use fleetwatch_common::alert::AlertFilter;
use fleetwatch_common::ledger::{AlertLedger, MemoryLedger};
use fleetwatch_common::threshold::{loader, ThresholdStore};
use fleetwatch_common::Severity;
use fleetwatch_workers::alert::Evaluator;
use fleetwatch_workers::consumer::decode_samples;
use fleetwatch_workers::metrics::worker_metrics::WorkerMetrics;
use fleetwatch_workers::pipeline::{IngestOutcome, IngestPipeline};

const RULES: &str = r#"
thresholds:
  - metric_type: temperature
    warning_value: 60
    critical_value: 75
  - metric_type: temperature
    source_id: robot-hot
    warning_value: 85
    critical_value: 95
  - metric_type: battery_drain
    warning_value: 5
    critical_value: 10
    enabled: false
"#;

struct Harness {
    store: ThresholdStore,
    ledger: Arc<MemoryLedger>,
    pipeline: IngestPipeline,
    metrics: Arc<WorkerMetrics>,
}

fn harness() -> Harness {
    let rules = loader::load_from_str(RULES, 0).unwrap();
    let store = ThresholdStore::with_rules(rules).unwrap();
    let ledger = Arc::new(MemoryLedger::new());
    let metrics = WorkerMetrics::new();
    let pipeline = IngestPipeline::new(Evaluator::new(store.clone()), ledger.clone(), metrics.clone());
    Harness {
        store,
        ledger,
        pipeline,
        metrics,
    }
}

async fn ingest(h: &Harness, subject: &str, body: &str) -> Vec<IngestOutcome> {
    let samples = decode_samples(body.as_bytes(), subject, 10_000).unwrap();
    h.pipeline.process_message(&samples).await.unwrap()
}

#[tokio::test]
async fn critical_sample_from_bus_creates_one_alert() {
    let h = harness();
    ingest(
        &h,
        "fleet.telemetry.source_A",
        r#"{"metric_type":"temperature","value":82,"timestamp_ms":1000}"#,
    )
    .await;

    let alerts = h.ledger.list(&AlertFilter::default()).await.unwrap();
    assert_eq!(alerts.len(), 1);
    let alert = &alerts[0];
    assert_eq!(alert.source_id.as_deref(), Some("source_A"));
    assert_eq!(alert.severity, Severity::Critical);
    assert_eq!(alert.triggering_value, 82.0);
    assert_eq!(alert.threshold_value, 75.0);
    assert!(!alert.acknowledged && !alert.resolved);
}

#[tokio::test]
async fn repeated_breaches_do_not_duplicate() {
    let h = harness();
    for (value, at) in [(66, 1000), (70, 2000), (64, 3000)] {
        ingest(
            &h,
            "fleet.telemetry.robot-1",
            &format!(r#"{{"metric_type":"temperature","value":{value},"timestamp_ms":{at}}}"#),
        )
        .await;
    }
    assert_eq!(h.ledger.count(), 1);
    assert_eq!(h.metrics.alerts_suppressed_val(), 2);
}

#[tokio::test]
async fn source_override_and_disabled_rule() {
    let h = harness();
    let outcomes = ingest(
        &h,
        "fleet.telemetry.robot-hot",
        r#"{"timestamp_ms":1000,"metrics":{"temperature":80,"battery_drain":50}}"#,
    )
    .await;

    assert_eq!(outcomes, vec![IngestOutcome::NoRule, IngestOutcome::Normal]);
    assert_eq!(h.ledger.count(), 0);
}

#[tokio::test]
async fn resolving_reopens_alerting() {
    let h = harness();
    let first = ingest(
        &h,
        "fleet.telemetry.robot-1",
        r#"{"metric_type":"temperature","value":66,"timestamp_ms":1000}"#,
    )
    .await;
    let IngestOutcome::Created(alert) = &first[0] else {
        panic!("expected Created, got {first:?}");
    };

    h.ledger.resolve(&alert.id, 1500).await.unwrap();
    let second = ingest(
        &h,
        "fleet.telemetry.robot-1",
        r#"{"metric_type":"temperature","value":66,"timestamp_ms":2000}"#,
    )
    .await;
    assert!(matches!(second[0], IngestOutcome::Created(_)));
}

#[tokio::test]
async fn fleet_stats_after_mixed_traffic() {
    let h = harness();
    for (robot, value) in [("r1", 65), ("r2", 62), ("r3", 80), ("r4", 90)] {
        ingest(
            &h,
            &format!("fleet.telemetry.{robot}"),
            &format!(r#"{{"metric_type":"temperature","value":{value},"timestamp_ms":1000}}"#),
        )
        .await;
    }
    let resolved = h
        .ledger
        .list(&AlertFilter {
            source_id: Some("r4".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    h.ledger.resolve(&resolved[0].id, 2000).await.unwrap();

    let stats = h.ledger.stats(None).await.unwrap();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.critical, 2);
    assert_eq!(stats.warning, 2);
    assert_eq!(stats.unresolved, 3);
}

#[tokio::test]
async fn rule_change_leaves_raised_alert_untouched() {
    let h = harness();
    let first = ingest(
        &h,
        "fleet.telemetry.robot-1",
        r#"{"metric_type":"temperature","value":82,"timestamp_ms":1000}"#,
    )
    .await;
    let IngestOutcome::Created(raised) = &first[0] else {
        panic!("expected Created, got {first:?}");
    };
    assert_eq!(raised.severity, Severity::Critical);

    let mut rule = h
        .store
        .resolve("temperature", "robot-1")
        .expect("global temperature rule");
    rule.warning_value = 85.0;
    rule.critical_value = 95.0;
    h.store.update(rule).unwrap();

    let second = ingest(
        &h,
        "fleet.telemetry.robot-1",
        r#"{"metric_type":"temperature","value":82,"timestamp_ms":2000}"#,
    )
    .await;
    assert_eq!(second, vec![IngestOutcome::Normal]);

    let stored = h.ledger.get(&raised.id).await.unwrap();
    assert_eq!(stored.severity, Severity::Critical);
    assert_eq!(stored.threshold_value, 75.0);
    assert_eq!(stored.triggering_value, 82.0);
    assert_eq!(stored.message, raised.message);
    assert!(!stored.resolved);
}
