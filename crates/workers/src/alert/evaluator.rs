use fleetwatch_common::alert::NewAlert;
use fleetwatch_common::sample::TelemetrySample;
use fleetwatch_common::threshold::{ThresholdRule, ThresholdStore};

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    NoRule,
    Normal,
    Breach(NewAlert),
}

#[derive(Clone)]
pub struct Evaluator {
    thresholds: ThresholdStore,
}

impl Evaluator {
    pub fn new(thresholds: ThresholdStore) -> Self {
        Self { thresholds }
    }

    pub fn evaluate(&self, sample: &TelemetrySample) -> Verdict {
        let Some(rule) = self.thresholds.resolve(&sample.metric_type, &sample.source_id) else {
            return Verdict::NoRule;
        };
        match rule.classify(sample.value) {
            Some((severity, threshold_value)) => Verdict::Breach(NewAlert {
                source_id: Some(sample.source_id.clone()),
                metric_type: sample.metric_type.clone(),
                severity,
                triggering_value: sample.value,
                threshold_value,
                rule_id: Some(rule.id.clone()),
                message: breach_message(sample, &rule, threshold_value),
                created_at_ms: sample.timestamp_ms,
            }),
            None => Verdict::Normal,
        }
    }
}

fn breach_message(sample: &TelemetrySample, rule: &ThresholdRule, threshold: f64) -> String {
    let scope = if rule.scope.is_global() { "global" } else { "source" };
    format!(
        "{} on {} is {} (threshold {}, {} rule)",
        sample.metric_type, sample.source_id, sample.value, threshold, scope
    )
}
