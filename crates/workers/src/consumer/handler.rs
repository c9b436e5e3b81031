use async_nats::jetstream::consumer::PullConsumer;
use async_nats::jetstream::Message;
use futures::StreamExt;
use serde::Deserialize;
use std::collections::BTreeMap;

use fleetwatch_common::nats_config::source_from_subject;
use fleetwatch_common::sample::{
    validate_metric_type, validate_source_id, validate_timestamp_ms, TelemetrySample,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    Json(String),
    MissingSource,
    InvalidSample(String),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(e) => write!(f, "json: {e}"),
            Self::MissingSource => write!(f, "no source_id in payload or subject"),
            Self::InvalidSample(e) => write!(f, "invalid sample: {e}"),
        }
    }
}

impl std::error::Error for DecodeError {}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Payload {
    Frame {
        source_id: Option<String>,
        #[serde(alias = "timestamp")]
        timestamp_ms: Option<i64>,
        metrics: BTreeMap<String, f64>,
    },
    Sample {
        source_id: Option<String>,
        metric_type: String,
        value: f64,
        #[serde(alias = "timestamp")]
        timestamp_ms: Option<i64>,
    },
}

pub fn decode_samples(
    payload: &[u8],
    subject: &str,
    received_at_ms: i64,
) -> Result<Vec<TelemetrySample>, DecodeError> {
    let payload: Payload =
        serde_json::from_slice(payload).map_err(|e| DecodeError::Json(e.to_string()))?;

    let (source_id, timestamp_ms, readings) = match payload {
        Payload::Frame {
            source_id,
            timestamp_ms,
            metrics,
        } => (source_id, timestamp_ms, metrics.into_iter().collect::<Vec<_>>()),
        Payload::Sample {
            source_id,
            metric_type,
            value,
            timestamp_ms,
        } => (source_id, timestamp_ms, vec![(metric_type, value)]),
    };

    let source_id = source_id
        .or_else(|| source_from_subject(subject).map(str::to_string))
        .ok_or(DecodeError::MissingSource)?;
    validate_source_id(&source_id).map_err(DecodeError::InvalidSample)?;

    if readings.is_empty() {
        return Err(DecodeError::InvalidSample("frame carries no metrics".into()));
    }

    let timestamp_ms = timestamp_ms.unwrap_or(received_at_ms);
    validate_timestamp_ms(timestamp_ms).map_err(DecodeError::InvalidSample)?;
    readings
        .into_iter()
        .map(|(metric_type, value)| {
            validate_metric_type(&metric_type).map_err(DecodeError::InvalidSample)?;
            if !value.is_finite() {
                return Err(DecodeError::InvalidSample(format!(
                    "{metric_type} value is not a finite number"
                )));
            }
            Ok(TelemetrySample::new(source_id.clone(), metric_type, value, timestamp_ms))
        })
        .collect()
}

pub fn decode_message(msg: &Message, received_at_ms: i64) -> Result<Vec<TelemetrySample>, DecodeError> {
    decode_samples(msg.payload.as_ref(), msg.subject.as_str(), received_at_ms)
}

pub async fn pull_batch(consumer: &PullConsumer, max_messages: usize) -> Result<Vec<Message>, BoxError> {
    let mut messages = consumer.fetch().max_messages(max_messages).messages().await?;
    let mut batch = Vec::with_capacity(max_messages);
    while let Some(next) = messages.next().await {
        match next {
            Ok(msg) => batch.push(msg),
            Err(e) => {
                tracing::warn!(error = %e, "fetch interrupted");
                break;
            }
        }
    }
    Ok(batch)
}
