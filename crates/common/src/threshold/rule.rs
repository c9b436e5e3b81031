use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::ThresholdError;
use crate::sample::{validate_metric_type, validate_source_id};
use crate::severity::Severity;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Scope {
    #[default]
    Global,
    Source(String),
}

impl Scope {
    pub fn source_id(&self) -> Option<&str> {
        match self {
            Self::Global => None,
            Self::Source(id) => Some(id),
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global)
    }
}

impl From<Option<String>> for Scope {
    fn from(source_id: Option<String>) -> Self {
        match source_id {
            Some(id) => Self::Source(id),
            None => Self::Global,
        }
    }
}

impl Serialize for Scope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.source_id().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Scope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<String>::deserialize(deserializer).map(Scope::from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleKey {
    pub metric_type: String,
    pub scope: Scope,
}

impl RuleKey {
    pub fn global(metric_type: &str) -> Self {
        Self {
            metric_type: metric_type.to_string(),
            scope: Scope::Global,
        }
    }

    pub fn source(metric_type: &str, source_id: &str) -> Self {
        Self {
            metric_type: metric_type.to_string(),
            scope: Scope::Source(source_id.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRule {
    pub id: String,
    pub metric_type: String,
    #[serde(rename = "source_id", default)]
    pub scope: Scope,
    pub warning_value: f64,
    pub critical_value: f64,
    pub enabled: bool,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

impl ThresholdRule {
    pub fn key(&self) -> RuleKey {
        RuleKey {
            metric_type: self.metric_type.clone(),
            scope: self.scope.clone(),
        }
    }

    pub fn classify(&self, value: f64) -> Option<(Severity, f64)> {
        if !value.is_finite() {
            return None;
        }
        if value >= self.critical_value {
            Some((Severity::Critical, self.critical_value))
        } else if value >= self.warning_value {
            Some((Severity::Warning, self.warning_value))
        } else {
            None
        }
    }

    pub fn validate(&self) -> Result<(), ThresholdError> {
        validate_metric_type(&self.metric_type).map_err(ThresholdError::InvalidInput)?;
        if let Scope::Source(id) = &self.scope {
            validate_source_id(id).map_err(ThresholdError::InvalidInput)?;
        }
        validate_pair(self.warning_value, self.critical_value)
    }
}

fn validate_pair(warning: f64, critical: f64) -> Result<(), ThresholdError> {
    if !warning.is_finite() || !critical.is_finite() {
        return Err(ThresholdError::InvalidInput(
            "warning_value and critical_value must be finite numbers".into(),
        ));
    }
    if warning >= critical {
        return Err(ThresholdError::InvalidInput(format!(
            "warning_value ({warning}) must be lower than critical_value ({critical})"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdDraft {
    pub metric_type: String,
    #[serde(default)]
    pub source_id: Option<String>,
    pub warning_value: f64,
    pub critical_value: f64,
    #[serde(default)]
    pub enabled: Option<bool>,
}

impl ThresholdDraft {
    pub fn into_rule(self, id: String, now_ms: i64) -> Result<ThresholdRule, ThresholdError> {
        let rule = ThresholdRule {
            id,
            metric_type: self.metric_type.trim().to_string(),
            scope: Scope::from(self.source_id.map(|s| s.trim().to_string())),
            warning_value: self.warning_value,
            critical_value: self.critical_value,
            enabled: self.enabled.unwrap_or(true),
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        };
        rule.validate()?;
        Ok(rule)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdPatch {
    pub warning_value: Option<f64>,
    pub critical_value: Option<f64>,
    pub enabled: Option<bool>,
}

impl ThresholdPatch {
    pub fn apply(&self, existing: &ThresholdRule, now_ms: i64) -> Result<ThresholdRule, ThresholdError> {
        let updated = ThresholdRule {
            warning_value: self.warning_value.unwrap_or(existing.warning_value),
            critical_value: self.critical_value.unwrap_or(existing.critical_value),
            enabled: self.enabled.unwrap_or(existing.enabled),
            updated_at_ms: now_ms,
            ..existing.clone()
        };
        validate_pair(updated.warning_value, updated.critical_value)?;
        Ok(updated)
    }
}
