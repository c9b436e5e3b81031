use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;

use super::error::ThresholdError;
use super::rule::{RuleKey, ThresholdRule};

#[derive(Clone, Default)]
pub struct ThresholdStore {
    rules: Arc<DashMap<String, ThresholdRule>>,
    by_key: Arc<DashMap<RuleKey, String>>,
}

impl ThresholdStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<ThresholdRule>) -> Result<Self, ThresholdError> {
        let store = Self::new();
        for rule in rules {
            store.insert(rule)?;
        }
        Ok(store)
    }

    pub fn insert(&self, rule: ThresholdRule) -> Result<(), ThresholdError> {
        match self.by_key.entry(rule.key()) {
            Entry::Occupied(_) => Err(ThresholdError::Conflict(format!(
                "a rule for metric '{}' with this scope already exists",
                rule.metric_type
            ))),
            Entry::Vacant(slot) => {
                slot.insert(rule.id.clone());
                self.rules.insert(rule.id.clone(), rule);
                Ok(())
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<ThresholdRule> {
        self.rules.get(id).map(|r| r.clone())
    }

    pub fn list(&self) -> Vec<ThresholdRule> {
        let mut rules: Vec<ThresholdRule> = self.rules.iter().map(|r| r.value().clone()).collect();
        rules.sort_by(|a, b| {
            a.metric_type
                .cmp(&b.metric_type)
                .then_with(|| a.scope.source_id().cmp(&b.scope.source_id()))
        });
        rules
    }

    pub fn update(&self, rule: ThresholdRule) -> Result<(), ThresholdError> {
        let mut entry = self
            .rules
            .get_mut(&rule.id)
            .ok_or_else(|| ThresholdError::NotFound(rule.id.clone()))?;
        if entry.value().key() != rule.key() {
            return Err(ThresholdError::InvalidInput(
                "metric_type and source_id of an existing rule cannot change".into(),
            ));
        }
        *entry = rule;
        Ok(())
    }

    pub fn delete(&self, id: &str) -> Option<ThresholdRule> {
        let (_, rule) = self.rules.remove(id)?;
        self.by_key.remove_if(&rule.key(), |_, owner| owner == id);
        Some(rule)
    }

    // A source-specific enabled rule wins over the global one.
    pub fn resolve(&self, metric_type: &str, source_id: &str) -> Option<ThresholdRule> {
        self.enabled_rule(&RuleKey::source(metric_type, source_id))
            .or_else(|| self.enabled_rule(&RuleKey::global(metric_type)))
    }

    fn enabled_rule(&self, key: &RuleKey) -> Option<ThresholdRule> {
        let id = self.by_key.get(key)?.value().clone();
        self.rules
            .get(&id)
            .filter(|r| r.enabled)
            .map(|r| r.clone())
    }

    pub fn replace_all(&self, rules: Vec<ThresholdRule>) {
        let incoming: HashSet<String> = rules.iter().map(|r| r.id.clone()).collect();
        self.rules.retain(|id, _| incoming.contains(id));
        self.by_key.retain(|_, id| incoming.contains(id));
        for rule in rules {
            self.by_key.insert(rule.key(), rule.id.clone());
            self.rules.insert(rule.id.clone(), rule);
        }
    }

    pub fn count(&self) -> usize {
        self.rules.len()
    }
}
