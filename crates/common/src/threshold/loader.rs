use serde::Deserialize;
use std::path::Path;

use super::error::ThresholdError;
use super::rule::{ThresholdDraft, ThresholdRule};
use super::store::ThresholdStore;

#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    thresholds: Vec<ThresholdDraft>,
}

#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    Parse(serde_yaml::Error),
    Invalid(ThresholdError),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Parse(e) => write!(f, "parse: {e}"),
            Self::Invalid(e) => write!(f, "validation: {e}"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_yaml::Error> for LoadError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Parse(e)
    }
}

impl From<ThresholdError> for LoadError {
    fn from(e: ThresholdError) -> Self {
        Self::Invalid(e)
    }
}

pub fn load_from_file(path: &Path, now_ms: i64) -> Result<Vec<ThresholdRule>, LoadError> {
    let contents = std::fs::read_to_string(path)?;
    load_from_str(&contents, now_ms)
}

pub fn load_from_str(yaml: &str, now_ms: i64) -> Result<Vec<ThresholdRule>, LoadError> {
    let seed: SeedFile = serde_yaml::from_str(yaml)?;
    let rules = seed
        .thresholds
        .into_iter()
        .map(|draft| draft.into_rule(uuid::Uuid::new_v4().to_string(), now_ms))
        .collect::<Result<Vec<_>, _>>()?;
    ThresholdStore::with_rules(rules.clone())?;
    Ok(rules)
}
