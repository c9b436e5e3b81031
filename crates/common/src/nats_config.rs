pub const STREAM_NAME: &str = "FLEET_TELEMETRY";
pub const SUBJECT: &str = "fleet.telemetry.>";
pub const SUBJECT_PREFIX: &str = "fleet.telemetry";
pub const CONSUMER_NAME: &str = "fleetwatch-workers";
pub const MAX_DELIVER: i64 = 5;

pub fn source_from_subject(subject: &str) -> Option<&str> {
    let rest = subject.strip_prefix(SUBJECT_PREFIX)?.strip_prefix('.')?;
    let token = rest.rsplit('.').next()?;
    (!token.is_empty()).then_some(token)
}

#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub name: String,
    pub subjects: Vec<String>,
    pub max_bytes: i64,
    pub max_age_secs: u64,
    pub storage: StorageType,
    pub num_replicas: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    File,
    Memory,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            name: STREAM_NAME.into(),
            subjects: vec![SUBJECT.into()],
            max_bytes: 1_073_741_824,
            max_age_secs: 86400 * 3,
            storage: StorageType::File,
            num_replicas: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_from_subject_takes_last_token() {
        assert_eq!(source_from_subject("fleet.telemetry.robot-7"), Some("robot-7"));
        assert_eq!(source_from_subject("fleet.telemetry.bay-2.robot-9"), Some("robot-9"));
        assert_eq!(source_from_subject("fleet.telemetry"), None);
        assert_eq!(source_from_subject("other.robot-7"), None);
    }

    #[test]
    fn default_stream_config() {
        let cfg = StreamConfig::default();
        assert_eq!(cfg.name, "FLEET_TELEMETRY");
        assert_eq!(cfg.subjects, vec!["fleet.telemetry.>".to_string()]);
    }
}
