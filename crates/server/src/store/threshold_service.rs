use fleetwatch_common::clock::now_ms;
use fleetwatch_common::threshold::{
    PgThresholdRepo, ThresholdDraft, ThresholdError, ThresholdPatch, ThresholdRule, ThresholdStore,
};

#[derive(Clone)]
pub struct ThresholdService {
    store: ThresholdStore,
    repo: Option<PgThresholdRepo>,
}

impl ThresholdService {
    pub fn in_memory(store: ThresholdStore) -> Self {
        Self { store, repo: None }
    }

    pub fn persistent(store: ThresholdStore, repo: PgThresholdRepo) -> Self {
        Self {
            store,
            repo: Some(repo),
        }
    }

    pub fn store(&self) -> &ThresholdStore {
        &self.store
    }

    pub fn list(&self) -> Vec<ThresholdRule> {
        self.store.list()
    }

    pub fn get(&self, id: &str) -> Result<ThresholdRule, ThresholdError> {
        self.store
            .get(id)
            .ok_or_else(|| ThresholdError::NotFound(id.to_string()))
    }

    pub async fn create(&self, draft: ThresholdDraft) -> Result<ThresholdRule, ThresholdError> {
        let rule = draft.into_rule(uuid::Uuid::new_v4().to_string(), now_ms())?;
        self.store.insert(rule.clone())?;
        if let Some(repo) = &self.repo {
            if let Err(e) = repo.insert(&rule).await {
                self.store.delete(&rule.id);
                return Err(e);
            }
        }
        Ok(rule)
    }

    pub async fn update(&self, id: &str, patch: ThresholdPatch) -> Result<ThresholdRule, ThresholdError> {
        let existing = self.get(id)?;
        let updated = patch.apply(&existing, now_ms())?;
        if let Some(repo) = &self.repo {
            repo.update(&updated).await?;
        }
        self.store.update(updated.clone())?;
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ThresholdError> {
        let in_repo = match &self.repo {
            Some(repo) => repo.delete(id).await?,
            None => false,
        };
        match self.store.delete(id) {
            Some(_) => Ok(()),
            None if in_repo => Ok(()),
            None => Err(ThresholdError::NotFound(id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(source: Option<&str>) -> ThresholdDraft {
        ThresholdDraft {
            metric_type: "temperature".into(),
            source_id: source.map(str::to_string),
            warning_value: 60.0,
            critical_value: 75.0,
            enabled: None,
        }
    }

    #[tokio::test]
    async fn create_then_get() {
        let svc = ThresholdService::in_memory(ThresholdStore::new());
        let rule = svc.create(draft(None)).await.unwrap();
        assert!(rule.enabled);
        assert_eq!(svc.get(&rule.id).unwrap(), rule);
    }

    #[tokio::test]
    async fn duplicate_key_conflicts() {
        let svc = ThresholdService::in_memory(ThresholdStore::new());
        svc.create(draft(Some("robot-1"))).await.unwrap();
        let err = svc.create(draft(Some("robot-1"))).await.unwrap_err();
        assert!(matches!(err, ThresholdError::Conflict(_)));
        svc.create(draft(None)).await.unwrap();
        assert_eq!(svc.list().len(), 2);
    }

    #[tokio::test]
    async fn update_revalidates() {
        let svc = ThresholdService::in_memory(ThresholdStore::new());
        let rule = svc.create(draft(None)).await.unwrap();
        let err = svc
            .update(
                &rule.id,
                ThresholdPatch {
                    warning_value: Some(80.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ThresholdError::InvalidInput(_)));

        let updated = svc
            .update(
                &rule.id,
                ThresholdPatch {
                    enabled: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!updated.enabled);
        assert!(svc.store().resolve("temperature", "robot-1").is_none());
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let svc = ThresholdService::in_memory(ThresholdStore::new());
        assert!(matches!(
            svc.delete("nope").await,
            Err(ThresholdError::NotFound(_))
        ));
    }
}
