use sqlx::PgPool;

use super::error::ThresholdError;
use super::rule::{Scope, ThresholdRule};

#[derive(Debug, sqlx::FromRow)]
struct RuleRow {
    id: String,
    metric_type: String,
    source_id: Option<String>,
    warning_value: f64,
    critical_value: f64,
    enabled: bool,
    created_at_ms: i64,
    updated_at_ms: i64,
}

impl From<RuleRow> for ThresholdRule {
    fn from(row: RuleRow) -> Self {
        Self {
            id: row.id,
            metric_type: row.metric_type,
            scope: Scope::from(row.source_id),
            warning_value: row.warning_value,
            critical_value: row.critical_value,
            enabled: row.enabled,
            created_at_ms: row.created_at_ms,
            updated_at_ms: row.updated_at_ms,
        }
    }
}

const SELECT_RULES: &str = "SELECT id, metric_type, source_id, warning_value, critical_value, \
     enabled, created_at_ms, updated_at_ms FROM threshold_rules";

#[derive(Clone)]
pub struct PgThresholdRepo {
    pool: PgPool,
}

impl PgThresholdRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn load_all(&self) -> Result<Vec<ThresholdRule>, ThresholdError> {
        let rows = sqlx::query_as::<_, RuleRow>(SELECT_RULES)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(ThresholdRule::from).collect())
    }

    pub async fn insert(&self, rule: &ThresholdRule) -> Result<(), ThresholdError> {
        sqlx::query(
            r#"INSERT INTO threshold_rules
               (id, metric_type, source_id, warning_value, critical_value,
                enabled, created_at_ms, updated_at_ms)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
        )
        .bind(&rule.id)
        .bind(&rule.metric_type)
        .bind(rule.scope.source_id())
        .bind(rule.warning_value)
        .bind(rule.critical_value)
        .bind(rule.enabled)
        .bind(rule.created_at_ms)
        .bind(rule.updated_at_ms)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update(&self, rule: &ThresholdRule) -> Result<(), ThresholdError> {
        let result = sqlx::query(
            r#"UPDATE threshold_rules
               SET warning_value = $2, critical_value = $3, enabled = $4, updated_at_ms = $5
               WHERE id = $1"#,
        )
        .bind(&rule.id)
        .bind(rule.warning_value)
        .bind(rule.critical_value)
        .bind(rule.enabled)
        .bind(rule.updated_at_ms)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ThresholdError::NotFound(rule.id.clone()));
        }
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<bool, ThresholdError> {
        let result = sqlx::query("DELETE FROM threshold_rules WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn seed(&self, rules: &[ThresholdRule]) -> Result<usize, ThresholdError> {
        let mut added = 0;
        for rule in rules {
            match self.insert(rule).await {
                Ok(()) => added += 1,
                Err(ThresholdError::Conflict(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(added)
    }
}
