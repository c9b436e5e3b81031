use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{validate_actor, AlertLedger, LedgerError, RaiseOutcome};
use crate::alert::{Alert, AlertFilter, AlertState, AlertStats, NewAlert};
use crate::severity::Severity;

const ALERT_COLUMNS: &str = "id, source_id, metric_type, severity, triggering_value, \
     threshold_value, rule_id, message, acknowledged_by, \
     (EXTRACT(EPOCH FROM acknowledged_at) * 1000)::bigint AS acknowledged_at_ms, \
     (EXTRACT(EPOCH FROM resolved_at) * 1000)::bigint AS resolved_at_ms, \
     (EXTRACT(EPOCH FROM created_at) * 1000)::bigint AS created_at_ms";

#[derive(Debug, sqlx::FromRow)]
struct AlertRow {
    id: String,
    source_id: Option<String>,
    metric_type: String,
    severity: i16,
    triggering_value: f64,
    threshold_value: f64,
    rule_id: Option<String>,
    message: String,
    acknowledged_by: Option<String>,
    acknowledged_at_ms: Option<i64>,
    resolved_at_ms: Option<i64>,
    created_at_ms: i64,
}

impl TryFrom<AlertRow> for Alert {
    type Error = LedgerError;

    fn try_from(row: AlertRow) -> Result<Self, Self::Error> {
        let severity = Severity::from_rank(row.severity).ok_or_else(|| {
            LedgerError::Storage(format!(
                "alert '{}' has unknown severity rank {}",
                row.id, row.severity
            ))
        })?;
        Ok(Self {
            id: row.id,
            source_id: row.source_id,
            metric_type: row.metric_type,
            severity,
            triggering_value: row.triggering_value,
            threshold_value: row.threshold_value,
            rule_id: row.rule_id,
            message: row.message,
            acknowledged: row.acknowledged_at_ms.is_some(),
            acknowledged_by: row.acknowledged_by,
            acknowledged_at_ms: row.acknowledged_at_ms,
            resolved: row.resolved_at_ms.is_some(),
            resolved_at_ms: row.resolved_at_ms,
            created_at_ms: row.created_at_ms,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StatsRow {
    total: i64,
    critical: i64,
    warning: i64,
    info: i64,
    unacknowledged: i64,
    unresolved: i64,
}

impl From<StatsRow> for AlertStats {
    fn from(row: StatsRow) -> Self {
        Self {
            total: row.total as u64,
            critical: row.critical as u64,
            warning: row.warning as u64,
            info: row.info as u64,
            unacknowledged: row.unacknowledged as u64,
            unresolved: row.unresolved as u64,
        }
    }
}

// Raises serialize on a transaction-scoped advisory lock per source and metric.
#[derive(Clone)]
pub struct PgLedger {
    pool: PgPool,
}

impl PgLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert<'e, E>(executor: E, alert: &Alert) -> Result<(), LedgerError>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query(
            r#"INSERT INTO alerts
               (id, source_id, metric_type, severity, triggering_value, threshold_value,
                rule_id, message, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8,
                       to_timestamp($9::double precision / 1000))"#,
        )
        .bind(&alert.id)
        .bind(&alert.source_id)
        .bind(&alert.metric_type)
        .bind(alert.severity.rank())
        .bind(alert.triggering_value)
        .bind(alert.threshold_value)
        .bind(&alert.rule_id)
        .bind(&alert.message)
        .bind(alert.created_at_ms)
        .execute(executor)
        .await?;
        Ok(())
    }

    async fn fetch_optional(&self, id: &str) -> Result<Option<Alert>, LedgerError> {
        let row = sqlx::query_as::<_, AlertRow>(&format!(
            "SELECT {ALERT_COLUMNS} FROM alerts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Alert::try_from).transpose()
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn lock_key(alert: &NewAlert) -> String {
    format!(
        "{}:{}",
        alert.source_id.as_deref().unwrap_or(""),
        alert.metric_type
    )
}

#[async_trait]
impl AlertLedger for PgLedger {
    async fn create(&self, alert: NewAlert) -> Result<Alert, LedgerError> {
        alert.validate()?;
        let stored = alert.into_alert(new_id());
        Self::insert(&self.pool, &stored).await?;
        Ok(stored)
    }

    async fn raise(&self, alert: NewAlert) -> Result<RaiseOutcome, LedgerError> {
        alert.validate()?;
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(lock_key(&alert))
            .execute(&mut *tx)
            .await?;

        let existing: Option<String> = sqlx::query_scalar(
            r#"SELECT id FROM alerts
               WHERE source_id IS NOT DISTINCT FROM $1
                 AND metric_type = $2
                 AND resolved_at IS NULL
                 AND severity >= $3
               ORDER BY severity DESC, created_at DESC
               LIMIT 1"#,
        )
        .bind(&alert.source_id)
        .bind(&alert.metric_type)
        .bind(alert.severity.rank())
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(existing_id) = existing {
            tx.commit().await?;
            return Ok(RaiseOutcome::Suppressed { existing_id });
        }

        let stored = alert.into_alert(new_id());
        Self::insert(&mut *tx, &stored).await?;
        tx.commit().await?;
        Ok(RaiseOutcome::Created(stored))
    }

    async fn get(&self, id: &str) -> Result<Alert, LedgerError> {
        self.fetch_optional(id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))
    }

    async fn list(&self, filter: &AlertFilter) -> Result<Vec<Alert>, LedgerError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {ALERT_COLUMNS} FROM alerts WHERE TRUE"));

        if let Some(severity) = filter.severity {
            qb.push(" AND severity = ").push_bind(severity.rank());
        }
        if let Some(source) = &filter.source_id {
            qb.push(" AND source_id = ").push_bind(source.clone());
        }
        if let Some(metric) = &filter.metric_type {
            qb.push(" AND metric_type = ").push_bind(metric.clone());
        }
        match filter.acknowledged {
            Some(true) => {
                qb.push(" AND acknowledged_at IS NOT NULL");
            }
            Some(false) => {
                qb.push(" AND acknowledged_at IS NULL");
            }
            None => {}
        }
        match filter.resolved {
            Some(true) => {
                qb.push(" AND resolved_at IS NOT NULL");
            }
            Some(false) => {
                qb.push(" AND resolved_at IS NULL");
            }
            None => {}
        }
        if let Some(since) = filter.since_ms {
            qb.push(" AND created_at >= to_timestamp(")
                .push_bind(since)
                .push("::double precision / 1000)");
        }
        if let Some(until) = filter.until_ms {
            qb.push(" AND created_at < to_timestamp(")
                .push_bind(until)
                .push("::double precision / 1000)");
        }

        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(filter.effective_limit() as i64)
            .push(" OFFSET ")
            .push_bind(filter.offset as i64);

        let rows = qb
            .build_query_as::<AlertRow>()
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Alert::try_from).collect()
    }

    async fn acknowledge(&self, id: &str, actor: &str, now_ms: i64) -> Result<Alert, LedgerError> {
        let actor = validate_actor(actor)?;
        let updated = sqlx::query_as::<_, AlertRow>(&format!(
            "UPDATE alerts \
             SET acknowledged_by = $2, acknowledged_at = to_timestamp($3::double precision / 1000) \
             WHERE id = $1 AND resolved_at IS NULL AND acknowledged_at IS NULL \
             RETURNING {ALERT_COLUMNS}"
        ))
        .bind(id)
        .bind(actor)
        .bind(now_ms)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = updated {
            return Alert::try_from(row);
        }
        let current = self.get(id).await?;
        match current.state() {
            AlertState::Resolved => Err(LedgerError::AlreadyResolved(current.id)),
            AlertState::Acknowledged => Err(LedgerError::AlreadyAcknowledged(current.id)),
            AlertState::Open => Err(LedgerError::Unavailable(format!(
                "acknowledge of alert '{id}' lost a concurrent update"
            ))),
        }
    }

    async fn resolve(&self, id: &str, now_ms: i64) -> Result<Alert, LedgerError> {
        let updated = sqlx::query_as::<_, AlertRow>(&format!(
            "UPDATE alerts \
             SET resolved_at = to_timestamp($2::double precision / 1000) \
             WHERE id = $1 AND resolved_at IS NULL \
             RETURNING {ALERT_COLUMNS}"
        ))
        .bind(id)
        .bind(now_ms)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(row) => Alert::try_from(row),
            None => self.get(id).await,
        }
    }

    async fn delete(&self, id: &str) -> Result<(), LedgerError> {
        let result = sqlx::query("DELETE FROM alerts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(LedgerError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn stats(&self, since_ms: Option<i64>) -> Result<AlertStats, LedgerError> {
        let row = sqlx::query_as::<_, StatsRow>(
            r#"SELECT
                 COUNT(*) AS total,
                 COUNT(*) FILTER (WHERE severity = 2) AS critical,
                 COUNT(*) FILTER (WHERE severity = 1) AS warning,
                 COUNT(*) FILTER (WHERE severity = 0) AS info,
                 COUNT(*) FILTER (WHERE resolved_at IS NULL AND acknowledged_at IS NULL) AS unacknowledged,
                 COUNT(*) FILTER (WHERE resolved_at IS NULL) AS unresolved
               FROM alerts
               WHERE $1::bigint IS NULL
                  OR created_at >= to_timestamp($1::double precision / 1000)"#,
        )
        .bind(since_ms)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn purge_resolved_before(&self, cutoff_ms: i64) -> Result<u64, LedgerError> {
        let result = sqlx::query(
            r#"DELETE FROM alerts
               WHERE resolved_at IS NOT NULL
                 AND resolved_at < to_timestamp($1::double precision / 1000)"#,
        )
        .bind(cutoff_ms)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), LedgerError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
