use sqlx::PgPool;

const MIGRATIONS: &[(&str, &str)] = &[
    (
        "000_migration_tracking.sql",
        include_str!("../../../../migrations/000_migration_tracking.sql"),
    ),
    (
        "001_create_extensions.sql",
        include_str!("../../../../migrations/001_create_extensions.sql"),
    ),
    (
        "002_create_telemetry.sql",
        include_str!("../../../../migrations/002_create_telemetry.sql"),
    ),
    (
        "003_create_alerts.sql",
        include_str!("../../../../migrations/003_create_alerts.sql"),
    ),
    (
        "004_create_threshold_rules.sql",
        include_str!("../../../../migrations/004_create_threshold_rules.sql"),
    ),
    (
        "005_telemetry_retention.sql",
        include_str!("../../../../migrations/005_telemetry_retention.sql"),
    ),
];

pub async fn run_migrations(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    let bootstrap = MIGRATIONS[0].1;
    sqlx::raw_sql(bootstrap).execute(pool).await?;

    let applied: Vec<String> = sqlx::query_scalar("SELECT filename FROM _migrations")
        .fetch_all(pool)
        .await?;

    let mut newly_applied = Vec::new();

    for (filename, sql) in &MIGRATIONS[1..] {
        if applied.iter().any(|a| a == filename) {
            continue;
        }
        sqlx::raw_sql(sql).execute(pool).await?;
        sqlx::query("INSERT INTO _migrations (filename) VALUES ($1) ON CONFLICT DO NOTHING")
            .bind(filename)
            .execute(pool)
            .await?;
        tracing::info!(migration = %filename, "migration applied");
        newly_applied.push(filename.to_string());
    }

    Ok(newly_applied)
}
