//! Database module - PostgreSQL connection and ledger schema

use sqlx::{postgres::PgPoolOptions, PgPool};

/// Create database connection pool
///
/// Connections are opened on first use, so an instance that only ever
/// reports configuration problems never touches the database.
pub fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect_lazy(database_url)
}

/// Create the ledger table if it does not exist yet
///
/// `table` must already be validated as a plain identifier.
pub async fn run_migrations(pool: &PgPool, table: &str) -> Result<(), sqlx::Error> {
    sqlx::query(&ledger_schema(table))
        .execute(pool)
        .await?;

    tracing::info!("Ledger schema applied to table {}", table);
    Ok(())
}

fn ledger_schema(table: &str) -> String {
    format!(
        r#"
CREATE TABLE IF NOT EXISTS "{table}" (
    finding_id TEXT NOT NULL,
    ip TEXT NOT NULL,
    last_seen TIMESTAMPTZ NOT NULL,
    detection_count BIGINT NOT NULL DEFAULT 1,
    PRIMARY KEY (finding_id, ip)
)
"#
    )
}
