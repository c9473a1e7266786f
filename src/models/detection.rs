//! Detection ledger row model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// Rows fetched per page when scanning the whole ledger
pub const SCAN_PAGE_SIZE: i64 = 1000;

/// One row per (finding, ip) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct LedgerEntry {
    pub finding_id: String,
    pub ip: String,
    pub last_seen: DateTime<Utc>,
    pub detection_count: i64,
}

impl LedgerEntry {
    /// Insert the pair with a count of one, or bump the count and overwrite
    /// `last_seen` when it already exists. One statement, so concurrent
    /// callers never lose an increment.
    ///
    /// `table` must already be validated as a plain identifier.
    pub async fn upsert(
        pool: &PgPool,
        table: &str,
        finding_id: &str,
        ip: &str,
        last_seen: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO "{table}" (finding_id, ip, last_seen, detection_count)
            VALUES ($1, $2, $3, 1)
            ON CONFLICT (finding_id, ip) DO UPDATE SET
                last_seen = EXCLUDED.last_seen,
                detection_count = "{table}".detection_count + 1
            RETURNING finding_id, ip, last_seen, detection_count
            "#
        );

        sqlx::query_as::<_, LedgerEntry>(&sql)
            .bind(finding_id)
            .bind(ip)
            .bind(last_seen)
            .fetch_one(pool)
            .await
    }

    /// One page of rows ordered by primary key, strictly after `after`.
    pub async fn scan_page(
        pool: &PgPool,
        table: &str,
        after: Option<(&str, &str)>,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        match after {
            None => {
                let sql = format!(
                    r#"
                    SELECT finding_id, ip, last_seen, detection_count FROM "{table}"
                    ORDER BY finding_id, ip
                    LIMIT $1
                    "#
                );
                sqlx::query_as::<_, LedgerEntry>(&sql)
                    .bind(limit)
                    .fetch_all(pool)
                    .await
            }
            Some((finding_id, ip)) => {
                let sql = format!(
                    r#"
                    SELECT finding_id, ip, last_seen, detection_count FROM "{table}"
                    WHERE (finding_id, ip) > ($1, $2)
                    ORDER BY finding_id, ip
                    LIMIT $3
                    "#
                );
                sqlx::query_as::<_, LedgerEntry>(&sql)
                    .bind(finding_id)
                    .bind(ip)
                    .bind(limit)
                    .fetch_all(pool)
                    .await
            }
        }
    }
}
