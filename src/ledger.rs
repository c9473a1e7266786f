//! Detection ledger
//!
//! Aggregates accepted findings per (finding id, ip). The ledger is the
//! source of truth; the published block list is derived from it.

use std::future::Future;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::LedgerError;
use crate::models::{LedgerEntry, SCAN_PAGE_SIZE};

#[async_trait]
pub trait DetectionLedger: Send + Sync {
    /// Record one more detection of `ip` under `finding_id`.
    async fn upsert(
        &self,
        finding_id: &str,
        ip: &str,
        last_seen: DateTime<Utc>,
    ) -> Result<LedgerEntry, LedgerError>;

    /// Every entry currently stored, in no particular order.
    async fn scan_all(&self) -> Result<Vec<LedgerEntry>, LedgerError>;
}

/// Ledger backed by a PostgreSQL table
#[derive(Clone)]
pub struct PgLedger {
    pool: PgPool,
    table: String,
}

impl PgLedger {
    /// `table` must already be validated as a plain identifier.
    pub fn new(pool: PgPool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
        }
    }
}

#[async_trait]
impl DetectionLedger for PgLedger {
    async fn upsert(
        &self,
        finding_id: &str,
        ip: &str,
        last_seen: DateTime<Utc>,
    ) -> Result<LedgerEntry, LedgerError> {
        let entry = LedgerEntry::upsert(&self.pool, &self.table, finding_id, ip, last_seen).await?;
        tracing::debug!(
            finding_id = %entry.finding_id,
            ip = %entry.ip,
            detection_count = entry.detection_count,
            "Ledger entry updated"
        );
        Ok(entry)
    }

    async fn scan_all(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        let pool = &self.pool;
        let table = self.table.as_str();

        let entries = collect_pages(SCAN_PAGE_SIZE, move |after| async move {
            let cursor = after.as_ref().map(|(f, i)| (f.as_str(), i.as_str()));
            LedgerEntry::scan_page(pool, table, cursor, SCAN_PAGE_SIZE)
                .await
                .map_err(LedgerError::from)
        })
        .await?;

        tracing::debug!("Ledger scan completed: {} entries", entries.len());
        Ok(entries)
    }
}

/// Drain a keyset-paged source. `fetch_page` receives the key of the last
/// row returned so far; a short page ends the scan.
pub(crate) async fn collect_pages<F, Fut>(
    page_size: i64,
    mut fetch_page: F,
) -> Result<Vec<LedgerEntry>, LedgerError>
where
    F: FnMut(Option<(String, String)>) -> Fut,
    Fut: Future<Output = Result<Vec<LedgerEntry>, LedgerError>>,
{
    let mut entries: Vec<LedgerEntry> = Vec::new();

    loop {
        let cursor = entries
            .last()
            .map(|e| (e.finding_id.clone(), e.ip.clone()));
        let page = fetch_page(cursor).await?;
        let done = (page.len() as i64) < page_size;
        entries.extend(page);
        if done {
            return Ok(entries);
        }
    }
}
