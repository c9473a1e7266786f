//! In-memory ledger and store doubles for unit tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::error::{LedgerError, StoreError};
use crate::ledger::DetectionLedger;
use crate::models::LedgerEntry;
use crate::store::BlockListStore;

#[derive(Default)]
pub struct MemoryLedger {
    pub entries: Mutex<Vec<LedgerEntry>>,
    pub fail: bool,
}

impl MemoryLedger {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn with_ips(ips: &[&str]) -> Self {
        let entries = ips
            .iter()
            .enumerate()
            .map(|(i, ip)| LedgerEntry {
                finding_id: format!("finding-{}", i),
                ip: ip.to_string(),
                last_seen: Utc::now(),
                detection_count: 1,
            })
            .collect();
        Self {
            entries: Mutex::new(entries),
            fail: false,
        }
    }
}

#[async_trait]
impl DetectionLedger for MemoryLedger {
    async fn upsert(
        &self,
        finding_id: &str,
        ip: &str,
        last_seen: DateTime<Utc>,
    ) -> Result<LedgerEntry, LedgerError> {
        if self.fail {
            return Err(LedgerError::Database(sqlx::Error::PoolTimedOut));
        }

        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries
            .iter_mut()
            .find(|e| e.finding_id == finding_id && e.ip == ip)
        {
            entry.last_seen = last_seen;
            entry.detection_count += 1;
            return Ok(entry.clone());
        }

        let entry = LedgerEntry {
            finding_id: finding_id.to_string(),
            ip: ip.to_string(),
            last_seen,
            detection_count: 1,
        };
        entries.push(entry.clone());
        Ok(entry)
    }

    async fn scan_all(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        if self.fail {
            return Err(LedgerError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(self.entries.lock().await.clone())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    /// `None` means the object does not exist yet
    pub text: Mutex<Option<String>>,
    pub fail_bucket: bool,
    pub fail_fetch: bool,
    pub fail_save: bool,
}

impl MemoryStore {
    pub fn with_text(text: &str) -> Self {
        Self {
            text: Mutex::new(Some(text.to_string())),
            ..Default::default()
        }
    }

    pub async fn stored(&self) -> Option<String> {
        self.text.lock().await.clone()
    }
}

#[async_trait]
impl BlockListStore for MemoryStore {
    async fn check_bucket(&self) -> Result<(), StoreError> {
        if self.fail_bucket {
            return Err(StoreError::Bucket("NoSuchBucket".to_string()));
        }
        Ok(())
    }

    async fn fetch(&self) -> Result<String, StoreError> {
        if self.fail_fetch {
            return Err(StoreError::Read("AccessDenied".to_string()));
        }
        Ok(self.text.lock().await.clone().unwrap_or_default())
    }

    async fn save(&self, text: &str) -> Result<(), StoreError> {
        if self.fail_save {
            return Err(StoreError::Write("SlowDown".to_string()));
        }
        *self.text.lock().await = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_first_upsert_starts_at_one() {
        let ledger = MemoryLedger::default();
        let seen = Utc::now();
        let entry = ledger.upsert("f-1", "1.2.3.4", seen).await.unwrap();
        assert_eq!(entry.detection_count, 1);
        assert_eq!(entry.ip, "1.2.3.4");
        assert_eq!(entry.last_seen, seen);
    }

    #[tokio::test]
    async fn test_repeated_upserts_count_and_keep_last_seen() {
        let ledger = MemoryLedger::default();
        let base = Utc::now();
        // Older timestamps still overwrite: last write wins
        let stamps: Vec<_> = (0..5).map(|i| base - chrono::Duration::minutes(i)).collect();
        for stamp in &stamps {
            ledger.upsert("f-1", "1.2.3.4", *stamp).await.unwrap();
        }
        let entries = ledger.scan_all().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].detection_count, 5);
        assert_eq!(entries[0].last_seen, stamps[4]);
    }

    #[tokio::test]
    async fn test_concurrent_upserts_do_not_lose_increments() {
        let ledger = Arc::new(MemoryLedger::default());
        let tasks: Vec<_> = (0..20)
            .map(|_| {
                let ledger = ledger.clone();
                tokio::spawn(async move { ledger.upsert("f-1", "1.2.3.4", Utc::now()).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert_eq!(ledger.scan_all().await.unwrap()[0].detection_count, 20);
    }

    #[tokio::test]
    async fn test_store_missing_object_reads_empty() {
        let store = MemoryStore::default();
        assert_eq!(store.fetch().await.unwrap(), "");
        assert_eq!(store.stored().await, None);
    }
}
