//! Block-list generator
//!
//! Generation cycle: Triggered → Scanned → Fetched → Merged → Saved.
//! The first failing step ends the cycle; the stored list is only ever
//! replaced by a complete merge result.
//!
//! Two cycles running against the same object at once can still race
//! (last writer wins); callers are expected to run one cycle at a time.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::blocklist::{self, MergeOutcome};
use crate::dispatch::EventHandler;
use crate::error::GenerationError;
use crate::ledger::DetectionLedger;
use crate::models::Outcome;
use crate::store::BlockListStore;

pub const GENERATION_FAILURE_MESSAGE: &str =
    "There's a problem in generating ip block list. Please see detailed information in the logs.";

pub struct BlockListGenerator {
    ledger: Arc<dyn DetectionLedger>,
    store: Arc<dyn BlockListStore>,
}

impl BlockListGenerator {
    pub fn new(ledger: Arc<dyn DetectionLedger>, store: Arc<dyn BlockListStore>) -> Self {
        Self { ledger, store }
    }

    /// Run one full cycle and return what the merge produced.
    pub async fn run_cycle(&self) -> Result<MergeOutcome, GenerationError> {
        let entries = self.ledger.scan_all().await?;
        tracing::debug!("Scanned {} ledger entries", entries.len());

        self.store.check_bucket().await?;
        let current = self.store.fetch().await?;

        let merged = blocklist::merge(&current, &entries);
        self.store.save(&merged.updated_text).await?;

        Ok(merged)
    }
}

#[async_trait]
impl EventHandler for BlockListGenerator {
    // The trigger payload itself carries nothing the cycle needs.
    async fn handle(&self, _event: &Value) -> Vec<Outcome> {
        match self.run_cycle().await {
            Ok(merged) => {
                let added = merged.added_ips.len();
                let message = format!(
                    "{} IP addresses found, and {} new IP addresses have been added to ip block list.",
                    merged.found, added
                );
                tracing::info!(added_ips = ?merged.added_ips, total = merged.all_ips.len(), "{}", message);
                vec![Outcome::with_detail(
                    message,
                    json!({
                        "found": merged.found,
                        "added": added,
                        "total": merged.all_ips.len(),
                    }),
                )]
            }
            Err(e) => {
                tracing::error!("Block list generation failed: {}", e);
                vec![Outcome::message(GENERATION_FAILURE_MESSAGE)]
            }
        }
    }
}
