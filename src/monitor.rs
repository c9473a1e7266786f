//! Finding monitor
//!
//! Per-event lifecycle: Received → Extracted → Classified → Ignored | Upserted.
//! Nothing is retried; a ledger failure ends the event with a report entry.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use crate::classifier::classify;
use crate::dispatch::EventHandler;
use crate::error::LedgerError;
use crate::ledger::DetectionLedger;
use crate::models::{Finding, LedgerEntry, Outcome};

pub const LEDGER_FAILURE_MESSAGE: &str =
    "There's a problem in updating ip to the DB. Please see detailed information in the logs.";

pub struct FindingMonitor {
    ledger: Arc<dyn DetectionLedger>,
    min_severity: f64,
}

impl FindingMonitor {
    pub fn new(ledger: Arc<dyn DetectionLedger>, min_severity: f64) -> Self {
        Self {
            ledger,
            min_severity,
        }
    }

    async fn record(&self, finding: &Finding) -> Result<LedgerEntry, LedgerError> {
        let finding_id = finding
            .finding_id
            .as_deref()
            .ok_or(LedgerError::MissingFindingId)?;
        let ip = finding.ip.as_deref().unwrap_or_default();
        let last_seen = finding.last_seen.unwrap_or_else(Utc::now);

        self.ledger.upsert(finding_id, ip, last_seen).await
    }
}

#[async_trait]
impl EventHandler for FindingMonitor {
    async fn handle(&self, event: &Value) -> Vec<Outcome> {
        let finding = Finding::from_event(event);
        let verdict = classify(&finding, self.min_severity);

        if let Some(reason) = verdict.ignore_reason(self.min_severity) {
            tracing::info!(?verdict, ip = ?finding.ip, "{}", reason);
            return vec![Outcome::message(reason)];
        }

        match self.record(&finding).await {
            Ok(entry) => {
                let message = format!("finding entry ({}) updated into DB.", entry.finding_id);
                tracing::info!(ip = %entry.ip, detection_count = entry.detection_count, "{}", message);
                match serde_json::to_value(&entry) {
                    Ok(detail) => vec![Outcome::with_detail(message, detail)],
                    Err(_) => vec![Outcome::message(message)],
                }
            }
            Err(e) => {
                tracing::error!(finding_id = ?finding.finding_id, ip = ?finding.ip, "Failed to update ledger: {}", e);
                vec![Outcome::message(LEDGER_FAILURE_MESSAGE)]
            }
        }
    }
}
