//! Event routing
//!
//! Every inbound event is classified once into an [`EventKind`] and handed
//! to the handler for that kind. Ambiguous shapes are rejected, never guessed.

use async_trait::async_trait;
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Outcome;
use crate::payload::{fetch_str, is_present};
use crate::AppState;

const SERVICE_NAME_PATH: &str = "detail/service/serviceName";
const RECORDS_PATH: &str = "Records";
const MONITORED_SERVICE: &str = "guardduty";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A GuardDuty finding to evaluate
    Finding,
    /// A trigger to rebuild the block list
    Generation,
}

/// One implementation per [`EventKind`]
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &Value) -> Vec<Outcome>;
}

/// Decide which handler an event belongs to.
pub fn route(event: &Value) -> AppResult<EventKind> {
    if fetch_str(event, SERVICE_NAME_PATH) == Some(MONITORED_SERVICE) {
        Ok(EventKind::Finding)
    } else if is_present(event, RECORDS_PATH) {
        Ok(EventKind::Generation)
    } else {
        Err(AppError::UnroutableEvent)
    }
}

/// Route `event`, build its handler from the current configuration and run it.
///
/// Configuration problems are reported as the single outcome of the
/// invocation; only an unroutable event is returned as an error.
pub async fn dispatch(state: &AppState, event: &Value) -> AppResult<Vec<Outcome>> {
    let kind = route(event)?;
    let invocation_id = Uuid::new_v4();

    async move {
        let handler = match state.handler_for(kind) {
            Ok(handler) => handler,
            Err(e) => {
                tracing::warn!("Configuration error: {}", e);
                return Ok(vec![Outcome::message(e.to_string())]);
            }
        };

        let _cycle_guard = match kind {
            EventKind::Generation => Some(state.generation_lock.lock().await),
            EventKind::Finding => None,
        };

        tracing::info!("Handling {:?} event", kind);
        Ok(handler.handle(event).await)
    }
    .instrument(tracing::info_span!("invocation", %invocation_id))
    .await
}
