//! Event ingestion handler

use axum::{extract::State, Json};
use serde_json::Value;

use crate::dispatch::dispatch;
use crate::models::Outcome;
use crate::{AppResult, AppState};

/// Accept one raw event and report what was done with it
pub async fn ingest(
    State(state): State<AppState>,
    Json(event): Json<Value>,
) -> AppResult<Json<Vec<Outcome>>> {
    let outcomes = dispatch(&state, &event).await?;
    Ok(Json(outcomes))
}
