//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    monitor_configured: bool,
    generator_configured: bool,
    timestamp: i64,
}

/// Liveness plus whether each event path has the settings it needs
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        monitor_configured: state.config.monitor_settings().is_ok(),
        generator_configured: state.config.generator_settings().is_ok(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
