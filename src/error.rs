//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Errors that cross the handler boundary.
///
/// Everything else (configuration, ledger and store failures) is reported
/// inside the outcome list of the invocation.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid event.")]
    UnroutableEvent,
}

/// Missing or unusable environment configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Must specify an AWS region.")]
    MissingRegion,

    #[error("Must specify the block list bucket and key.")]
    MissingBlockListLocation,

    #[error("Must specify a ledger table name.")]
    MissingLedgerTable,

    #[error("Invalid ledger table name: {0}")]
    InvalidLedgerTable(String),
}

/// Detection ledger read/write failure
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Finding has no identifier")]
    MissingFindingId,
}

/// Block-list object read/write failure
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Bucket unavailable: {0}")]
    Bucket(String),

    #[error("Get ip block list error: {0}")]
    Read(String),

    #[error("Put ip block list error: {0}")]
    Write(String),
}

/// Failure of one generation cycle, tagged by the step that failed
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Ledger scan failed: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Block list store failed: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::UnroutableEvent => {
                tracing::warn!("No matched handler for event");
                (StatusCode::BAD_REQUEST, "Invalid event.")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}
