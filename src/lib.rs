//! Block-list feed service
//!
//! Ingests GuardDuty network-connection findings into a detection ledger
//! and publishes the offending remote IPs as a plain-text block list that a
//! perimeter firewall pulls.
//!
//! # Architecture
//!
//! ```text
//!  finding event ──► route ──► FindingMonitor ──► classify ──► ledger upsert
//!                      │                                        (PostgreSQL)
//!                      │                                            │
//!  Records trigger ────┴─────► BlockListGenerator ◄── scan_all ─────┘
//!                                    │
//!                          fetch ─► merge ─► save
//!                              (S3 block-list object)
//! ```

pub mod blocklist;
pub mod classifier;
pub mod config;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod generator;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod monitor;
pub mod payload;
pub mod store;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

pub use error::{AppError, AppResult};

use config::Config;
use dispatch::{EventHandler, EventKind};
use error::ConfigError;
use generator::BlockListGenerator;
use ledger::PgLedger;
use monitor::FindingMonitor;
use store::S3BlockListStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pool: sqlx::PgPool,
    pub s3: aws_sdk_s3::Client,
    /// Serializes generation cycles started by this process
    pub generation_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: Config, pool: sqlx::PgPool, s3: aws_sdk_s3::Client) -> Self {
        Self {
            config,
            pool,
            s3,
            generation_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Connect the backends described by `config`.
    ///
    /// The ledger table is created up front when it is configured; missing
    /// settings are left for each invocation to report.
    pub async fn from_config(config: Config) -> anyhow::Result<Self> {
        let pool = db::create_pool(&config.database_url)?;

        match config.valid_ledger_table() {
            Ok(table) => db::run_migrations(&pool, &table).await?,
            Err(e) => tracing::warn!("Ledger schema not applied: {}", e),
        }

        let s3 = store::s3_client(config.region.clone()).await;
        Ok(Self::new(config, pool, s3))
    }

    /// Build the handler for `kind` from validated settings.
    pub fn handler_for(&self, kind: EventKind) -> Result<Box<dyn EventHandler>, ConfigError> {
        match kind {
            EventKind::Finding => {
                let settings = self.config.monitor_settings()?;
                let ledger = PgLedger::new(self.pool.clone(), settings.ledger_table);
                Ok(Box::new(FindingMonitor::new(Arc::new(ledger), settings.min_severity)))
            }
            EventKind::Generation => {
                let settings = self.config.generator_settings()?;
                let ledger = PgLedger::new(self.pool.clone(), settings.ledger_table);
                let store = S3BlockListStore::new(self.s3.clone(), settings.bucket, settings.key);
                Ok(Box::new(BlockListGenerator::new(Arc::new(ledger), Arc::new(store))))
            }
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/v1/events", post(handlers::events::ingest))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
