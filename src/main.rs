//! Block-list feed server
//!
//! Runs as an HTTP service by default. For local development a single
//! event can be replayed instead:
//!
//! ```text
//! blocklist-feed --event finding.json [--env local.env]
//! ```

use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blocklist_feed::{config, create_router, dispatch, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--version") {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Load configuration before logging so RUST_LOG/LOG_FORMAT may come from the file
    match arg_value(&args, "--env") {
        Some(path) => {
            dotenvy::from_path(Path::new(path)).with_context(|| format!("load env file {}", path))?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }

    init_logging();
    let config = config::Config::from_env();

    if let Some(path) = arg_value(&args, "--event") {
        return run_local(config, path).await;
    }

    tracing::info!("Block-list feed server starting...");
    tracing::info!("Database: {}", config.database_url.split('@').last().unwrap_or("***"));

    let port = config.port;
    let state = AppState::from_config(config).await.context("initialize backends")?;
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.context("bind listener")?;
    axum::serve(listener, app).await.context("serve")?;
    Ok(())
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "blocklist_feed=debug,tower_http=debug".into());

    // JSON lines suit log shippers; plain text is easier to read locally
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Replay one event from a JSON file and print the outcomes.
async fn run_local(config: config::Config, path: &str) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("read event file {}", path))?;
    let event: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("parse event file {}", path))?;

    let state = AppState::from_config(config).await.context("initialize backends")?;
    match dispatch::dispatch(&state, &event).await {
        Ok(outcomes) => {
            println!("{}", serde_json::to_string_pretty(&outcomes)?);
            Ok(())
        }
        Err(e) => {
            println!("{}", e);
            Err(e.into())
        }
    }
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}
