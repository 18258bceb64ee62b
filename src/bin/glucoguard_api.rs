//! GlucoGuard API Server
//!
//! Interactive risk form, report downloads and JSON assessment API
//!
//! Usage:
//!   cargo run --bin glucoguard_api
//!
//! Environment:
//!   GLUCOGUARD_MODEL_PATH  - Model artifact (default: artifacts/diabetes_model.json)
//!   GLUCOGUARD_SCALER_PATH - Scaler artifact (default: artifacts/scaler.json)
//!   PORT / GLUCOGUARD_PORT - Server port (default: 8080)
//!   GLUCOGUARD_HOST        - Server host (default: 0.0.0.0)
//!   GLUCOGUARD_API_KEY     - Require X-API-Key on /v1 (optional)
//!   RUST_LOG               - Log level (default: info)

use glucoguard::api::{create_router, start_cleanup_task, AppState};
use glucoguard::{AppConfig, Artifacts};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    print_banner();

    let config = AppConfig::from_env()?;
    config.log_summary();

    // Artifacts load once; the service never starts without them
    let artifacts = Artifacts::load(&config.model).map_err(|e| {
        error!(code = e.code_str(), "❌ Cannot start without model artifacts");
        e
    })?;

    let state = Arc::new(AppState::new(artifacts, &config.server));
    let telemetry = state.telemetry.clone();

    // Start background cleanup task for rate limiter
    start_cleanup_task(state.clone());
    info!("🧹 Background cleanup task started");

    let app = create_router(state);
    let addr = config.server.socket_addr()?;

    info!("🛡️ GlucoGuard AI starting on http://{}", addr);
    info!("");
    info!("Endpoints:");
    info!("  GET  /                    - Interactive risk form");
    info!("  GET  /report.txt|csv      - Report download for form values");
    info!("  POST /v1/assess           - Single assessment");
    info!("  POST /v1/assess/batch     - Batch assessment (up to 100)");
    info!("  POST /v1/report           - Report download (?format=txt|csv)");
    info!("  GET  /v1/fields           - Measurement field table");
    info!("  GET  /v1/stats            - Assessment statistics");
    info!("  GET  /v1/health           - Health check");
    info!("");
    info!("Press Ctrl+C for graceful shutdown");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("⚠️ Failed to install Ctrl+C handler: {}", e);
        }
    };

    // Peer address feeds the rate limiter when no proxy header is present
    let service = app.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    // Graceful shutdown sequence
    info!("");
    info!("🛑 Shutdown signal received, exporting session stats...");

    let stats = telemetry.get_stats();
    println!("{}", stats.summary());

    match telemetry.export_stats_json() {
        Ok(path) => info!("   ✅ Stats exported to: {}", path.display()),
        Err(e) => warn!("   ⚠️ Failed to export stats: {}", e),
    }
    match telemetry.export_stats_csv() {
        Ok(path) => info!("   ✅ History appended to: {}", path.display()),
        Err(e) => warn!("   ⚠️ Failed to append history: {}", e),
    }

    info!("👋 GlucoGuard API shutdown complete");

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    ╔══════════════════════════════════════════════════════════════╗
    ║                                                              ║
    ║     ____ _                  ____                     _       ║
    ║    / ___| |_   _  ___ ___  / ___|_   _  __ _ _ __ __| |      ║
    ║   | |  _| | | | |/ __/ _ \| |  _| | | |/ _` | '__/ _` |      ║
    ║   | |_| | | |_| | (_| (_) | |_| | |_| | (_| | | | (_| |      ║
    ║    \____|_|\__,_|\___\___/ \____|\__,_|\__,_|_|  \__,_|      ║
    ║                                                              ║
    ║          Intelligent Diabetes Risk Prediction v{:<8}       ║
    ║                                                              ║
    ╚══════════════════════════════════════════════════════════════╝
    "#,
        env!("CARGO_PKG_VERSION")
    );
}
