//! API Route Configuration

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{self, AppState};
use super::middleware::{auth_middleware, logging_middleware, rate_limit_middleware};
use super::page;

/// Create the router with the form pages, the v1 API and all middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health & Status
        .route("/health", get(handlers::health_check))
        .route("/stats", get(handlers::get_stats))
        .route("/fields", get(handlers::list_fields))
        // Assessment
        .route("/assess", post(handlers::assess))
        .route("/assess/batch", post(handlers::batch_assess))
        .route("/report", post(handlers::download_report));

    // Interactive form
    let pages = Router::new()
        .route("/", get(page::index_page))
        .route("/assess", post(page::assess_form))
        .route("/report.txt", get(page::report_txt))
        .route("/report.csv", get(page::report_csv));

    Router::new()
        .merge(pages)
        .nest("/v1", api_v1)
        .route("/health", get(handlers::health_check))
        // Middleware (order matters - bottom runs first)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
