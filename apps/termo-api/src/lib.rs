//! Termo API - HTTP service for the change-of-residency term
//!
//! Provides REST endpoints for:
//! - Editing the current template and browsing its version history
//! - Placeholder discovery and live previews
//! - PDF export with an audit log of produced documents
//! - Cookie-based admin access to the export log

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

pub use config::Args;
pub use error::ApiError;
pub use state::AppState;

/// Build the router with all routes and middleware
pub fn app(state: Arc<AppState>) -> Router {
    // CORS configuration for web clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Template editing
        .route(
            "/api/template",
            get(handlers::get_template).put(handlers::put_template),
        )
        .route("/api/placeholders", get(handlers::get_placeholders))
        .route("/api/preview", post(handlers::preview))
        // Version history
        .route("/api/versions", get(handlers::list_versions))
        .route("/api/versions/:id", get(handlers::get_version))
        .route("/api/history", get(handlers::get_history))
        .route("/api/history/revert", post(handlers::revert_version))
        .route("/api/history/delete", post(handlers::delete_version))
        // Export
        .route("/api/render", post(handlers::render))
        .route(
            "/api/downloads",
            get(handlers::list_downloads).post(handlers::record_download),
        )
        .route("/api/downloads/:id/pdf", get(handlers::download_pdf))
        // Admin session
        .route("/api/admin/login", post(handlers::admin_login))
        .route("/api/admin/me", get(handlers::admin_me))
        .route("/api/admin/logout", post(handlers::admin_logout))
        // Add middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
