//! HTTP API Layer
//!
//! This crate provides the REST API for the settlement core using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: balance/history reads, bill lifecycle writes, admin ops
//! - **Middleware**: Authentication, audit logging, request tracing
//! - **DTOs**: Request/Response data transfer objects
//! - **Scheduler**: monthly netting runs, first of month UTC
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(pool, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod scheduler;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{admin, health, ledger, payments};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `pool` - Database connection pool
/// * `config` - API configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(pool: PgPool, config: ApiConfig) -> Router {
    let state = AppState { pool, config };

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Member-facing settlement routes
    let settlement_routes = Router::new()
        .route("/balance", get(ledger::get_balance))
        .route("/transactions", get(ledger::list_transactions))
        .route("/payments", get(payments::list_payments))
        .route("/payments/:id", get(payments::get_payment))
        .route("/payments/:id/actions", get(payments::get_payment_actions))
        .route("/payments/:id/acknowledge", post(payments::acknowledge_payment))
        .route("/payments/:id/dispute", post(payments::dispute_payment))
        .route("/disputes", get(admin::list_disputes))
        .route("/disputes/resolved", get(admin::list_resolved_disputes))
        .route("/disputes/:id/resolve", post(admin::resolve_dispute))
        .route("/summary", get(payments::bill_summary));

    // Collaborator routes (rental service callbacks)
    let internal_routes = Router::new()
        .route("/rentals/complete", post(ledger::rental_completed));

    // Admin operations
    let admin_routes = Router::new()
        .route("/netting/run", post(admin::run_netting));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/settlement", settlement_routes)
        .nest("/internal", internal_routes)
        .nest("/admin", admin_routes)
        .layer(axum_middleware::from_fn_with_state(state.clone(), audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
