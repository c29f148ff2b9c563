//! # Routes
//!
//! Axum router configuration for the cardvault demo API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - Token lifecycle:
///   - POST   /api/v1/tokenize - Validate, encrypt, and store a card
///   - GET    /api/v1/token - Masked view of the stored token
///   - DELETE /api/v1/token - Clear the stored token
///
/// - Payments:
///   - POST /api/v1/payments - Charge the stored token
///
/// - Result stage (redirect-return landing):
///   - GET  /payment/result - Reconcile and display the outcome once
///   - POST /payment/result/dismiss - User dismissed the outcome
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - the demo form is served from a different origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/tokenize", post(handlers::tokenize))
        .route(
            "/token",
            get(handlers::get_token).delete(handlers::delete_token),
        )
        .route("/payments", post(handlers::create_payment));

    let result_routes = Router::new()
        .route("/result", get(handlers::payment_result))
        .route("/result/dismiss", post(handlers::dismiss_result));

    Router::new()
        // Health check at root
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        // API v1
        .nest("/api/v1", api_routes)
        // Redirect-return landing
        .nest("/payment", result_routes)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}
