//! API routes

#[cfg(feature = "billing")]
pub mod billing;
pub mod client_requests;
pub mod health;
pub mod journey;
pub mod leads;
#[cfg(feature = "billing")]
pub mod payments;
pub mod users;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, patch, post},
    Router,
};

use crate::{auth::require_auth, state::AppState};

/// Create all API routes
pub fn create_router(state: AppState) -> Router {
    let auth_state = state.auth_state();

    // Health check routes (at root level for infrastructure monitoring)
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    // Public API routes (no auth required) - under /api
    let public_api_routes = Router::new()
        .route("/leads/with-email", post(leads::create_lead_with_email))
        .route(
            "/agent-customization/email-only",
            post(leads::capture_agent_customization),
        );

    // Protected API routes (auth required) - under /api
    #[allow(unused_mut)]
    let mut protected_api_routes = Router::new()
        // User administration
        .route("/admin/users", get(users::list_users))
        .route("/users/:user_id", patch(users::update_user))
        .route("/users/:user_id", delete(users::delete_user))
        // Client requests
        .route("/client-requests", get(client_requests::list_requests))
        .route("/client-requests", post(client_requests::create_request))
        .route(
            "/client-requests/:request_id",
            patch(client_requests::update_request_status),
        )
        // Journey stage notifications
        .route("/journey/:stage", post(journey::notify_stage));

    // Billing routes - only when billing feature is enabled AND runtime config allows
    // Two-layer gating: compile-time (feature flag) + runtime (config.enable_billing)
    #[cfg(feature = "billing")]
    if state.config.enable_billing {
        protected_api_routes = protected_api_routes
            .route("/stripe/create-checkout", post(billing::create_checkout))
            .route("/billing/upgrade-options", get(billing::upgrade_options))
            .route("/billing/subscription", get(billing::get_subscription))
            .route("/payments/user/:user_id", get(payments::get_user_payments));
    }

    // Apply auth middleware to protected routes
    let protected_api_routes =
        protected_api_routes.layer(middleware::from_fn_with_state(auth_state, require_auth));

    let api_routes = Router::new()
        .merge(public_api_routes)
        .merge(protected_api_routes);

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1MB request body limit
        .with_state(state)
}
