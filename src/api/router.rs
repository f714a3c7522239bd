use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;
use super::auth::require_session;
use super::handlers;

pub fn create_router(state: AppState) -> Router {
    // Public routes (no session required)
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render))
        // Provisioning (service-role credential)
        .route("/api/auth", post(handlers::provisioning::auth_action))
        .route("/api/register", post(handlers::provisioning::register))
        .route("/api/create-user-settings", post(handlers::provisioning::create_user_settings))
        // Session
        .route("/api/session/sign-in", post(handlers::session::sign_in))
        .route("/api/session/sign-up", post(handlers::session::sign_up));

    // Protected API routes (Bearer access token required)
    let protected = Router::new()
        .route("/api/session", get(handlers::session::current))
        .route("/api/session/sign-out", post(handlers::session::sign_out))
        // Settings & profile
        .route("/api/settings", get(handlers::settings::get_settings).put(handlers::settings::update_settings))
        .route("/api/profile", put(handlers::profile::update_profile))
        .route("/api/profile/email", put(handlers::profile::update_email))
        .route("/api/profile/password", put(handlers::profile::update_password))
        // Months
        .route("/api/months/:year/:month", get(handlers::months::get_month))
        .route("/api/months/:year/:month/summary", get(handlers::months::get_summary))
        .route("/api/months/:year/:month/days/:day", put(handlers::months::update_day))
        .route("/api/months/:year/:month/reset", post(handlers::months::reset_month))
        .layer(middleware::from_fn_with_state(state.clone(), require_session));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
