pub mod account;
pub mod auth;
pub mod bulletin;
pub mod cookies;
pub mod error;
pub mod middleware;
pub mod rest;
pub mod state;

use axum::{
    middleware as axum_middleware,
    routing::{any, delete, get},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use error::AppError;
pub use middleware::{require_auth, AuthUser};
pub use state::AppState;

/// Builds every API route on top of the shared state.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/hello", get(rest::hello_handler))
        .route("/api/redirect", get(auth::redirect_handler))
        .route("/api/callback", get(auth::callback_handler))
        .route("/api/logout", any(auth::logout_handler))
        .route("/api/bulletin", get(bulletin::get_bulletin_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route(
            "/api/save",
            get(bulletin::save_handler).post(bulletin::save_handler),
        )
        .route("/api/account", get(account::account_handler))
        .route("/api/delete-account", delete(account::delete_account_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
