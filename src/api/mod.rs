use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::catalog::MachineCatalog;
use crate::config::Config;
use crate::state::SharedState;

pub mod auth;
pub mod availability;
mod error;
pub mod reservations;
mod system;
mod types;
pub mod users;
mod validation;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn engine(&self) -> &crate::engine::Engine {
        &self.shared.engine
    }

    #[must_use]
    pub fn catalog(&self) -> &MachineCatalog {
        &self.shared.catalog
    }
}

pub fn create_app_state(shared: Arc<SharedState>) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
    })
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared))
}

pub fn router(state: Arc<AppState>) -> Router {
    let (cors_origins, secure_cookies, session_minutes) = {
        let server = &state.config().server;
        (
            server.cors_allowed_origins.clone(),
            server.secure_cookies,
            server.session_minutes,
        )
    };

    let protected_routes = create_protected_router(state.clone());

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            session_minutes,
        )));

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/availability", get(availability::get_availability))
        .layer(session_layer)
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(auth::get_current_user))
        .route("/auth/password", put(auth::change_password))
        .route("/reservations", post(reservations::submit_reservation))
        .route("/reservations", get(reservations::list_reservations))
        .route(
            "/reservations/{id}/approve",
            post(reservations::approve_reservation),
        )
        .route(
            "/reservations/{id}/reject",
            post(reservations::reject_reservation),
        )
        .route(
            "/reservations/{id}",
            delete(reservations::delete_reservation),
        )
        .route("/users", get(users::list_users))
        .route("/users", post(users::create_user))
        .route("/users/{username}", delete(users::delete_user))
        .route("/system/status", get(system::get_status))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
