pub mod appresult;
pub mod auth;
pub mod availability;
pub mod booking;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod model;
pub mod profiles;
pub mod session;

use axum::{extract::FromRef, routing::get, Router};
use sqlx::SqlitePool;
use tower_http::{cors::{Any, CorsLayer}, trace::TraceLayer};
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

pub use appresult::{AppError, AppResult};
pub use config::Config;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub config: Config,
}

pub fn app(app_state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(app_state.config.session_inactivity));

    Router::new()
        .route("/health", get(|| async { "ok" }))

        .merge(auth::router())
        .merge(profiles::router())
        .merge(availability::router())
        .merge(booking::router())

        .with_state(app_state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
