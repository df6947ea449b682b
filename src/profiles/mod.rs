mod dashboard;
mod page;

use axum::{routing::get, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(page::me).put(page::update_me))
        .route("/me/mentees", get(page::my_mentees))
        .route("/mentors", get(page::mentors))
        .route("/users/{user_id}", get(page::user))
        .route("/dashboard", get(dashboard::dashboard))
}
