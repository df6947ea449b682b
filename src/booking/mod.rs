pub mod service;
pub mod state;
mod sessions;
mod tasks;

use axum::{routing::{get, post, put}, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions", get(sessions::list).post(sessions::book))
        .route("/sessions/{session_id}/confirm", post(sessions::confirm))
        .route("/sessions/{session_id}/complete", post(sessions::complete))
        .route("/sessions/{session_id}/cancel", post(sessions::cancel))
        .route("/tasks", get(tasks::list).post(tasks::create))
        .route("/tasks/{task_id}/status", put(tasks::set_status))
}
