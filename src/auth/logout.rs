use axum::{debug_handler, http::StatusCode};
use tower_sessions::Session as UserSession;

use crate::AppResult;

#[debug_handler]
pub(crate) async fn logout(session: UserSession) -> AppResult<StatusCode> {
    session.flush().await?;
    Ok(StatusCode::NO_CONTENT)
}
