use axum::{debug_handler, extract::State};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session as UserSession;

use crate::{db, error::BookingError, extract::Json, model::User, AppResult};

use super::sign_in;

#[derive(Deserialize)]
pub(crate) struct LoginQuery {
    pub(crate) email: String,
}

#[debug_handler]
pub(crate) async fn login(
    State(db_pool): State<SqlitePool>,
    session: UserSession,
    Json(LoginQuery { email }): Json<LoginQuery>,
) -> AppResult<Json<User>> {
    let email = email.trim().to_lowercase();
    let Some(user) = db::find_user_by_email(&db_pool, &email).await? else {
        return Err(BookingError::NotFound("account"))?;
    };

    sign_in(&session, user.id).await?;
    tracing::info!(user_id = %user.id, "welcome {}", user.name);

    Ok(Json(user))
}
