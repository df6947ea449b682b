use axum::{debug_handler, extract::State, http::StatusCode};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session as UserSession;

use crate::{
    db::{self, NewUser},
    error::BookingError,
    extract::Json,
    model::{default_avatar, Role, User},
    AppResult,
};

use super::sign_in;

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterQuery {
    name: String,
    email: String,
    role: Role,
    bio: Option<String>,
    #[serde(default)]
    skills: Vec<String>,
    avatar: Option<String>,
}

#[debug_handler]
pub(crate) async fn register(
    State(db_pool): State<SqlitePool>,
    session: UserSession,
    Json(query): Json<RegisterQuery>,
) -> AppResult<(StatusCode, Json<User>)> {
    let name = query.name.trim();
    let email = query.email.trim().to_lowercase();
    if name.is_empty() {
        return Err(BookingError::validation("a name is required"))?;
    }
    if !email.contains('@') {
        return Err(BookingError::validation(format!("{email:?} is not an email address")))?;
    }

    let avatar = query
        .avatar
        .filter(|avatar| !avatar.trim().is_empty())
        .unwrap_or_else(|| default_avatar(name));
    let user = db::insert_user(
        &db_pool,
        NewUser {
            name,
            email: &email,
            role: query.role,
            bio: query.bio.as_deref(),
            skills: &query.skills,
            avatar: &avatar,
        },
    )
    .await?;

    sign_in(&session, user.id).await?;
    Ok((StatusCode::CREATED, Json(user)))
}
