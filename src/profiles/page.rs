use axum::{debug_handler, extract::State};
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    db::{self, ProfileUpdate},
    error::BookingError,
    extract::{Json, Path},
    model::{default_avatar, Role, User},
    session::Actor,
    AppResult,
};

/// Role and email are fixed at registration and can't be changed here.
#[derive(Debug, Deserialize)]
pub(crate) struct ProfileQuery {
    name: Option<String>,
    bio: Option<String>,
    skills: Option<Vec<String>>,
    avatar: Option<String>,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn me(
    State(db_pool): State<SqlitePool>,
    actor: Actor,
) -> AppResult<Json<User>> {
    let user = db::get_user(&db_pool, actor.id).await?.ok_or(BookingError::NotFound("user"))?;
    Ok(Json(user))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn update_me(
    State(db_pool): State<SqlitePool>,
    actor: Actor,
    Json(ProfileQuery { name, bio, skills, avatar }): Json<ProfileQuery>,
) -> AppResult<Json<User>> {
    let name = name.as_deref().map(str::trim);
    if name.is_some_and(str::is_empty) {
        return Err(BookingError::validation("a name can't be blank"))?;
    }
    let bio = bio.as_deref().map(str::trim);
    let avatar = match avatar {
        Some(avatar) if avatar.trim().is_empty() => {
            let current = db::get_user(&db_pool, actor.id).await?.ok_or(BookingError::NotFound("user"))?;
            Some(default_avatar(name.unwrap_or(&current.name)))
        }
        avatar => avatar,
    };
    let skills = skills.map(|skills| {
        skills
            .into_iter()
            .map(|skill| skill.trim().to_owned())
            .filter(|skill| !skill.is_empty())
            .collect::<Vec<_>>()
    });

    let user = db::update_user(
        &db_pool,
        actor.id,
        ProfileUpdate {
            name,
            bio,
            skills: skills.as_deref(),
            avatar: avatar.as_deref(),
        },
    )
    .await?;
    tracing::info!(user_id = %user.id, "profile updated");

    Ok(Json(user))
}

#[debug_handler]
pub(crate) async fn mentors(State(db_pool): State<SqlitePool>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(db::list_mentors(&db_pool).await?))
}

#[debug_handler]
pub(crate) async fn user(
    Path(user_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Json<User>> {
    let user = db::get_user(&db_pool, user_id).await?.ok_or(BookingError::NotFound("user"))?;
    Ok(Json(user))
}

/// The mentees a mentor may assign tasks to.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn my_mentees(
    State(db_pool): State<SqlitePool>,
    actor: Actor,
) -> AppResult<Json<Vec<User>>> {
    actor.require(Role::Mentor)?;
    Ok(Json(db::list_mentees_of(&db_pool, actor.id).await?))
}
