use axum::{debug_handler, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::{macros::format_description, Date};
use uuid::Uuid;

use crate::{
    availability::today,
    config::Config,
    error::BookingError,
    extract::{Json, Path},
    model::{Session, SessionView},
    session::Actor,
    AppResult,
};

use super::{
    service::{self, BookingRequest},
    state::SessionStatus,
};

#[derive(Debug, Deserialize)]
pub(crate) struct BookQuery {
    mentor_id: Uuid,
    slot_id: Option<Uuid>,
    date: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct Booked {
    session: Session,
    sessions: Vec<SessionView>,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn list(
    State(db_pool): State<SqlitePool>,
    actor: Actor,
) -> AppResult<Json<Vec<SessionView>>> {
    Ok(Json(service::sessions_for(&db_pool, &actor).await?))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn book(
    State(db_pool): State<SqlitePool>,
    State(config): State<Config>,
    actor: Actor,
    Json(BookQuery { mentor_id, slot_id, date }): Json<BookQuery>,
) -> AppResult<(StatusCode, Json<Booked>)> {
    let date = date
        .filter(|date| !date.is_empty())
        .map(|date| {
            Date::parse(&date, format_description!("[year]-[month]-[day]"))
                .map_err(|_| BookingError::validation(format!("{date:?} is not a YYYY-MM-DD date")))
        })
        .transpose()?;

    let request = BookingRequest { mentor_id, slot_id, date };
    let session = service::book_session(&db_pool, &actor, request, today(), &config).await?;
    let sessions = service::sessions_for(&db_pool, &actor).await?;

    Ok((StatusCode::CREATED, Json(Booked { session, sessions })))
}

async fn transition(
    db_pool: &SqlitePool,
    config: &Config,
    actor: &Actor,
    session_id: Uuid,
    to: SessionStatus,
) -> AppResult<Json<Vec<SessionView>>> {
    Ok(Json(service::set_session_status(db_pool, actor, session_id, to, config).await?))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn confirm(
    Path(session_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    State(config): State<Config>,
    actor: Actor,
) -> AppResult<Json<Vec<SessionView>>> {
    transition(&db_pool, &config, &actor, session_id, SessionStatus::Confirmed).await
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn complete(
    Path(session_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    State(config): State<Config>,
    actor: Actor,
) -> AppResult<Json<Vec<SessionView>>> {
    transition(&db_pool, &config, &actor, session_id, SessionStatus::Completed).await
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn cancel(
    Path(session_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    State(config): State<Config>,
    actor: Actor,
) -> AppResult<Json<Vec<SessionView>>> {
    transition(&db_pool, &config, &actor, session_id, SessionStatus::Cancelled).await
}
