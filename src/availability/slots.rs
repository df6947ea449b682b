use axum::{debug_handler, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    booking::state::parse_clock,
    config::Config,
    db,
    error::BookingError,
    extract::{Json, Path},
    model::{AvailabilitySlot, Role},
    session::Actor,
    AppResult,
};

use super::{parse_weekday, resolve_dates, today};

#[derive(Debug, Deserialize)]
pub(crate) struct NewSlot {
    day: String,
    start_time: String,
    end_time: String,
}

#[derive(Serialize)]
pub(crate) struct SlotDates {
    #[serde(flatten)]
    slot: AvailabilitySlot,
    dates: Vec<String>,
}

async fn mentor_slots(db_pool: &SqlitePool, mentor_id: Uuid) -> AppResult<Vec<AvailabilitySlot>> {
    match db::get_user(db_pool, mentor_id).await? {
        Some(user) if user.role == Role::Mentor => Ok(db::list_availability(db_pool, mentor_id).await?),
        _ => Err(BookingError::NotFound("mentor"))?,
    }
}

#[debug_handler]
pub(crate) async fn list(
    Path(mentor_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Json<Vec<AvailabilitySlot>>> {
    Ok(Json(mentor_slots(&db_pool, mentor_id).await?))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn dates(
    Path(mentor_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    State(config): State<Config>,
) -> AppResult<Json<Vec<SlotDates>>> {
    let start = today();
    let slots = mentor_slots(&db_pool, mentor_id).await?
        .into_iter()
        .map(|slot| SlotDates {
            dates: resolve_dates(&slot.day, start, config.booking_window_days)
                .iter()
                .map(ToString::to_string)
                .collect(),
            slot,
        })
        .collect();
    Ok(Json(slots))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn add(
    State(db_pool): State<SqlitePool>,
    actor: Actor,
    Json(NewSlot { day, start_time, end_time }): Json<NewSlot>,
) -> AppResult<(StatusCode, Json<Vec<AvailabilitySlot>>)> {
    actor.require(Role::Mentor)?;

    if parse_weekday(&day).is_none() {
        return Err(BookingError::validation(format!("{day:?} is not a day of the week")))?;
    }
    for clock in [&start_time, &end_time] {
        if parse_clock(clock).is_none() {
            return Err(BookingError::validation(format!("{clock:?} is not an HH:MM time")))?;
        }
    }

    let slot = db::insert_slot(&db_pool, actor.id, &day, &start_time, &end_time).await?;
    tracing::info!(slot_id = %slot.id, mentor_id = %actor.id, %day, "availability added");

    Ok((StatusCode::CREATED, Json(db::list_availability(&db_pool, actor.id).await?)))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn remove(
    Path(slot_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    actor: Actor,
) -> AppResult<Json<Vec<AvailabilitySlot>>> {
    actor.require(Role::Mentor)?;

    match db::get_slot(&db_pool, slot_id).await? {
        None => return Err(BookingError::NotFound("slot"))?,
        Some(slot) if slot.mentor_id != actor.id => {
            return Err(BookingError::authorization("not your slot"))?;
        }
        Some(_) => {}
    }
    if !db::delete_slot(&db_pool, slot_id, actor.id).await? {
        return Err(BookingError::NotFound("slot"))?;
    }
    tracing::info!(%slot_id, mentor_id = %actor.id, "availability removed");

    Ok(Json(db::list_availability(&db_pool, actor.id).await?))
}
