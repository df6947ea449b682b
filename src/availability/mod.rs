mod resolve;
mod slots;

use axum::{routing::{delete, get, post}, Router};
use time::{Date, OffsetDateTime};

use crate::AppState;

pub use resolve::{parse_weekday, resolve_dates, DEFAULT_WINDOW_DAYS};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/mentors/{mentor_id}/availability", get(slots::list))
        .route("/mentors/{mentor_id}/availability/dates", get(slots::dates))
        .route("/availability", post(slots::add))
        .route("/availability/{slot_id}", delete(slots::remove))
}

/// Today's local calendar date, falling back to UTC when the local offset
/// can't be determined.
pub fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}
