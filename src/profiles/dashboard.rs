use axum::{debug_handler, extract::State, Json};
use serde::Serialize;
use sqlx::SqlitePool;
use time::Date;

use crate::{
    availability::today,
    booking::{service, state::{SessionStatus, TaskStatus}},
    db,
    error::BookingError,
    model::{AvailabilitySlot, SessionView, Task, User},
    session::Actor,
    AppResult,
};

#[derive(Serialize)]
pub(crate) struct Dashboard {
    user: User,
    sessions: Vec<SessionView>,
    tasks: Vec<Task>,
    #[serde(skip_serializing_if = "Option::is_none")]
    availability: Option<Vec<AvailabilitySlot>>,
    /// Pending or confirmed sessions from today on for a mentor, open tasks
    /// for a mentee.
    headline: usize,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn dashboard(
    State(db_pool): State<SqlitePool>,
    actor: Actor,
) -> AppResult<Json<Dashboard>> {
    let user = db::get_user(&db_pool, actor.id).await?.ok_or(BookingError::NotFound("user"))?;
    let sessions = service::sessions_for(&db_pool, &actor).await?;
    let tasks = db::list_tasks(&db_pool, actor.id).await?;

    let (availability, headline) = if actor.is_mentor() {
        let count = upcoming(&sessions, today());
        (Some(db::list_availability(&db_pool, actor.id).await?), count)
    } else {
        let open = tasks.iter().filter(|task| task.status != TaskStatus::Completed).count();
        (None, open)
    };

    Ok(Json(Dashboard { user, sessions, tasks, availability, headline }))
}

fn upcoming(sessions: &[SessionView], today: Date) -> usize {
    sessions
        .iter()
        .filter(|view| matches!(view.session.status, SessionStatus::Pending | SessionStatus::Confirmed))
        .filter(|view| view.session.datetime.date() >= today)
        .count()
}
