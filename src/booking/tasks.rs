use axum::{debug_handler, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{db, extract::{Json, Path}, model::Task, session::Actor, AppResult};

use super::{
    service::{self, TaskRequest},
    state::TaskStatus,
};

#[derive(Debug, Deserialize)]
pub(crate) struct NewTaskQuery {
    title: String,
    #[serde(default)]
    description: String,
    assigned_to: Option<Uuid>,
    session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusQuery {
    status: TaskStatus,
}

#[derive(Serialize)]
pub(crate) struct Created {
    task: Task,
    tasks: Vec<Task>,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn list(
    State(db_pool): State<SqlitePool>,
    actor: Actor,
) -> AppResult<Json<Vec<Task>>> {
    Ok(Json(db::list_tasks(&db_pool, actor.id).await?))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn create(
    State(db_pool): State<SqlitePool>,
    actor: Actor,
    Json(NewTaskQuery { title, description, assigned_to, session_id }): Json<NewTaskQuery>,
) -> AppResult<(StatusCode, Json<Created>)> {
    let request = TaskRequest { title, description, assigned_to, session_id };
    let task = service::create_task(&db_pool, &actor, request).await?;
    let tasks = db::list_tasks(&db_pool, actor.id).await?;

    Ok((StatusCode::CREATED, Json(Created { task, tasks })))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn set_status(
    Path(task_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    actor: Actor,
    Json(StatusQuery { status }): Json<StatusQuery>,
) -> AppResult<Json<Vec<Task>>> {
    Ok(Json(service::set_task_status(&db_pool, &actor, task_id, status).await?))
}
