//! Data access. Every query the service runs lives here; ids are stored as
//! hyphenated UUID text and converted at the row boundary.

use sqlx::{FromRow, SqlitePool};
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::{
    booking::state::{SessionStatus, TaskStatus},
    error::{BookingError, BookingResult},
    model::{AvailabilitySlot, Role, Session, Task, User},
};

fn uuid(value: &str) -> Result<Uuid, sqlx::Error> {
    Uuid::parse_str(value).map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

#[derive(FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    role: Role,
    bio: Option<String>,
    skills: String,
    avatar: Option<String>,
}

impl TryFrom<UserRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: uuid(&row.id)?,
            name: row.name,
            email: row.email,
            role: row.role,
            bio: row.bio,
            skills: serde_json::from_str(&row.skills).map_err(|err| sqlx::Error::Decode(Box::new(err)))?,
            avatar: row.avatar,
        })
    }
}

#[derive(FromRow)]
struct SlotRow {
    id: String,
    mentor_id: String,
    day: String,
    start_time: String,
    end_time: String,
}

impl TryFrom<SlotRow> for AvailabilitySlot {
    type Error = sqlx::Error;

    fn try_from(row: SlotRow) -> Result<Self, Self::Error> {
        Ok(AvailabilitySlot {
            id: uuid(&row.id)?,
            mentor_id: uuid(&row.mentor_id)?,
            day: row.day,
            start_time: row.start_time,
            end_time: row.end_time,
        })
    }
}

#[derive(FromRow)]
struct SessionRow {
    id: String,
    mentor_id: String,
    mentee_id: String,
    datetime: String,
    link: Option<String>,
    status: SessionStatus,
}

impl TryFrom<SessionRow> for Session {
    type Error = sqlx::Error;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        Ok(Session {
            id: uuid(&row.id)?,
            mentor_id: uuid(&row.mentor_id)?,
            mentee_id: uuid(&row.mentee_id)?,
            datetime: PrimitiveDateTime::parse(&row.datetime, DATETIME)
                .map_err(|err| sqlx::Error::Decode(Box::new(err)))?,
            link: row.link,
            status: row.status,
        })
    }
}

#[derive(FromRow)]
struct TaskRow {
    id: String,
    session_id: String,
    title: String,
    description: String,
    status: TaskStatus,
    assigned_to: String,
    created_by: String,
}

impl TryFrom<TaskRow> for Task {
    type Error = sqlx::Error;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        Ok(Task {
            id: uuid(&row.id)?,
            session_id: row.session_id,
            title: row.title,
            description: row.description,
            status: row.status,
            assigned_to: uuid(&row.assigned_to)?,
            created_by: uuid(&row.created_by)?,
        })
    }
}

const DATETIME: &[time::format_description::BorrowedFormatItem<'static>] =
    time::macros::format_description!("[year]-[month]-[day]T[hour]:[minute]");

fn convert<R, T>(rows: Vec<R>) -> Result<Vec<T>, sqlx::Error>
where
    T: TryFrom<R, Error = sqlx::Error>,
{
    rows.into_iter().map(T::try_from).collect()
}

pub async fn migrate(db_pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(db_pool).await
}

// users

pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub role: Role,
    pub bio: Option<&'a str>,
    pub skills: &'a [String],
    pub avatar: &'a str,
}

pub async fn insert_user(db_pool: &SqlitePool, new: NewUser<'_>) -> BookingResult<User> {
    let id = Uuid::now_v7();
    let skills = serde_json::to_string(new.skills).map_err(|err| sqlx::Error::Encode(Box::new(err)))?;

    let inserted = sqlx::query("INSERT INTO users (id,name,email,role,bio,skills,avatar) VALUES (?,?,?,?,?,?,?)")
        .bind(id.to_string())
        .bind(new.name)
        .bind(new.email)
        .bind(new.role)
        .bind(new.bio)
        .bind(&skills)
        .bind(new.avatar)
        .execute(db_pool)
        .await;
    match inserted {
        Ok(_) => {}
        Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
            return Err(BookingError::validation(format!("{} is already registered", new.email)));
        }
        Err(err) => return Err(err.into()),
    }

    tracing::info!(user_id = %id, role = %new.role, "registered user");
    get_user(db_pool, id).await?.ok_or(BookingError::NotFound("user"))
}

pub async fn get_user(db_pool: &SqlitePool, id: Uuid) -> BookingResult<Option<User>> {
    let row: Option<UserRow> = sqlx::query_as("SELECT id,name,email,role,bio,skills,avatar FROM users WHERE id=?")
        .bind(id.to_string())
        .fetch_optional(db_pool)
        .await?;
    Ok(row.map(User::try_from).transpose()?)
}

pub async fn find_user_by_email(db_pool: &SqlitePool, email: &str) -> BookingResult<Option<User>> {
    let row: Option<UserRow> = sqlx::query_as("SELECT id,name,email,role,bio,skills,avatar FROM users WHERE email=?")
        .bind(email)
        .fetch_optional(db_pool)
        .await?;
    Ok(row.map(User::try_from).transpose()?)
}

/// `None` leaves a field as it is. An empty `bio` clears it.
pub struct ProfileUpdate<'a> {
    pub name: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub skills: Option<&'a [String]>,
    pub avatar: Option<&'a str>,
}

pub async fn update_user(db_pool: &SqlitePool, id: Uuid, update: ProfileUpdate<'_>) -> BookingResult<User> {
    let skills = update
        .skills
        .map(serde_json::to_string)
        .transpose()
        .map_err(|err| sqlx::Error::Encode(Box::new(err)))?;

    let result = sqlx::query(
        "UPDATE users SET name=COALESCE(?1,name), bio=CASE WHEN ?2 IS NULL THEN bio ELSE NULLIF(?2,'') END, \
         skills=COALESCE(?3,skills), avatar=COALESCE(?4,avatar) WHERE id=?5",
    )
    .bind(update.name)
    .bind(update.bio)
    .bind(skills)
    .bind(update.avatar)
    .bind(id.to_string())
    .execute(db_pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(BookingError::NotFound("user"));
    }

    get_user(db_pool, id).await?.ok_or(BookingError::NotFound("user"))
}

pub async fn list_mentors(db_pool: &SqlitePool) -> BookingResult<Vec<User>> {
    let rows: Vec<UserRow> = sqlx::query_as(
        "SELECT id,name,email,role,bio,skills,avatar FROM users WHERE role='mentor' ORDER BY name,id",
    )
    .fetch_all(db_pool)
    .await?;
    Ok(convert(rows)?)
}

/// Mentees who share at least one session with `mentor_id`.
pub async fn list_mentees_of(db_pool: &SqlitePool, mentor_id: Uuid) -> BookingResult<Vec<User>> {
    let rows: Vec<UserRow> = sqlx::query_as(
        "SELECT id,name,email,role,bio,skills,avatar FROM users
         WHERE id IN (SELECT mentee_id FROM sessions WHERE mentor_id=?)
         ORDER BY name,id",
    )
    .bind(mentor_id.to_string())
    .fetch_all(db_pool)
    .await?;
    Ok(convert(rows)?)
}

pub async fn shares_session(db_pool: &SqlitePool, mentor_id: Uuid, mentee_id: Uuid) -> BookingResult<bool> {
    Ok(sqlx::query("SELECT 1 FROM sessions WHERE mentor_id=? AND mentee_id=? LIMIT 1")
        .bind(mentor_id.to_string())
        .bind(mentee_id.to_string())
        .fetch_optional(db_pool)
        .await?
        .is_some())
}

// availability

pub async fn list_availability(db_pool: &SqlitePool, mentor_id: Uuid) -> BookingResult<Vec<AvailabilitySlot>> {
    let rows: Vec<SlotRow> = sqlx::query_as(
        "SELECT id,mentor_id,day,start_time,end_time FROM availability WHERE mentor_id=? ORDER BY rowid",
    )
    .bind(mentor_id.to_string())
    .fetch_all(db_pool)
    .await?;
    Ok(convert(rows)?)
}

pub async fn get_slot(db_pool: &SqlitePool, id: Uuid) -> BookingResult<Option<AvailabilitySlot>> {
    let row: Option<SlotRow> = sqlx::query_as("SELECT id,mentor_id,day,start_time,end_time FROM availability WHERE id=?")
        .bind(id.to_string())
        .fetch_optional(db_pool)
        .await?;
    Ok(row.map(AvailabilitySlot::try_from).transpose()?)
}

pub async fn insert_slot(
    db_pool: &SqlitePool,
    mentor_id: Uuid,
    day: &str,
    start_time: &str,
    end_time: &str,
) -> BookingResult<AvailabilitySlot> {
    let id = Uuid::now_v7();
    sqlx::query("INSERT INTO availability (id,mentor_id,day,start_time,end_time) VALUES (?,?,?,?,?)")
        .bind(id.to_string())
        .bind(mentor_id.to_string())
        .bind(day)
        .bind(start_time)
        .bind(end_time)
        .execute(db_pool)
        .await?;

    Ok(AvailabilitySlot {
        id,
        mentor_id,
        day: day.to_owned(),
        start_time: start_time.to_owned(),
        end_time: end_time.to_owned(),
    })
}

/// Removes a slot owned by `mentor_id`. Returns whether anything was removed.
pub async fn delete_slot(db_pool: &SqlitePool, id: Uuid, mentor_id: Uuid) -> BookingResult<bool> {
    let result = sqlx::query("DELETE FROM availability WHERE id=? AND mentor_id=?")
        .bind(id.to_string())
        .bind(mentor_id.to_string())
        .execute(db_pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// sessions

pub async fn create_session(
    db_pool: &SqlitePool,
    mentor_id: Uuid,
    mentee_id: Uuid,
    datetime: PrimitiveDateTime,
    link: &str,
    status: SessionStatus,
) -> BookingResult<Session> {
    let id = Uuid::now_v7();
    let stamp = datetime
        .format(DATETIME)
        .map_err(|err| sqlx::Error::Encode(Box::new(err)))?;

    sqlx::query("INSERT INTO sessions (id,mentor_id,mentee_id,datetime,link,status) VALUES (?,?,?,?,?,?)")
        .bind(id.to_string())
        .bind(mentor_id.to_string())
        .bind(mentee_id.to_string())
        .bind(&stamp)
        .bind(link)
        .bind(status)
        .execute(db_pool)
        .await?;

    Ok(Session {
        id,
        mentor_id,
        mentee_id,
        datetime,
        link: Some(link.to_owned()),
        status,
    })
}

pub async fn get_session(db_pool: &SqlitePool, id: Uuid) -> BookingResult<Option<Session>> {
    let row: Option<SessionRow> = sqlx::query_as("SELECT id,mentor_id,mentee_id,datetime,link,status FROM sessions WHERE id=?")
        .bind(id.to_string())
        .fetch_optional(db_pool)
        .await?;
    Ok(row.map(Session::try_from).transpose()?)
}

/// Sessions where `user_id` takes part in `role`, earliest first.
pub async fn list_sessions(db_pool: &SqlitePool, user_id: Uuid, role: Role) -> BookingResult<Vec<Session>> {
    let query = match role {
        Role::Mentor => "SELECT id,mentor_id,mentee_id,datetime,link,status FROM sessions WHERE mentor_id=? ORDER BY datetime,id",
        Role::Mentee => "SELECT id,mentor_id,mentee_id,datetime,link,status FROM sessions WHERE mentee_id=? ORDER BY datetime,id",
    };
    let rows: Vec<SessionRow> = sqlx::query_as(query)
        .bind(user_id.to_string())
        .fetch_all(db_pool)
        .await?;
    Ok(convert(rows)?)
}

/// Moves a session from `from` to `to`. Fails without writing if the session
/// is gone or no longer in `from`.
pub async fn set_session_status(
    db_pool: &SqlitePool,
    id: Uuid,
    from: SessionStatus,
    to: SessionStatus,
) -> BookingResult<()> {
    let result = sqlx::query("UPDATE sessions SET status=? WHERE id=? AND status=?")
        .bind(to)
        .bind(id.to_string())
        .bind(from)
        .execute(db_pool)
        .await?;
    if result.rows_affected() == 1 {
        tracing::info!(session_id = %id, %from, %to, "session status changed");
        return Ok(());
    }

    match get_session(db_pool, id).await? {
        None => Err(BookingError::NotFound("session")),
        Some(current) => Err(BookingError::validation(format!(
            "session is now {}, not {from}",
            current.status
        ))),
    }
}

// tasks

pub struct NewTask<'a> {
    pub session_id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub assigned_to: Uuid,
    pub created_by: Uuid,
}

pub async fn insert_task(db_pool: &SqlitePool, new: NewTask<'_>) -> BookingResult<Task> {
    let id = Uuid::now_v7();
    sqlx::query("INSERT INTO tasks (id,session_id,title,description,status,assigned_to,created_by) VALUES (?,?,?,?,?,?,?)")
        .bind(id.to_string())
        .bind(new.session_id)
        .bind(new.title)
        .bind(new.description)
        .bind(TaskStatus::Pending)
        .bind(new.assigned_to.to_string())
        .bind(new.created_by.to_string())
        .execute(db_pool)
        .await?;

    tracing::info!(task_id = %id, assigned_to = %new.assigned_to, "task created");
    Ok(Task {
        id,
        session_id: new.session_id.to_owned(),
        title: new.title.to_owned(),
        description: new.description.to_owned(),
        status: TaskStatus::Pending,
        assigned_to: new.assigned_to,
        created_by: new.created_by,
    })
}

pub async fn get_task(db_pool: &SqlitePool, id: Uuid) -> BookingResult<Option<Task>> {
    let row: Option<TaskRow> = sqlx::query_as(
        "SELECT id,session_id,title,description,status,assigned_to,created_by FROM tasks WHERE id=?",
    )
    .bind(id.to_string())
    .fetch_optional(db_pool)
    .await?;
    Ok(row.map(Task::try_from).transpose()?)
}

/// Tasks assigned to `user` or handed out by them.
pub async fn list_tasks(db_pool: &SqlitePool, user: Uuid) -> BookingResult<Vec<Task>> {
    let user = user.to_string();
    let rows: Vec<TaskRow> = sqlx::query_as(
        "SELECT id,session_id,title,description,status,assigned_to,created_by FROM tasks WHERE assigned_to=? OR created_by=? ORDER BY rowid",
    )
    .bind(&user)
    .bind(&user)
    .fetch_all(db_pool)
    .await?;
    Ok(convert(rows)?)
}

pub async fn set_task_status(db_pool: &SqlitePool, id: Uuid, status: TaskStatus) -> BookingResult<()> {
    let result = sqlx::query("UPDATE tasks SET status=? WHERE id=?")
        .bind(status)
        .bind(id.to_string())
        .execute(db_pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(BookingError::NotFound("task"));
    }
    Ok(())
}
