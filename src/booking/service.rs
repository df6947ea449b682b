//! Transition-gated mutations over the store. Each one checks the actor
//! against the record as loaded and writes at most once; status changes hand
//! back the caller's refreshed sessions or tasks.

use rand::Rng;
use sqlx::SqlitePool;
use time::Date;
use uuid::Uuid;

use crate::{
    config::Config,
    db::{self, NewTask},
    error::{BookingError, BookingResult},
    model::{Role, Session, SessionView, Task, PLACEHOLDER_SESSION},
    session::Actor,
};

use super::state::{booking_datetime, session_transition, task_transition, SessionStatus, TaskStatus};

/// A mentee's pick: one of the mentor's slots plus one of its resolved dates.
#[derive(Debug, Clone, Default)]
pub struct BookingRequest {
    pub mentor_id: Uuid,
    pub slot_id: Option<Uuid>,
    pub date: Option<Date>,
}

pub async fn book_session(
    db_pool: &SqlitePool,
    actor: &Actor,
    request: BookingRequest,
    today: Date,
    config: &Config,
) -> BookingResult<Session> {
    actor.require(Role::Mentee)?;
    let slot_id = request.slot_id.ok_or_else(|| BookingError::validation("select a slot first"))?;
    let date = request.date.ok_or_else(|| BookingError::validation("select a date first"))?;

    match db::get_user(db_pool, request.mentor_id).await? {
        Some(mentor) if mentor.role == Role::Mentor => {}
        _ => return Err(BookingError::NotFound("mentor")),
    }
    let slot = db::get_slot(db_pool, slot_id)
        .await?
        .filter(|slot| slot.mentor_id == request.mentor_id)
        .ok_or(BookingError::NotFound("slot"))?;

    let datetime = booking_datetime(&slot, date, today, config.booking_window_days)?;
    let link = meeting_link(&config.meeting_link_base);

    let session = db::create_session(
        db_pool,
        request.mentor_id,
        actor.id,
        datetime,
        &link,
        SessionStatus::Pending,
    )
    .await?;
    tracing::info!(
        session_id = %session.id,
        mentor_id = %session.mentor_id,
        mentee_id = %session.mentee_id,
        slot_id = %slot.id,
        "session booked"
    );
    Ok(session)
}

pub async fn set_session_status(
    db_pool: &SqlitePool,
    actor: &Actor,
    session_id: Uuid,
    to: SessionStatus,
    config: &Config,
) -> BookingResult<Vec<SessionView>> {
    let session = db::get_session(db_pool, session_id)
        .await?
        .ok_or(BookingError::NotFound("session"))?;
    let from = session_transition(actor, &session, to, config.cancel_policy)?;
    db::set_session_status(db_pool, session_id, from, to).await?;
    sessions_for(db_pool, actor).await
}

/// The actor's sessions, earliest first, each with the other party attached.
pub async fn sessions_for(db_pool: &SqlitePool, actor: &Actor) -> BookingResult<Vec<SessionView>> {
    let sessions = db::list_sessions(db_pool, actor.id, actor.role).await?;

    let mut views = Vec::with_capacity(sessions.len());
    for session in sessions {
        let other = match actor.role {
            Role::Mentor => session.mentee_id,
            Role::Mentee => session.mentor_id,
        };
        views.push(SessionView {
            counterpart: db::get_user(db_pool, other).await?,
            session,
        });
    }
    Ok(views)
}

#[derive(Debug, Clone, Default)]
pub struct TaskRequest {
    pub title: String,
    pub description: String,
    pub assigned_to: Option<Uuid>,
    pub session_id: Option<String>,
}

/// Mentees write tasks for themselves; mentors assign to a mentee they have
/// had a session with.
pub async fn create_task(db_pool: &SqlitePool, actor: &Actor, request: TaskRequest) -> BookingResult<Task> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(BookingError::validation("a task needs a title"));
    }

    let assigned_to = match actor.role {
        Role::Mentee => match request.assigned_to {
            None => actor.id,
            Some(id) if id == actor.id => actor.id,
            Some(_) => return Err(BookingError::authorization("mentees can only assign tasks to themselves")),
        },
        Role::Mentor => {
            let mentee = request
                .assigned_to
                .ok_or_else(|| BookingError::validation("choose a mentee to assign the task to"))?;
            if !db::shares_session(db_pool, actor.id, mentee).await? {
                return Err(BookingError::authorization("you have no sessions with that mentee"));
            }
            mentee
        }
    };

    db::insert_task(
        db_pool,
        NewTask {
            session_id: request.session_id.as_deref().unwrap_or(PLACEHOLDER_SESSION),
            title,
            description: request.description.trim(),
            assigned_to,
            created_by: actor.id,
        },
    )
    .await
}

pub async fn set_task_status(
    db_pool: &SqlitePool,
    actor: &Actor,
    task_id: Uuid,
    target: TaskStatus,
) -> BookingResult<Vec<Task>> {
    let task = db::get_task(db_pool, task_id)
        .await?
        .ok_or(BookingError::NotFound("task"))?;
    if let Some(status) = task_transition(actor, &task, target)? {
        db::set_task_status(db_pool, task_id, status).await?;
        tracing::info!(%task_id, ?status, "task status changed");
    }
    db::list_tasks(db_pool, actor.id).await
}

/// `<base>/xxx-xxxx-xxx` with a random lowercase room code.
pub fn meeting_link(base: &str) -> String {
    let mut rng = rand::rng();
    let mut part = |len: usize| -> String {
        (0..len)
            .map(|_| char::from(b'a' + rng.random_range(0..26u8)))
            .collect()
    };
    let (head, middle, tail) = (part(3), part(4), part(3));
    format!("{base}/{head}-{middle}-{tail}")
}

#[cfg(test)]
mod tests {
    use sqlx::sqlite::SqlitePoolOptions;
    use time::macros::{date, datetime};

    use super::*;
    use crate::{booking::state::CancelPolicy, db::NewUser};

    async fn pool() -> SqlitePool {
        let db_pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        db::migrate(&db_pool).await.unwrap();
        db_pool
    }

    async fn user(db_pool: &SqlitePool, name: &str, role: Role) -> Actor {
        let user = db::insert_user(
            db_pool,
            NewUser {
                name,
                email: &format!("{}@example.com", name.to_lowercase()),
                role,
                bio: None,
                skills: &[],
                avatar: "",
            },
        )
        .await
        .unwrap();
        Actor { id: user.id, role: user.role }
    }

    struct Fixture {
        db_pool: SqlitePool,
        mentor: Actor,
        mentee: Actor,
        slot_id: Uuid,
        config: Config,
    }

    async fn fixture() -> Fixture {
        let db_pool = pool().await;
        let mentor = user(&db_pool, "Amal", Role::Mentor).await;
        let mentee = user(&db_pool, "Omar", Role::Mentee).await;
        let slot = db::insert_slot(&db_pool, mentor.id, "Sunday", "09:00", "10:00").await.unwrap();
        Fixture { db_pool, mentor, mentee, slot_id: slot.id, config: Config::default() }
    }

    impl Fixture {
        async fn book(&self) -> Session {
            book_session(
                &self.db_pool,
                &self.mentee,
                BookingRequest {
                    mentor_id: self.mentor.id,
                    slot_id: Some(self.slot_id),
                    date: Some(date!(2024-01-07)),
                },
                date!(2024-01-01),
                &self.config,
            )
            .await
            .unwrap()
        }
    }

    #[tokio::test]
    async fn booking_a_resolved_date_creates_a_pending_session() {
        let f = fixture().await;
        let session = f.book().await;

        assert_eq!(session.datetime, datetime!(2024-01-07 09:00));
        assert_eq!(session.status, SessionStatus::Pending);
        assert_eq!(session.mentor_id, f.mentor.id);
        assert_eq!(session.mentee_id, f.mentee.id);
        assert!(session.link.as_deref().unwrap().starts_with("https://meet.google.com/"));

        let stored = db::get_session(&f.db_pool, session.id).await.unwrap().unwrap();
        assert_eq!(stored, session);
        assert_eq!(db::list_availability(&f.db_pool, f.mentor.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn same_slot_books_again_on_another_date() {
        let f = fixture().await;
        f.book().await;
        let second = book_session(
            &f.db_pool,
            &f.mentee,
            BookingRequest { mentor_id: f.mentor.id, slot_id: Some(f.slot_id), date: Some(date!(2024-01-14)) },
            date!(2024-01-01),
            &f.config,
        )
        .await
        .unwrap();
        assert_eq!(second.datetime, datetime!(2024-01-14 09:00));
    }

    #[tokio::test]
    async fn booking_needs_slot_and_date() {
        let f = fixture().await;
        for request in [
            BookingRequest { mentor_id: f.mentor.id, slot_id: None, date: Some(date!(2024-01-07)) },
            BookingRequest { mentor_id: f.mentor.id, slot_id: Some(f.slot_id), date: None },
        ] {
            let err = book_session(&f.db_pool, &f.mentee, request, date!(2024-01-01), &f.config)
                .await
                .unwrap_err();
            assert!(matches!(err, BookingError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn mentors_cannot_book() {
        let f = fixture().await;
        let err = book_session(
            &f.db_pool,
            &f.mentor,
            BookingRequest { mentor_id: f.mentor.id, slot_id: Some(f.slot_id), date: Some(date!(2024-01-07)) },
            date!(2024-01-01),
            &f.config,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BookingError::Authorization(_)));
    }

    #[tokio::test]
    async fn slot_must_belong_to_the_mentor() {
        let f = fixture().await;
        let other = user(&f.db_pool, "Huda", Role::Mentor).await;
        let err = book_session(
            &f.db_pool,
            &f.mentee,
            BookingRequest { mentor_id: other.id, slot_id: Some(f.slot_id), date: Some(date!(2024-01-07)) },
            date!(2024-01-01),
            &f.config,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BookingError::NotFound("slot")));
    }

    #[tokio::test]
    async fn only_the_mentor_confirms() {
        let f = fixture().await;
        let session = f.book().await;

        let err = set_session_status(&f.db_pool, &f.mentee, session.id, SessionStatus::Confirmed, &f.config)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Authorization(_)));
        let stored = db::get_session(&f.db_pool, session.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SessionStatus::Pending);

        let views = set_session_status(&f.db_pool, &f.mentor, session.id, SessionStatus::Confirmed, &f.config)
            .await
            .unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].session.status, SessionStatus::Confirmed);
        assert_eq!(views[0].counterpart.as_ref().unwrap().id, f.mentee.id);

        let views = set_session_status(&f.db_pool, &f.mentor, session.id, SessionStatus::Completed, &f.config)
            .await
            .unwrap();
        assert_eq!(views[0].session.status, SessionStatus::Completed);
    }

    #[tokio::test]
    async fn mentee_cancels_under_the_default_policy() {
        let f = fixture().await;
        let session = f.book().await;
        let views = set_session_status(&f.db_pool, &f.mentee, session.id, SessionStatus::Cancelled, &f.config)
            .await
            .unwrap();
        assert_eq!(views[0].session.status, SessionStatus::Cancelled);
        assert_eq!(views[0].counterpart.as_ref().unwrap().id, f.mentor.id);
    }

    #[tokio::test]
    async fn mentor_only_policy_keeps_mentees_from_cancelling() {
        let mut f = fixture().await;
        f.config.cancel_policy = CancelPolicy::Mentor;
        let session = f.book().await;

        let err = set_session_status(&f.db_pool, &f.mentee, session.id, SessionStatus::Cancelled, &f.config)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Authorization(_)));
        let stored = db::get_session(&f.db_pool, session.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SessionStatus::Pending);

        let views = set_session_status(&f.db_pool, &f.mentor, session.id, SessionStatus::Cancelled, &f.config)
            .await
            .unwrap();
        assert_eq!(views[0].session.status, SessionStatus::Cancelled);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let f = fixture().await;
        let err = set_session_status(&f.db_pool, &f.mentor, Uuid::now_v7(), SessionStatus::Confirmed, &f.config)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::NotFound("session")));
    }

    #[tokio::test]
    async fn stale_status_write_is_refused() {
        let f = fixture().await;
        let session = f.book().await;
        db::set_session_status(&f.db_pool, session.id, SessionStatus::Pending, SessionStatus::Cancelled)
            .await
            .unwrap();
        let err = db::set_session_status(&f.db_pool, session.id, SessionStatus::Pending, SessionStatus::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));
        let stored = db::get_session(&f.db_pool, session.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SessionStatus::Cancelled);
    }

    #[tokio::test]
    async fn mentor_assigns_only_to_their_mentees() {
        let f = fixture().await;
        let request = TaskRequest {
            title: "Sketch the schema".to_owned(),
            assigned_to: Some(f.mentee.id),
            ..Default::default()
        };

        let err = create_task(&f.db_pool, &f.mentor, request.clone()).await.unwrap_err();
        assert!(matches!(err, BookingError::Authorization(_)));

        f.book().await;
        let task = create_task(&f.db_pool, &f.mentor, request).await.unwrap();
        assert_eq!(task.assigned_to, f.mentee.id);
        assert_eq!(task.created_by, f.mentor.id);
        assert_eq!(task.session_id, PLACEHOLDER_SESSION);
        assert_eq!(task.status, TaskStatus::Pending);

        let err = create_task(
            &f.db_pool,
            &f.mentor,
            TaskRequest { title: "No one".to_owned(), ..Default::default() },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));
    }

    #[tokio::test]
    async fn mentor_sees_the_tasks_they_handed_out() {
        let f = fixture().await;
        f.book().await;
        let task = create_task(
            &f.db_pool,
            &f.mentor,
            TaskRequest { title: "Refactor".to_owned(), assigned_to: Some(f.mentee.id), ..Default::default() },
        )
        .await
        .unwrap();

        let tasks = set_task_status(&f.db_pool, &f.mentor, task.id, TaskStatus::Completed).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, task.id);
        assert_eq!(tasks[0].status, TaskStatus::Completed);

        let mentee_tasks = db::list_tasks(&f.db_pool, f.mentee.id).await.unwrap();
        assert_eq!(mentee_tasks.len(), 1);
        assert_eq!(mentee_tasks[0].status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn mentee_tasks_are_self_assigned() {
        let f = fixture().await;
        let task = create_task(
            &f.db_pool,
            &f.mentee,
            TaskRequest { title: "  Practice  ".to_owned(), ..Default::default() },
        )
        .await
        .unwrap();
        assert_eq!(task.assigned_to, f.mentee.id);
        assert_eq!(task.title, "Practice");

        let err = create_task(
            &f.db_pool,
            &f.mentee,
            TaskRequest { title: "Yours".to_owned(), assigned_to: Some(f.mentor.id), ..Default::default() },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BookingError::Authorization(_)));

        let err = create_task(&f.db_pool, &f.mentee, TaskRequest::default()).await.unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));
    }

    #[tokio::test]
    async fn completing_twice_stays_completed() {
        let f = fixture().await;
        let task = create_task(
            &f.db_pool,
            &f.mentee,
            TaskRequest { title: "Read".to_owned(), ..Default::default() },
        )
        .await
        .unwrap();

        for _ in 0..2 {
            let tasks = set_task_status(&f.db_pool, &f.mentee, task.id, TaskStatus::Completed).await.unwrap();
            assert_eq!(tasks.len(), 1);
            assert_eq!(tasks[0].status, TaskStatus::Completed);
        }

        let tasks = set_task_status(&f.db_pool, &f.mentee, task.id, TaskStatus::Pending).await.unwrap();
        assert_eq!(tasks[0].status, TaskStatus::Pending);

        let err = set_task_status(&f.db_pool, &f.mentee, Uuid::now_v7(), TaskStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::NotFound("task")));
    }

    #[test]
    fn meeting_links_look_like_room_codes() {
        let link = meeting_link("https://meet.example.org");
        let code = link.strip_prefix("https://meet.example.org/").unwrap();
        let parts: Vec<_> = code.split('-').collect();
        assert_eq!(parts.iter().map(|p| p.len()).collect::<Vec<_>>(), vec![3, 4, 3]);
        assert!(code.chars().all(|c| c == '-' || c.is_ascii_lowercase()));
    }
}
