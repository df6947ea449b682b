//! Session and task lifecycles, and which party may move them.
//!
//! These checks are pure: they look at the record as loaded and the acting
//! user, and either name the status to write or refuse. The caller performs
//! the write conditioned on the status the decision was made against.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::{macros::format_description, Date, PrimitiveDateTime, Time};

use crate::{
    availability::resolve_dates,
    error::{BookingError, BookingResult},
    model::{AvailabilitySlot, Session, Task},
    session::Actor,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        use SessionStatus::*;
        match self {
            Pending => "pending",
            Confirmed => "confirmed",
            Completed => "completed",
            Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Cancelled)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

/// Who besides the mentor may cancel a pending or confirmed session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CancelPolicy {
    /// Either party of the session.
    #[default]
    Either,
    /// Only the session's mentor.
    Mentor,
}

/// Decides whether `actor` may move `session` to `to`.
///
/// Returns the status the session is currently in, which the write must be
/// conditioned on.
pub fn session_transition(
    actor: &Actor,
    session: &Session,
    to: SessionStatus,
    policy: CancelPolicy,
) -> BookingResult<SessionStatus> {
    use SessionStatus::*;

    let is_mentor = actor.id == session.mentor_id;
    let is_mentee = actor.id == session.mentee_id;
    if !is_mentor && !is_mentee {
        return Err(BookingError::authorization("not a party to this session"));
    }

    let from = session.status;
    let mentor_only = match (from, to) {
        (Pending, Confirmed) | (Confirmed, Completed) => true,
        (Pending | Confirmed, Cancelled) => policy == CancelPolicy::Mentor,
        _ => {
            return Err(BookingError::validation(format!(
                "a {from} session can't become {to}"
            )));
        }
    };

    if mentor_only && !is_mentor {
        return Err(BookingError::authorization(format!(
            "only the session's mentor can mark it {to}"
        )));
    }

    Ok(from)
}

/// Decides whether `actor` may set `task` to `target`. `None` means the task
/// already has that status and nothing needs writing.
pub fn task_transition(actor: &Actor, task: &Task, target: TaskStatus) -> BookingResult<Option<TaskStatus>> {
    if actor.id != task.assigned_to && actor.id != task.created_by {
        return Err(BookingError::authorization("not your task"));
    }
    if target == TaskStatus::InProgress {
        return Err(BookingError::validation("tasks can only be set to pending or completed"));
    }
    if task.status == target {
        return Ok(None);
    }
    Ok(Some(target))
}

/// Checks that `date` is one of the slot's bookable dates in the window
/// starting `today`, and combines it with the slot's start time.
pub fn booking_datetime(
    slot: &AvailabilitySlot,
    date: Date,
    today: Date,
    window_days: u32,
) -> BookingResult<PrimitiveDateTime> {
    if !resolve_dates(&slot.day, today, window_days).contains(&date) {
        return Err(BookingError::validation(format!(
            "{date} is not a bookable date for this slot"
        )));
    }
    let start = parse_clock(&slot.start_time)
        .ok_or_else(|| BookingError::validation("slot has an unreadable start time"))?;
    Ok(PrimitiveDateTime::new(date, start))
}

/// Parses an `HH:MM` wall-clock time.
pub fn parse_clock(value: &str) -> Option<Time> {
    Time::parse(value, format_description!("[hour]:[minute]")).ok()
}
