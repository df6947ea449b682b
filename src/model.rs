use std::fmt;

use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::booking::state::{SessionStatus, TaskStatus};

time::serde::format_description!(wall_clock, PrimitiveDateTime, "[year]-[month]-[day]T[hour]:[minute]");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Role {
    Mentor,
    Mentee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Mentor => "mentor",
            Role::Mentee => "mentee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub avatar: Option<String>,
}

/// A mentor's recurring weekly window. `day` is kept as stored so a corrupt
/// value resolves to no dates instead of failing the whole listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailabilitySlot {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub day: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
    #[serde(with = "wall_clock")]
    pub datetime: PrimitiveDateTime,
    pub link: Option<String>,
    pub status: SessionStatus,
}

/// A session as seen by one of its parties, with the other party attached.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub session: Session,
    pub counterpart: Option<User>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub id: Uuid,
    pub session_id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub assigned_to: Uuid,
    pub created_by: Uuid,
}

pub const PLACEHOLDER_SESSION: &str = "generic";

pub fn default_avatar(name: &str) -> String {
    let seed = name.split_whitespace().collect::<Vec<_>>().join("+");
    format!("https://api.dicebear.com/7.x/initials/svg?seed={seed}")
}
