use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use sqlx::SqlitePool;
use tower_sessions::Session as UserSession;
use uuid::Uuid;

use crate::{db, error::BookingError, model::Role, AppError};

pub const USER_ID: &str = "user_id";

/// The signed-in user, resolved once per request and handed to every core
/// operation explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn is_mentor(&self) -> bool {
        self.role == Role::Mentor
    }

    pub fn require(&self, role: Role) -> Result<(), BookingError> {
        if self.role == role {
            Ok(())
        } else {
            Err(BookingError::authorization(format!("only a {role} can do this")))
        }
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
    SqlitePool: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = UserSession::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::from(msg))?;

        let Some(user_id) = session.get::<Uuid>(USER_ID).await? else {
            return Err(BookingError::Unauthenticated.into());
        };

        let db_pool = SqlitePool::from_ref(state);
        let Some(user) = db::get_user(&db_pool, user_id).await? else {
            session.flush().await?;
            return Err(BookingError::Unauthenticated.into());
        };

        Ok(Actor { id: user.id, role: user.role })
    }
}
