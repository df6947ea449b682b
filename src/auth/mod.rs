//! Sign-up and sign-in. Proving who owns an email address is left to
//! whatever sits in front of this service; here an email picks the account
//! and the cookie session remembers it.

mod login;
mod logout;
mod register;

use axum::{routing::post, Router};
use tower_sessions::Session as UserSession;
use uuid::Uuid;

use crate::{session::USER_ID, AppResult, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register::register))
        .route("/auth/login", post(login::login))
        .route("/auth/logout", post(logout::logout))
}

async fn sign_in(session: &UserSession, user_id: Uuid) -> AppResult<()> {
    session.cycle_id().await?;
    session.insert(USER_ID, user_id).await?;
    Ok(())
}
