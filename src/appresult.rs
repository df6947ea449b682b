use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;

use crate::error::BookingError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    fn status(&self) -> (StatusCode, &'static str) {
        if let Some(err) = self.0.downcast_ref::<BookingError>() {
            return (err.status(), err.kind());
        }
        match self.0.downcast_ref::<sqlx::Error>() {
            Some(sqlx::Error::RowNotFound) => (StatusCode::NOT_FOUND, "not_found"),
            Some(_) => (StatusCode::SERVICE_UNAVAILABLE, "transient"),
            None => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status();
        if status.is_server_error() {
            tracing::error!("{kind}: {:#}", self.0);
        } else {
            tracing::debug!("{kind}: {}", self.0);
        }

        (
            status,
            Json(json!({
                "error": kind,
                "message": self.0.to_string(),
            })),
        )
            .into_response()
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        Self(anyhow::Error::msg(err))
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        Self(anyhow::Error::msg(err.to_owned()))
    }
}

macro_rules! apperr_impl {
    ($E:ty) => {
        impl From<$E> for AppError {
            fn from(err: $E) -> Self {
                Self(anyhow::Error::from(err))
            }
        }
    };
}

apperr_impl!(BookingError);
apperr_impl!(sqlx::Error);
apperr_impl!(tower_sessions::session::Error);
