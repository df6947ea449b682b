use axum::http::StatusCode;

pub type BookingResult<T> = Result<T, BookingError>;

/// Failures surfaced by the booking core. Nothing here is retried.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// Missing or malformed input, or a transition the lifecycle doesn't define.
    #[error("{0}")]
    Validation(String),

    /// The actor may not perform the requested operation.
    #[error("{0}")]
    Authorization(String),

    #[error("not signed in")]
    Unauthenticated,

    #[error("{0} not found")]
    NotFound(&'static str),

    /// The data store could not be reached or returned something unusable.
    #[error("data store unavailable: {0}")]
    Transient(#[source] sqlx::Error),
}

impl BookingError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn authorization(msg: impl Into<String>) -> Self {
        Self::Authorization(msg.into())
    }

    pub fn kind(&self) -> &'static str {
        use BookingError::*;
        match self {
            Validation(_) => "validation",
            Authorization(_) | Unauthenticated => "authorization",
            NotFound(_) => "not_found",
            Transient(_) => "transient",
        }
    }

    pub fn status(&self) -> StatusCode {
        use BookingError::*;
        match self {
            Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Authorization(_) => StatusCode::FORBIDDEN,
            Unauthenticated => StatusCode::UNAUTHORIZED,
            NotFound(_) => StatusCode::NOT_FOUND,
            Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<sqlx::Error> for BookingError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound("record"),
            err => Self::Transient(err),
        }
    }
}
