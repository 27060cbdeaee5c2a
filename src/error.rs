use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::{identity::IdentityError, repository::RepositoryError};

/// ApiError
///
/// Failure of a user-initiated action, rendered as `{ "error": "..." }`.
/// Routing decisions (redirects, rewrites) never go through this type.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Rejected input, including a board name that is already taken.
    #[error("{0}")]
    BadRequest(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("Not found")]
    NotFound,

    /// Data store or identity provider failure. The detail is logged, never returned.
    #[error("Server error")]
    Internal(String),
}

impl ApiError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            tracing::error!(%detail, "request failed");
        }
        let body = Json(json!({ "error": self.to_string() }));
        (self.status_code(), body).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::SlugTaken => {
                Self::BadRequest("That board name is taken. Try another.".to_string())
            }
            RepositoryError::OwnerAlreadyHasBoard => {
                Self::BadRequest("This account already has a board.".to_string())
            }
            RepositoryError::Database(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Rejected(reason) => Self::BadRequest(reason),
            IdentityError::Unavailable(detail) => Self::Internal(detail),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for ApiError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Internal(format!("session signing failed: {err}"))
    }
}
