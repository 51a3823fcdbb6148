use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hearth_core::errors::{DatabaseError, Error as CoreError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(CoreError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Core(CoreError::Database(DatabaseError::NotFound(_))) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Core(CoreError::Database(DatabaseError::UniqueViolation(_))) => {
                StatusCode::CONFLICT
            }
            ApiError::Core(CoreError::Database(DatabaseError::ForeignKeyViolation(_))) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Core(_) | ApiError::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
