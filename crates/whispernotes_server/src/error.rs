//! HTTP error mapping.
//!
//! Every non-2xx response carries `{"error": <kind>, "message": <text>}`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use whispernotes_core::{ApiError, ApiErrorKind, NoteServiceError, ThemeError};

#[derive(Debug)]
pub enum AppError {
    Validation(String),
    NotFound(String),
    Internal(anyhow::Error),
}

impl AppError {
    fn kind(&self) -> ApiErrorKind {
        match self {
            Self::Validation(_) => ApiErrorKind::ValidationError,
            Self::NotFound(_) => ApiErrorKind::NotFound,
            Self::Internal(_) => ApiErrorKind::InternalError,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();
        let message = match self {
            Self::Validation(message) | Self::NotFound(message) => message,
            Self::Internal(err) => {
                error!(
                    "event=http_error module=server status=error error_code=internal error={err:#}"
                );
                "internal server error".to_string()
            }
        };

        (status, Json(ApiError { error: kind, message })).into_response()
    }
}

impl From<NoteServiceError> for AppError {
    fn from(err: NoteServiceError) -> Self {
        match err {
            NoteServiceError::Validation(inner) => Self::Validation(inner.to_string()),
            NoteServiceError::NoteNotFound(_) => Self::NotFound(err.to_string()),
            other => Self::Internal(anyhow::Error::new(other)),
        }
    }
}

impl From<ThemeError> for AppError {
    fn from(err: ThemeError) -> Self {
        match err {
            ThemeError::NotFound(_) => Self::NotFound(err.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}
