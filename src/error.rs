use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::tts::SynthesisError;

/// Errors a request can end in. The detail is logged, never sent.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Method {0} not allowed")]
    InvalidMethod(Method),

    #[error("Synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl AppError {
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            AppError::BadRequest(_) => ApiErrorKind::BadRequest,
            AppError::InvalidMethod(_) => ApiErrorKind::InvalidMethod,
            AppError::Synthesis(_) | AppError::Worker(_) => ApiErrorKind::InternalError,
        }
    }
}

/// The fixed catalogue of error bodies the API can answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    InternalError,
    InvalidMethod,
    BadRequest,
    AccountAlreadyExists,
    AccountDoesNotExist,
    NoFaceFound,
    TooManyPeople,
}

impl ApiErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ApiErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            ApiErrorKind::InvalidMethod => StatusCode::METHOD_NOT_ALLOWED,
            ApiErrorKind::BadRequest | ApiErrorKind::AccountAlreadyExists => {
                StatusCode::BAD_REQUEST
            }
            ApiErrorKind::AccountDoesNotExist
            | ApiErrorKind::NoFaceFound
            | ApiErrorKind::TooManyPeople => StatusCode::FORBIDDEN,
        }
    }

    pub fn body(self) -> ErrorResponse {
        let object = match self {
            ApiErrorKind::InternalError => ErrorObject::with_status(
                "Something bad happened",
                "500",
                "Contact the service maintainers",
            ),
            ApiErrorKind::InvalidMethod => ErrorObject::with_status(
                "Invalid request method",
                "405",
                "Only POST requests are allowed.",
            ),
            ApiErrorKind::BadRequest => {
                ErrorObject::with_code("Bad Request", "400", "Data is incorrectly structured")
            }
            ApiErrorKind::AccountAlreadyExists => {
                ErrorObject::with_code("Bad Request", "400", "Account already exists")
            }
            // The body code stays "400" even though these answer with 403
            ApiErrorKind::AccountDoesNotExist => {
                ErrorObject::with_code("Bad Request", "400", "Account does not exist")
            }
            ApiErrorKind::NoFaceFound => {
                ErrorObject::with_code("No face found", "400", "No face found in the image")
            }
            ApiErrorKind::TooManyPeople => ErrorObject::with_code(
                "Too many people",
                "400",
                "Too many people found in the image",
            ),
        };

        ErrorResponse {
            errors: vec![object],
        }
    }
}

impl IntoResponse for ApiErrorKind {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub errors: Vec<ErrorObject>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorObject {
    pub title: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    pub meta: &'static str,
}

impl ErrorObject {
    fn with_status(title: &'static str, status: &'static str, meta: &'static str) -> Self {
        Self {
            title,
            status: Some(status),
            code: None,
            meta,
        }
    }

    fn with_code(title: &'static str, code: &'static str, meta: &'static str) -> Self {
        Self {
            title,
            status: None,
            code: Some(code),
            meta,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();

        match kind {
            ApiErrorKind::InternalError => tracing::error!("Request failed: {}", self),
            _ => tracing::warn!("Request rejected: {}", self),
        }

        kind.into_response()
    }
}
