use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{error, warn};

pub type Details = BTreeMap<String, String>;

/// Business-rule failures raised by the service layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("bad request: {details:?}")]
    BadRequest { details: Details },
    #[error("age is below the minimum")]
    InvalidAge,
    #[error("user not found")]
    NotFound,
}

impl ServiceError {
    pub fn bad_request(details: Details) -> Self {
        Self::BadRequest { details }
    }

    /// Single-parameter shorthand.
    pub fn bad_param(name: &str, message: impl Into<String>) -> Self {
        Self::bad_request(Details::from([(name.to_string(), message.into())]))
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "Bad request, missing or invalid request arguments",
            Self::InvalidAge => "Age is below the minimum",
            Self::NotFound => "User not found",
        }
    }

    pub fn details(&self) -> Option<&Details> {
        match self {
            Self::BadRequest { details } => Some(details),
            _ => None,
        }
    }
}

/// Error body returned to HTTP clients.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub status: u16,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Details>,
    pub path: String,
}

/// A [`ServiceError`] bound to the request path it occurred on.
#[derive(Debug)]
pub struct ApiError {
    pub error: ServiceError,
    pub path: String,
}

impl ApiError {
    pub fn new(error: ServiceError, path: impl Into<String>) -> Self {
        Self {
            error,
            path: path.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.error {
            ServiceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ServiceError::InvalidAge => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.error, path = %self.path, "request failed");
        } else {
            warn!(error = %self.error, path = %self.path, %status, "request rejected");
        }
        let body = ErrorResponse {
            timestamp: OffsetDateTime::now_utc(),
            status: status.as_u16(),
            reason: self.error.reason().to_string(),
            details: self.error.details().cloned(),
            path: self.path,
        };
        (status, Json(body)).into_response()
    }
}
