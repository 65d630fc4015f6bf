use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// One violated form rule: which field, which rule, and the message shown
/// to the user. Violations keep the order the rules were declared in.
#[derive(Debug, Clone, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub rule: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(Vec<FieldViolation>),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("authentication required")]
    AuthRequired,

    #[error("unauthorized")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::AuthRequired => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::AuthRequired => "AUTH_REQUIRED",
            ApiError::Forbidden => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn public_message(&self) -> String {
        match self {
            // Lead with the first violation; the full list rides in details.
            ApiError::Validation(violations) => violations
                .first()
                .map(|v| v.message.clone())
                .unwrap_or_else(|| "Validation failed".to_string()),
            ApiError::InvalidCredentials => "Invalid username or password".to_string(),
            ApiError::AuthRequired => "Please log in to access this page.".to_string(),
            ApiError::Forbidden => "Unauthorized".to_string(),
            ApiError::NotFound(what) => format!("{what} not found"),
            ApiError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<FieldViolation>>,
}

#[derive(Serialize)]
struct ErrorEnvelope {
    success: bool,
    error: ErrorBody,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(err) = &self {
            error!(error = ?err, "Request failed");
        }

        let details = match &self {
            ApiError::Validation(violations) => Some(violations.clone()),
            _ => None,
        };

        let body = ErrorEnvelope {
            success: false,
            error: ErrorBody {
                code: self.code(),
                message: self.public_message(),
                details,
            },
        };

        (self.status_code(), Json(body)).into_response()
    }
}
