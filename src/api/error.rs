use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::models::{FieldError, summarize};
use crate::services::{OnboardingError, ProfileError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ExternalApiError { service: String, message: String },

    ValidationError(String),

    InvalidFields(Vec<FieldError>),

    Conflict(String),

    InternalError(String),

    Unauthorized(String),

    Forbidden(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::ExternalApiError { service, message } => {
                write!(f, "{} error: {}", service, message)
            }
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::InvalidFields(errors) => {
                write!(f, "Validation error: {}", summarize(errors))
            }
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            ApiError::ExternalApiError { service, message } => {
                tracing::warn!("{} API error: {}", service, message);
                (
                    StatusCode::BAD_GATEWAY,
                    format!("{} service is unavailable", service),
                )
            }
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InvalidFields(errors) => {
                let body = ApiResponse::<()>::field_errors(summarize(&errors), errors);
                return (StatusCode::BAD_REQUEST, Json(body)).into_response();
            }
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(format!("{err:#}"))
    }
}

impl From<OnboardingError> for ApiError {
    fn from(err: OnboardingError) -> Self {
        match err {
            OnboardingError::Validation(errors) => Self::InvalidFields(errors),
            OnboardingError::InvalidInput(msg) => Self::ValidationError(msg),
            OnboardingError::Conflict(msg) => Self::Conflict(msg),
            OnboardingError::NotFound(msg) => Self::NotFound(msg),
            OnboardingError::IdentityProvider(message) => Self::identity_provider(message),
            OnboardingError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::NotFound(_) => Self::NotFound(err.to_string()),
            ProfileError::Forbidden => Self::Forbidden(err.to_string()),
            ProfileError::Validation(errors) => Self::InvalidFields(errors),
            ProfileError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl ApiError {
    pub fn unauthorized() -> Self {
        ApiError::Unauthorized("Unauthorized".to_string())
    }

    pub fn identity_provider(msg: impl Into<String>) -> Self {
        ApiError::ExternalApiError {
            service: "Identity provider".to_string(),
            message: msg.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }
}
