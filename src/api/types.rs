use serde::Serialize;

use crate::db::{Organization, User};
use crate::models::FieldError;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            errors: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            errors: None,
        }
    }

    pub fn field_errors(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self {
            errors: Some(errors),
            ..Self::error(message)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrganizationDto {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub created_by: String,
    pub created_at: String,
    /// Path form of the public page, usable on any host
    pub public_path: String,
}

impl From<Organization> for OrganizationDto {
    fn from(org: Organization) -> Self {
        Self {
            public_path: format!("/org/{}", org.slug),
            id: org.id,
            name: org.name,
            slug: org.slug,
            created_by: org.created_by,
            created_at: org.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrganizationCreated {
    pub message: String,
    pub organization: OrganizationDto,
}

#[derive(Debug, Serialize)]
pub struct OnboardingCompleted {
    pub user: User,
    pub organization: OrganizationDto,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub version: &'static str,
    pub uptime_seconds: u64,
}
