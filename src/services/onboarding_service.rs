//! Domain service for onboarding and organization registration.
//!
//! Owns the rules that turn a signed-in provider user into a practice owner:
//! form validation, slug availability, provider-side organization creation and
//! the local user/organization rows.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{Organization, User};
use crate::identity::{Identity, IdentityError};
use crate::models::FieldError;
use crate::models::onboarding::OnboardingForm;

pub const SLUG_TAKEN_MESSAGE: &str = "Organization with this slug already exists";
pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields: id, name, slug";

#[derive(Debug, Error)]
pub enum OnboardingError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Identity provider error: {0}")]
    IdentityProvider(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for OnboardingError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

impl From<IdentityError> for OnboardingError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Conflict(_) => Self::Conflict(SLUG_TAKEN_MESSAGE.to_string()),
            IdentityError::NotFound(what) => Self::NotFound(what),
            other => Self::IdentityProvider(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnboardingStatus {
    pub is_authenticated: bool,
    pub has_completed_onboarding: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl OnboardingStatus {
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            is_authenticated: false,
            has_completed_onboarding: false,
            user_id: None,
        }
    }
}

/// Where a page request has to go before it may be served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnboardingGate {
    SignIn,
    Onboarding,
    Allowed,
}

impl From<&OnboardingStatus> for OnboardingGate {
    fn from(status: &OnboardingStatus) -> Self {
        if !status.is_authenticated {
            Self::SignIn
        } else if !status.has_completed_onboarding {
            Self::Onboarding
        } else {
            Self::Allowed
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OnboardingResult {
    pub user: User,
    pub organization: Organization,
}

/// An organization the provider already created, reported back by a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterOrganization {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

#[async_trait::async_trait]
pub trait OnboardingService: Send + Sync {
    /// Reports whether the caller is signed in and owns a practice.
    async fn status(&self, identity: Option<&Identity>)
    -> Result<OnboardingStatus, OnboardingError>;

    /// Runs the full onboarding flow for a signed-in user.
    ///
    /// # Errors
    ///
    /// - [`OnboardingError::Validation`] when the form breaks a field rule.
    /// - [`OnboardingError::Conflict`] when the slug is taken locally or at the provider.
    async fn complete(
        &self,
        user_id: &str,
        form: OnboardingForm,
    ) -> Result<OnboardingResult, OnboardingError>;

    /// Stores an organization the provider already created.
    ///
    /// # Errors
    ///
    /// - [`OnboardingError::InvalidInput`] when a field is missing or the slug is malformed.
    /// - [`OnboardingError::Conflict`] when the slug is taken.
    async fn register_organization(
        &self,
        user_id: &str,
        request: RegisterOrganization,
    ) -> Result<Organization, OnboardingError>;

    async fn list_organizations(&self, user_id: &str)
    -> Result<Vec<Organization>, OnboardingError>;
}
