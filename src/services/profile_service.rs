//! Domain service for practice pages and their doctor profiles.

use serde::Serialize;
use thiserror::Error;

use crate::db::Organization;
use crate::models::FieldError;
use crate::models::doctor::DoctorProfile;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Only the practice owner can edit this profile")]
    Forbidden,

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for ProfileError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

/// Everything needed to render a practice's public page.
#[derive(Debug, Clone, Serialize)]
pub struct TenantPage {
    pub organization: Organization,
    pub profile: Option<DoctorProfile>,
}

#[async_trait::async_trait]
pub trait ProfileService: Send + Sync {
    /// Looks up the practice behind a slug together with its saved profile.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::NotFound`] when no organization owns the slug.
    async fn resolve(&self, slug: &str) -> Result<TenantPage, ProfileError>;

    async fn get_profile(&self, slug: &str) -> Result<DoctorProfile, ProfileError>;

    /// Validates and stores a profile on behalf of `user_id`.
    ///
    /// # Errors
    ///
    /// - [`ProfileError::Forbidden`] when `user_id` did not create the practice.
    /// - [`ProfileError::Validation`] when a field rule fails.
    async fn save_profile(
        &self,
        user_id: &str,
        slug: &str,
        profile: DoctorProfile,
    ) -> Result<DoctorProfile, ProfileError>;
}
