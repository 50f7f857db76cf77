//! `SeaORM` implementation of the `OnboardingService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};
use validator::Validate;

use crate::db::{self, NewOrganization, NewUser, Organization, Store};
use crate::identity::{Identity, IdentityProvider, OrganizationRequest};
use crate::models::field_errors;
use crate::models::onboarding::OnboardingForm;
use crate::services::onboarding_service::{
    MISSING_FIELDS_MESSAGE, OnboardingError, OnboardingResult, OnboardingService,
    OnboardingStatus, RegisterOrganization, SLUG_TAKEN_MESSAGE,
};
use crate::tenant;

pub struct SeaOrmOnboardingService {
    store: Store,
    identity: Arc<dyn IdentityProvider>,
}

impl SeaOrmOnboardingService {
    #[must_use]
    pub fn new(store: Store, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    async fn ensure_slug_available(&self, slug: &str) -> Result<(), OnboardingError> {
        if self.store.slug_exists(slug).await? {
            return Err(OnboardingError::Conflict(SLUG_TAKEN_MESSAGE.to_string()));
        }
        Ok(())
    }

    /// Deletes a provider organization whose local row could not be written.
    async fn rollback_provider_organization(&self, organization_id: &str) {
        if let Err(e) = self.identity.delete_organization(organization_id).await {
            warn!(
                organization_id,
                error = %e,
                "Failed to delete provider organization after local insert failed"
            );
        }
    }
}

fn map_insert_error(err: anyhow::Error) -> OnboardingError {
    if db::is_unique_violation(&err) {
        OnboardingError::Conflict(SLUG_TAKEN_MESSAGE.to_string())
    } else {
        OnboardingError::from(err)
    }
}

#[async_trait]
impl OnboardingService for SeaOrmOnboardingService {
    async fn status(
        &self,
        identity: Option<&Identity>,
    ) -> Result<OnboardingStatus, OnboardingError> {
        let Some(identity) = identity else {
            return Ok(OnboardingStatus::anonymous());
        };

        let has_completed_onboarding = self
            .store
            .has_completed_onboarding(&identity.user_id)
            .await?;

        Ok(OnboardingStatus {
            is_authenticated: true,
            has_completed_onboarding,
            user_id: Some(identity.user_id.clone()),
        })
    }

    async fn complete(
        &self,
        user_id: &str,
        form: OnboardingForm,
    ) -> Result<OnboardingResult, OnboardingError> {
        let form = form.normalized();
        form.validate()
            .map_err(|e| OnboardingError::Validation(field_errors(&e)))?;

        let slug = form.username.clone();
        self.ensure_slug_available(&slug).await?;

        let provider_user = self.identity.get_user(user_id).await?;

        let provider_org = self
            .identity
            .create_organization(&OrganizationRequest {
                name: form.organization_name().to_string(),
                slug: slug.clone(),
                created_by: user_id.to_string(),
            })
            .await?;

        let user = NewUser {
            id: user_id.to_string(),
            email: provider_user.email.unwrap_or_default(),
            full_name: form.full_name.clone(),
            username: form.username.clone(),
        };
        let org = NewOrganization {
            id: provider_org.id.clone(),
            name: form.organization_name().to_string(),
            slug,
            created_by: user_id.to_string(),
        };

        match self.store.complete_onboarding(user, org).await {
            Ok((user, organization)) => {
                info!(
                    user_id,
                    organization_id = %organization.id,
                    slug = %organization.slug,
                    "Onboarding completed"
                );
                Ok(OnboardingResult { user, organization })
            }
            Err(e) => {
                self.rollback_provider_organization(&provider_org.id).await;
                Err(map_insert_error(e))
            }
        }
    }

    async fn register_organization(
        &self,
        user_id: &str,
        request: RegisterOrganization,
    ) -> Result<Organization, OnboardingError> {
        let id = request.id.trim();
        let name = request.name.trim();
        let slug = request.slug.trim();

        if id.is_empty() || name.is_empty() || slug.is_empty() {
            return Err(OnboardingError::InvalidInput(
                MISSING_FIELDS_MESSAGE.to_string(),
            ));
        }

        tenant::validate_slug(slug)
            .map_err(|e| OnboardingError::InvalidInput(e.message().to_string()))?;

        let organization = self
            .store
            .register_organization(NewOrganization {
                id: id.to_string(),
                name: name.to_string(),
                slug: slug.to_string(),
                created_by: user_id.to_string(),
            })
            .await
            .map_err(map_insert_error)?;

        info!(user_id, slug = %organization.slug, "Organization registered");
        Ok(organization)
    }

    async fn list_organizations(
        &self,
        user_id: &str,
    ) -> Result<Vec<Organization>, OnboardingError> {
        Ok(self.store.list_organizations_created_by(user_id).await?)
    }
}
