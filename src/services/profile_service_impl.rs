//! `SeaORM` implementation of the `ProfileService` trait.

use async_trait::async_trait;
use tracing::info;
use validator::Validate;

use crate::db::{Organization, Store};
use crate::models::doctor::DoctorProfile;
use crate::models::field_errors;
use crate::services::profile_service::{ProfileError, ProfileService, TenantPage};
use crate::tenant;

pub struct SeaOrmProfileService {
    store: Store,
}

impl SeaOrmProfileService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn organization(&self, slug: &str) -> Result<Organization, ProfileError> {
        let slug = tenant::normalize_slug(slug);
        self.store
            .get_organization_by_slug(&slug)
            .await?
            .ok_or_else(|| ProfileError::NotFound(format!("Practice '{slug}'")))
    }
}

#[async_trait]
impl ProfileService for SeaOrmProfileService {
    async fn resolve(&self, slug: &str) -> Result<TenantPage, ProfileError> {
        let organization = self.organization(slug).await?;
        let profile = self.store.get_profile(&organization.id).await?;
        Ok(TenantPage {
            organization,
            profile,
        })
    }

    async fn get_profile(&self, slug: &str) -> Result<DoctorProfile, ProfileError> {
        let organization = self.organization(slug).await?;
        self.store
            .get_profile(&organization.id)
            .await?
            .ok_or_else(|| ProfileError::NotFound(format!("Profile for '{}'", organization.slug)))
    }

    async fn save_profile(
        &self,
        user_id: &str,
        slug: &str,
        profile: DoctorProfile,
    ) -> Result<DoctorProfile, ProfileError> {
        let organization = self.organization(slug).await?;

        if organization.created_by != user_id {
            return Err(ProfileError::Forbidden);
        }

        profile
            .validate()
            .map_err(|e| ProfileError::Validation(field_errors(&e)))?;

        self.store.upsert_profile(&organization.id, &profile).await?;

        info!(user_id, slug = %organization.slug, "Doctor profile saved");
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewOrganization;
    use crate::models::doctor::tests::sample_profile;

    async fn service_with_practice() -> SeaOrmProfileService {
        let store = Store::new("sqlite::memory:").await.unwrap();
        store
            .register_organization(NewOrganization {
                id: "org_1".to_string(),
                name: "Johnson Cardiology".to_string(),
                slug: "dr-johnson".to_string(),
                created_by: "user_1".to_string(),
            })
            .await
            .unwrap();
        SeaOrmProfileService::new(store)
    }

    #[tokio::test]
    async fn test_resolve_without_profile() {
        let service = service_with_practice().await;

        let page = service.resolve("Dr-Johnson").await.unwrap();
        assert_eq!(page.organization.id, "org_1");
        assert!(page.profile.is_none());

        assert!(matches!(
            service.resolve("nobody").await,
            Err(ProfileError::NotFound(_))
        ));
        assert!(matches!(
            service.get_profile("dr-johnson").await,
            Err(ProfileError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_only_creator_can_save() {
        let service = service_with_practice().await;

        let err = service
            .save_profile("user_2", "dr-johnson", sample_profile())
            .await
            .unwrap_err();
        assert!(matches!(err, ProfileError::Forbidden));

        service
            .save_profile("user_1", "dr-johnson", sample_profile())
            .await
            .unwrap();

        let page = service.resolve("dr-johnson").await.unwrap();
        assert_eq!(page.profile, Some(sample_profile()));
    }

    #[tokio::test]
    async fn test_invalid_profile_is_not_saved() {
        let service = service_with_practice().await;

        let mut profile = sample_profile();
        profile.email = "not-an-email".to_string();

        let err = service
            .save_profile("user_1", "dr-johnson", profile)
            .await
            .unwrap_err();

        let ProfileError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors[0].field, "email");
        assert_eq!(errors[0].message, "Please enter a valid email address");
        assert!(service.get_profile("dr-johnson").await.is_err());
    }
}
