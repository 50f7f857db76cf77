pub mod onboarding_service;
pub mod onboarding_service_impl;
pub use onboarding_service::{
    OnboardingError, OnboardingGate, OnboardingResult, OnboardingService, OnboardingStatus,
    RegisterOrganization,
};
pub use onboarding_service_impl::SeaOrmOnboardingService;

pub mod profile_service;
pub mod profile_service_impl;
pub use profile_service::{ProfileError, ProfileService, TenantPage};
pub use profile_service_impl::SeaOrmProfileService;
