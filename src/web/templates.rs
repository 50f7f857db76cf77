use askama::Template;

use crate::db::Organization;
use crate::models::FieldError;
use crate::models::doctor::{DoctorProfile, ExperienceKind, ServiceIcon};
use crate::models::onboarding::OnboardingForm;

#[derive(Template)]
#[template(path = "onboarding.html")]
pub struct OnboardingTemplate {
    pub csrf_token: String,
    pub full_name: String,
    pub username: String,
    pub practice_name: String,
    pub root_domain: String,
    pub error: Option<String>,
    pub full_name_error: Option<String>,
    pub username_error: Option<String>,
    pub practice_name_error: Option<String>,
}

impl OnboardingTemplate {
    #[must_use]
    pub fn new(csrf_token: String, root_domain: &str, form: &OnboardingForm) -> Self {
        Self {
            csrf_token,
            full_name: form.full_name.clone(),
            username: form.username.clone(),
            practice_name: form.practice_name.clone().unwrap_or_default(),
            root_domain: root_domain.to_string(),
            error: None,
            full_name_error: None,
            username_error: None,
            practice_name_error: None,
        }
    }

    #[must_use]
    pub fn with_field_errors(mut self, errors: &[FieldError]) -> Self {
        let first = |field: &str| {
            errors
                .iter()
                .find(|e| e.field == field)
                .map(|e| e.message.clone())
        };
        self.full_name_error = first("full_name");
        self.username_error = first("username");
        self.practice_name_error = first("practice_name");
        self
    }

    #[must_use]
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }
}

pub struct PracticeLink {
    pub name: String,
    pub path: String,
    pub public_url: String,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub practices: Vec<PracticeLink>,
}

impl DashboardTemplate {
    /// `public_authority` is the root domain plus the port the request came in on.
    #[must_use]
    pub fn new(organizations: Vec<Organization>, scheme: &str, public_authority: &str) -> Self {
        let practices = organizations
            .into_iter()
            .map(|org| PracticeLink {
                path: format!("/org/{}", org.slug),
                public_url: format!("{scheme}://{}.{public_authority}/", org.slug),
                name: org.name,
            })
            .collect();
        Self { practices }
    }
}

pub struct ServiceCard {
    pub title: String,
    pub description: String,
    pub pricing: String,
    pub glyph: &'static str,
}

pub struct TimelineEntry {
    pub title: String,
    pub period: String,
    pub institution: String,
    pub description: String,
    pub label: &'static str,
}

pub struct AwardCard {
    pub title: String,
    pub organization: String,
    pub year: String,
    pub description: String,
    pub glyph: &'static str,
}

#[derive(Template)]
#[template(path = "tenant.html")]
pub struct TenantTemplate {
    pub profile: DoctorProfile,
    pub display_name: String,
    pub initials: String,
    pub services: Vec<ServiceCard>,
    pub experiences: Vec<TimelineEntry>,
    pub awards: Vec<AwardCard>,
    pub year: i32,
}

impl TenantTemplate {
    #[must_use]
    pub fn new(profile: DoctorProfile, year: i32) -> Self {
        let services = profile
            .services
            .iter()
            .map(|s| ServiceCard {
                title: s.title.clone(),
                description: s.description.clone(),
                pricing: s.pricing.clone(),
                glyph: ServiceIcon::from_name(&s.icon).glyph(),
            })
            .collect();

        let experiences = profile
            .experiences
            .iter()
            .map(|e| TimelineEntry {
                title: e.title.clone(),
                period: e.period.clone(),
                institution: e.institution.clone(),
                description: e.description.clone(),
                label: match e.kind {
                    ExperienceKind::Experience => "Experience",
                    ExperienceKind::Education => "Education",
                },
            })
            .collect();

        // Cards alternate between a medal and a mortarboard
        let awards = profile
            .awards
            .iter()
            .enumerate()
            .map(|(i, a)| AwardCard {
                title: a.title.clone(),
                organization: a.organization.clone(),
                year: a.year.clone(),
                description: a.description.clone(),
                glyph: if i % 2 == 0 { "\u{1F3C5}" } else { "\u{1F393}" },
            })
            .collect();

        Self {
            display_name: profile.display_name(),
            initials: profile.initials(),
            services,
            experiences,
            awards,
            year,
            profile,
        }
    }
}

#[derive(Template)]
#[template(path = "placeholder.html")]
pub struct PlaceholderTemplate {
    pub name: String,
    pub slug: String,
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub message: String,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {}
