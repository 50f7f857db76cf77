//! Doctor portfolio content rendered on a practice's public page.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct DoctorProfile {
    #[validate(length(min = 2, message = "First name must be at least 2 characters"))]
    pub first_name: String,

    #[validate(length(min = 2, message = "Last name must be at least 2 characters"))]
    pub last_name: String,

    #[validate(length(min = 2, message = "Specialty is required"))]
    pub specialty: String,

    #[validate(length(min = 10, message = "Description must be at least 10 characters"))]
    pub description: String,

    /// Empty means "render initials instead".
    #[serde(default)]
    #[validate(custom(function = "validate_optional_url"))]
    pub avatar_url: String,

    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,

    #[validate(length(min = 10, message = "Please enter a valid phone number"))]
    pub phone: String,

    #[validate(url(message = "Please enter a valid website URL"))]
    pub website: String,

    #[validate(length(min = 1, message = "About title is required"))]
    pub about_title: String,

    #[validate(length(min = 10, message = "About description is required"))]
    pub about_description_1: String,

    #[validate(length(min = 10, message = "About description is required"))]
    pub about_description_2: String,

    #[validate(length(min = 1, message = "At least one service is required"), nested)]
    pub services: Vec<Service>,

    #[validate(
        length(min = 1, message = "At least one experience/education entry is required"),
        nested
    )]
    pub experiences: Vec<Experience>,

    #[validate(length(min = 1, message = "At least one award is required"), nested)]
    pub awards: Vec<Award>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Service {
    #[validate(length(min = 1, message = "Service title is required"))]
    pub title: String,

    #[validate(length(min = 10, message = "Service description is required"))]
    pub description: String,

    #[validate(length(min = 1, message = "Pricing information is required"))]
    pub pricing: String,

    #[validate(custom(function = "validate_icon"))]
    pub icon: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceKind {
    Experience,
    Education,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Experience {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Period is required"))]
    pub period: String,

    #[validate(length(min = 1, message = "Institution is required"))]
    pub institution: String,

    #[validate(length(min = 10, message = "Description is required"))]
    pub description: String,

    #[serde(rename = "type")]
    pub kind: ExperienceKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Award {
    #[validate(length(min = 1, message = "Award title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Organization is required"))]
    pub organization: String,

    #[validate(length(min = 4, message = "Year is required"))]
    pub year: String,

    #[validate(length(min = 10, message = "Description is required"))]
    pub description: String,
}

/// Icons a service card can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceIcon {
    #[default]
    Heart,
    Activity,
    Stethoscope,
    Brain,
}

impl ServiceIcon {
    pub const ALL: [Self; 4] = [Self::Heart, Self::Activity, Self::Stethoscope, Self::Brain];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Heart => "Heart",
            Self::Activity => "Activity",
            Self::Stethoscope => "Stethoscope",
            Self::Brain => "Brain",
        }
    }

    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|icon| icon.name() == name)
    }

    /// Unknown names fall back to the heart icon.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self::parse(name).unwrap_or_default()
    }

    /// Inline glyph used by the page template.
    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Heart => "\u{2665}",
            Self::Activity => "\u{2307}",
            Self::Stethoscope => "\u{2695}",
            Self::Brain => "\u{2726}",
        }
    }
}

impl DoctorProfile {
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("Dr. {} {}", self.first_name, self.last_name)
    }

    /// Two-letter fallback shown when no avatar is set.
    #[must_use]
    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .take(1)
            .chain(self.last_name.chars().take(1))
            .flat_map(char::to_uppercase)
            .collect()
    }
}

fn validate_optional_url(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || url::Url::parse(value).is_ok() {
        return Ok(());
    }
    Err(ValidationError::new("url").with_message(Cow::Borrowed("Please enter a valid URL")))
}

fn validate_icon(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(
            ValidationError::new("icon").with_message(Cow::Borrowed("Please select an icon"))
        );
    }
    if ServiceIcon::parse(value).is_none() {
        return Err(ValidationError::new("icon")
            .with_message(Cow::Borrowed("Icon must be Heart, Activity, Stethoscope, or Brain")));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::field_errors;

    pub(crate) fn sample_profile() -> DoctorProfile {
        DoctorProfile {
            first_name: "Sarah".to_string(),
            last_name: "Johnson".to_string(),
            specialty: "Cardiologist & Internal Medicine Specialist".to_string(),
            description: "Dedicated to providing exceptional cardiac care.".to_string(),
            avatar_url: String::new(),
            email: "sarah.johnson@medicenter.com".to_string(),
            phone: "(555) 123-4567".to_string(),
            website: "https://www.drjohnsoncardiology.com".to_string(),
            about_title: "About Dr. Johnson".to_string(),
            about_description_1: "Board-certified cardiologist.".to_string(),
            about_description_2: "Combines technology with compassionate care.".to_string(),
            services: vec![Service {
                title: "Preventive Cardiology".to_string(),
                description: "Comprehensive heart health assessments.".to_string(),
                pricing: "Starting at $200".to_string(),
                icon: "Heart".to_string(),
            }],
            experiences: vec![Experience {
                title: "Senior Cardiologist".to_string(),
                period: "2018 - Present".to_string(),
                institution: "Metropolitan Heart Institute".to_string(),
                description: "Leading a team of cardiac specialists.".to_string(),
                kind: ExperienceKind::Experience,
            }],
            awards: vec![Award {
                title: "Top Doctor Award".to_string(),
                organization: "American Heart Association".to_string(),
                year: "2023".to_string(),
                description: "Outstanding contributions to preventive cardiology.".to_string(),
            }],
        }
    }

    #[test]
    fn test_sample_profile_is_valid() {
        assert!(sample_profile().validate().is_ok());
    }

    #[test]
    fn test_nested_errors_are_addressed_by_path() {
        let mut profile = sample_profile();
        profile.services[0].icon = String::new();
        profile.awards[0].year = "23".to_string();

        let errors = field_errors(&profile.validate().unwrap_err());
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["awards[0].year", "services[0].icon"]);
        assert_eq!(errors[1].message, "Please select an icon");
    }

    #[test]
    fn test_empty_collections_are_rejected() {
        let mut profile = sample_profile();
        profile.services.clear();

        let errors = field_errors(&profile.validate().unwrap_err());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "At least one service is required");
    }

    #[test]
    fn test_avatar_url_may_be_empty_but_not_garbage() {
        let mut profile = sample_profile();
        profile.avatar_url = "https://cdn.example.com/sarah.png".to_string();
        assert!(profile.validate().is_ok());

        profile.avatar_url = "not a url".to_string();
        let errors = field_errors(&profile.validate().unwrap_err());
        assert_eq!(errors[0].field, "avatar_url");
    }

    #[test]
    fn test_website_requires_scheme() {
        let mut profile = sample_profile();
        profile.website = "www.drjohnsoncardiology.com".to_string();

        let errors = field_errors(&profile.validate().unwrap_err());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "website");
        assert_eq!(errors[0].message, "Please enter a valid website URL");
    }

    #[test]
    fn test_icon_fallback_and_initials() {
        assert_eq!(ServiceIcon::from_name("Brain"), ServiceIcon::Brain);
        assert_eq!(ServiceIcon::from_name("Kidney"), ServiceIcon::Heart);
        assert_eq!(sample_profile().initials(), "SJ");
        assert_eq!(sample_profile().display_name(), "Dr. Sarah Johnson");
    }

    #[test]
    fn test_experience_kind_serializes_as_type() {
        let json = serde_json::to_value(&sample_profile().experiences[0]).unwrap();
        assert_eq!(json["type"], "experience");
    }
}
