use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use crate::tenant;

/// Data a signed-in user submits to create their practice.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct OnboardingForm {
    #[validate(length(min = 2, message = "Full name must be at least 2 characters"))]
    pub full_name: String,

    /// Becomes the organization slug and therefore the practice subdomain.
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    #[serde(default)]
    #[validate(length(max = 100, message = "Practice name must be at most 100 characters"))]
    pub practice_name: Option<String>,
}

impl OnboardingForm {
    /// Trims every field and drops a blank practice name.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            full_name: self.full_name.trim().to_string(),
            username: self.username.trim().to_string(),
            practice_name: self
                .practice_name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
        }
    }

    /// Display name of the organization created for this submission.
    #[must_use]
    pub fn organization_name(&self) -> &str {
        self.practice_name.as_deref().unwrap_or(&self.full_name)
    }
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    tenant::validate_slug(username).map_err(|err| {
        ValidationError::new("username").with_message(Cow::Borrowed(err.message()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::field_errors;

    fn form(full_name: &str, username: &str) -> OnboardingForm {
        OnboardingForm {
            full_name: full_name.to_string(),
            username: username.to_string(),
            practice_name: None,
        }
    }

    #[test]
    fn test_valid_form() {
        assert!(form("Sarah Johnson", "dr-johnson").validate().is_ok());
    }

    #[test]
    fn test_username_rules() {
        let cases = [
            ("ab", "Username must be at least 3 characters"),
            (
                "this-username-is-way-too-long-to-use",
                "Username must be less than 30 characters",
            ),
            (
                "Dr_Johnson",
                "Username can only contain lowercase letters, numbers, and hyphens",
            ),
            ("dashboard", "This username is reserved"),
        ];

        for (username, expected) in cases {
            let errors = form("Sarah Johnson", username).validate().unwrap_err();
            let errors = field_errors(&errors);
            assert_eq!(errors.len(), 1, "username {username}");
            assert_eq!(errors[0].field, "username");
            assert_eq!(errors[0].message, expected);
        }
    }

    #[test]
    fn test_full_name_too_short() {
        let errors = form("S", "dr-johnson").validate().unwrap_err();
        let errors = field_errors(&errors);
        assert_eq!(errors[0].field, "full_name");
        assert_eq!(errors[0].message, "Full name must be at least 2 characters");
    }

    #[test]
    fn test_normalized_trims_and_defaults_practice_name() {
        let normalized = OnboardingForm {
            full_name: "  Sarah Johnson ".to_string(),
            username: " dr-johnson ".to_string(),
            practice_name: Some("   ".to_string()),
        }
        .normalized();

        assert_eq!(normalized.full_name, "Sarah Johnson");
        assert_eq!(normalized.username, "dr-johnson");
        assert_eq!(normalized.practice_name, None);
        assert_eq!(normalized.organization_name(), "Sarah Johnson");
    }
}
