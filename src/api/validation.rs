use super::ApiError;
use crate::tenant;

/// Normalizes a `{slug}` path segment and rejects ones no practice could own.
pub fn validate_slug_param(raw: &str) -> Result<String, ApiError> {
    let slug = tenant::normalize_slug(raw);

    if slug.is_empty() {
        return Err(ApiError::validation("Slug cannot be empty"));
    }

    if slug.len() > tenant::SLUG_MAX_LEN || !tenant::is_valid_slug_format(&slug) {
        return Err(ApiError::validation(format!(
            "Invalid slug: '{}'. Slugs contain only lowercase letters, numbers, and hyphens",
            raw.trim()
        )));
    }

    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_slug_param() {
        assert_eq!(validate_slug_param("dr-smith").unwrap(), "dr-smith");
        assert_eq!(validate_slug_param(" Dr-Smith ").unwrap(), "dr-smith");
        assert!(validate_slug_param("").is_err());
        assert!(validate_slug_param("dr smith").is_err());
        assert!(validate_slug_param("dr_smith").is_err());
        assert!(validate_slug_param(&"a".repeat(31)).is_err());
    }
}
