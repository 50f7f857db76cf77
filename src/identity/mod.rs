//! Identity provider seam.
//!
//! Sign-in, sessions and organizations live in an external provider. The app
//! only verifies session tokens and asks the provider to create organizations;
//! everything else goes through [`IdentityProvider`].

use async_trait::async_trait;
use axum::http::{HeaderMap, header};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_sessions::cookie::Cookie;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Identity provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),

    #[error("Identity provider misconfigured: {0}")]
    Config(String),
}

/// The signed-in principal behind a verified session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub user_id: String,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderUser {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl ProviderUser {
    #[must_use]
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganizationRequest {
    pub name: String,
    pub slug: String,
    pub created_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderOrganization {
    pub id: String,
    pub name: String,
    pub slug: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verifies a session token and returns who it belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidToken`] for expired, forged or
    /// malformed tokens.
    async fn authenticate(&self, token: &str) -> Result<Identity, IdentityError>;

    async fn get_user(&self, user_id: &str) -> Result<ProviderUser, IdentityError>;

    /// Creates an organization owned by `created_by`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Conflict`] when the slug is already taken at
    /// the provider.
    async fn create_organization(
        &self,
        request: &OrganizationRequest,
    ) -> Result<ProviderOrganization, IdentityError>;

    async fn delete_organization(&self, organization_id: &str) -> Result<(), IdentityError>;
}

/// Pulls the session token from `Authorization: Bearer` or, failing that,
/// from the provider's session cookie.
#[must_use]
pub fn extract_session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        let token = token.trim();
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == cookie_name && !cookie.value().is_empty())
        .map(|cookie| cookie.value().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(header::COOKIE, HeaderValue::from_static("__session=def"));

        assert_eq!(
            extract_session_token(&headers, "__session"),
            Some("abc".to_string())
        );
    }

    #[test]
    fn test_session_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; __session=def; other=1"),
        );

        assert_eq!(
            extract_session_token(&headers, "__session"),
            Some("def".to_string())
        );
        assert_eq!(extract_session_token(&headers, "missing"), None);
    }

    #[test]
    fn test_no_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert_eq!(extract_session_token(&headers, "__session"), None);
    }

    #[test]
    fn test_full_name() {
        let user = ProviderUser {
            id: "user_1".to_string(),
            email: None,
            first_name: Some("Sarah".to_string()),
            last_name: Some(" ".to_string()),
            username: None,
        };
        assert_eq!(user.full_name(), Some("Sarah".to_string()));
    }
}
