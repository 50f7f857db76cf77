use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::IdentityConfig;
use crate::identity::{
    Identity, IdentityError, IdentityProvider, OrganizationRequest, ProviderOrganization,
    ProviderUser,
};

/// Allowed clock skew when checking `exp`/`nbf`, in seconds.
const CLOCK_SKEW_SECS: u64 = 5;

#[derive(Debug, Deserialize)]
struct SessionClaims {
    sub: String,
    #[serde(default)]
    sid: Option<String>,
    #[serde(default)]
    azp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmailAddress {
    id: String,
    email_address: String,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    primary_email_address_id: Option<String>,
    #[serde(default)]
    email_addresses: Vec<EmailAddress>,
}

impl From<UserResponse> for ProviderUser {
    fn from(user: UserResponse) -> Self {
        let primary = user.primary_email_address_id.as_deref();
        let email = user
            .email_addresses
            .iter()
            .find(|e| Some(e.id.as_str()) == primary)
            .or_else(|| user.email_addresses.first())
            .map(|e| e.email_address.clone());

        Self {
            id: user.id,
            email,
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    long_message: Option<String>,
}

/// Backend API client for a Clerk-compatible identity provider.
#[derive(Clone)]
pub struct ClerkClient {
    client: Client,
    api_url: String,
    secret_key: String,
    decoding_key: Option<DecodingKey>,
    authorized_parties: Vec<String>,
}

impl ClerkClient {
    /// # Errors
    ///
    /// Returns [`IdentityError::Config`] when the configured session key is not
    /// a valid RSA public key.
    pub fn new(config: &IdentityConfig, client: Client) -> Result<Self, IdentityError> {
        let decoding_key = if config.jwt_public_key.trim().is_empty() {
            warn!("No session verification key configured; every request will be anonymous");
            None
        } else {
            let pem = normalize_pem(&config.jwt_public_key);
            Some(
                DecodingKey::from_rsa_pem(pem.as_bytes())
                    .map_err(|e| IdentityError::Config(format!("Invalid jwt_public_key: {e}")))?,
            )
        };

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
            decoding_key,
            authorized_parties: config.authorized_parties.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    fn verify_token(&self, token: &str) -> Result<Identity, IdentityError> {
        let key = self
            .decoding_key
            .as_ref()
            .ok_or_else(|| IdentityError::Config("No session verification key".to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = CLOCK_SKEW_SECS;
        validation.validate_nbf = true;
        validation.validate_aud = false;

        let claims = decode::<SessionClaims>(token, key, &validation)
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?
            .claims;

        if !self.authorized_parties.is_empty() {
            let azp = claims.azp.as_deref().unwrap_or_default();
            if !self.authorized_parties.iter().any(|p| p == azp) {
                return Err(IdentityError::InvalidToken(format!(
                    "Unauthorized party: {azp}"
                )));
            }
        }

        Ok(Identity {
            user_id: claims.sub,
            session_id: claims.sid,
        })
    }

    async fn into_error(response: reqwest::Response, resource: &str) -> IdentityError {
        let status = response.status();
        let body = response.json::<ErrorBody>().await.ok();
        let first = body.as_ref().and_then(|b| b.errors.first());

        let message = first
            .map(|e| e.long_message.clone().unwrap_or_else(|| e.message.clone()))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| status.to_string());
        let code = first.map(|e| e.code.as_str()).unwrap_or_default();

        match status {
            StatusCode::NOT_FOUND => IdentityError::NotFound(resource.to_string()),
            StatusCode::CONFLICT => IdentityError::Conflict(message),
            StatusCode::UNPROCESSABLE_ENTITY if code.ends_with("_exists") => {
                IdentityError::Conflict(message)
            }
            _ => IdentityError::Rejected {
                status: status.as_u16(),
                message,
            },
        }
    }
}

#[async_trait]
impl IdentityProvider for ClerkClient {
    async fn authenticate(&self, token: &str) -> Result<Identity, IdentityError> {
        self.verify_token(token)
    }

    async fn get_user(&self, user_id: &str) -> Result<ProviderUser, IdentityError> {
        debug!("Fetching provider user {}", user_id);

        let response = self
            .client
            .get(self.url(&format!("users/{user_id}")))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::into_error(response, &format!("User {user_id}")).await);
        }

        let user: UserResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("Malformed user response: {e}")))?;

        Ok(user.into())
    }

    async fn create_organization(
        &self,
        request: &OrganizationRequest,
    ) -> Result<ProviderOrganization, IdentityError> {
        debug!("Creating provider organization '{}'", request.slug);

        let response = self
            .client
            .post(self.url("organizations"))
            .bearer_auth(&self.secret_key)
            .json(request)
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::into_error(response, &format!("Organization {}", request.slug)).await);
        }

        response.json().await.map_err(|e| {
            IdentityError::Unavailable(format!("Malformed organization response: {e}"))
        })
    }

    async fn delete_organization(&self, organization_id: &str) -> Result<(), IdentityError> {
        let response = self
            .client
            .delete(self.url(&format!("organizations/{organization_id}")))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(
                Self::into_error(response, &format!("Organization {organization_id}")).await,
            );
        }

        Ok(())
    }
}

/// Keys pasted into env files often carry literal `\n` sequences.
fn normalize_pem(raw: &str) -> String {
    raw.trim().replace("\\n", "\n")
}
