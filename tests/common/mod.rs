#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode},
};
use http_body_util::BodyExt;
use medfolio::config::Config;
use medfolio::identity::{
    Identity, IdentityError, IdentityProvider, OrganizationRequest, ProviderOrganization,
    ProviderUser,
};
use medfolio::state::SharedState;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const ROOT_DOMAIN: &str = "medfolio.test";
pub const SIGN_IN_URL: &str = "https://accounts.medfolio.test/sign-in";

/// Accepts `token-<user_id>` as a session token and hands out
/// `org_<slug>` organization ids.
#[derive(Default)]
pub struct FakeIdentity {
    pub deleted: Mutex<Vec<String>>,
    pub taken_slugs: Mutex<Vec<String>>,
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn authenticate(&self, token: &str) -> Result<Identity, IdentityError> {
        token
            .strip_prefix("token-")
            .map(|user_id| Identity {
                user_id: user_id.to_string(),
                session_id: Some("sess_test".to_string()),
            })
            .ok_or_else(|| IdentityError::InvalidToken("unknown token".to_string()))
    }

    async fn get_user(&self, user_id: &str) -> Result<ProviderUser, IdentityError> {
        Ok(ProviderUser {
            id: user_id.to_string(),
            email: Some(format!("{user_id}@example.com")),
            first_name: Some("Sarah".to_string()),
            last_name: Some("Johnson".to_string()),
            username: None,
        })
    }

    async fn create_organization(
        &self,
        request: &OrganizationRequest,
    ) -> Result<ProviderOrganization, IdentityError> {
        if self.taken_slugs.lock().unwrap().contains(&request.slug) {
            return Err(IdentityError::Conflict("That slug is taken".to_string()));
        }
        Ok(ProviderOrganization {
            id: format!("org_{}", request.slug),
            name: request.name.clone(),
            slug: request.slug.clone(),
        })
    }

    async fn delete_organization(&self, organization_id: &str) -> Result<(), IdentityError> {
        self.deleted
            .lock()
            .unwrap()
            .push(organization_id.to_string());
        Ok(())
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_url = "sqlite::memory:".to_string();
    config.server.root_domain = ROOT_DOMAIN.to_string();
    config.server.secure_cookies = false;
    config.identity.sign_in_url = SIGN_IN_URL.to_string();
    config.observability.metrics_enabled = false;
    config
}

pub async fn spawn_app_with(identity: Arc<FakeIdentity>) -> Router {
    let shared = SharedState::with_identity(test_config(), identity)
        .await
        .expect("failed to create shared state");
    let state = medfolio::api::create_app_state(Arc::new(shared), None);
    medfolio::api::router(state)
}

pub async fn spawn_app() -> Router {
    spawn_app_with(Arc::new(FakeIdentity::default())).await
}

pub fn bearer(user_id: &str) -> String {
    format!("Bearer token-{user_id}")
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("response body is not JSON")
    }

    pub fn location(&self) -> Option<&str> {
        self.headers
            .get("location")
            .and_then(|v| v.to_str().ok())
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    TestResponse {
        status,
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

pub fn get(uri: &str, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(user) = user {
        builder = builder.header("authorization", bearer(user));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: &serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(user) = user {
        builder = builder.header("authorization", bearer(user));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Runs JSON onboarding for `user_id` with `username` as the slug.
pub async fn onboard(app: &Router, user_id: &str, username: &str) -> TestResponse {
    send(
        app,
        json_request(
            "POST",
            "/api/onboarding",
            Some(user_id),
            &serde_json::json!({
                "full_name": "Sarah Johnson",
                "username": username,
                "practice_name": "Johnson Cardiology"
            }),
        ),
    )
    .await
}

pub fn sample_profile() -> serde_json::Value {
    serde_json::json!({
        "first_name": "Sarah",
        "last_name": "Johnson",
        "specialty": "Cardiologist & Internal Medicine Specialist",
        "description": "Dedicated to providing exceptional cardiac care.",
        "avatar_url": "",
        "email": "sarah.johnson@medicenter.com",
        "phone": "(555) 123-4567",
        "website": "https://www.drjohnsoncardiology.com",
        "about_title": "About Dr. Johnson",
        "about_description_1": "Board-certified cardiologist with extensive experience.",
        "about_description_2": "Combines technology with compassionate patient care.",
        "services": [{
            "title": "Preventive Cardiology",
            "description": "Comprehensive heart health assessments.",
            "pricing": "Starting at $200",
            "icon": "Heart"
        }],
        "experiences": [{
            "title": "Doctor of Medicine (M.D.)",
            "period": "2008 - 2012",
            "institution": "Harvard Medical School",
            "description": "Graduated Magna Cum Laude with research honors.",
            "type": "education"
        }],
        "awards": [{
            "title": "Top Doctor Award",
            "organization": "American Heart Association",
            "year": "2023",
            "description": "Outstanding contributions to preventive cardiology."
        }]
    })
}
