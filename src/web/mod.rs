//! Server-rendered pages: onboarding, dashboard and the public practice pages.

mod csrf;
mod templates;

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, Uri, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use chrono::Datelike;
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer, cookie::SameSite};
use tracing::{debug, error};

use crate::api::AppState;
use crate::api::auth::CurrentUser;
use crate::models::onboarding::OnboardingForm;
use crate::services::{OnboardingError, OnboardingGate, OnboardingStatus, ProfileError};
use crate::tenant;
use templates::{
    DashboardTemplate, ErrorTemplate, NotFoundTemplate, OnboardingTemplate, PlaceholderTemplate,
    TenantTemplate,
};

const FORM_SESSION_COOKIE: &str = "medfolio_form";

pub fn router(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let server = &state.config().server;

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_name(FORM_SESSION_COOKIE)
        .with_secure(server.secure_cookies)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            server.session_inactivity_minutes,
        )));

    Router::new()
        .route("/", get(home))
        .route("/onboarding", get(onboarding_page).post(submit_onboarding))
        .route("/dashboard", get(dashboard))
        .route("/org/{slug}", get(practice_by_path))
        .route("/s/{subdomain}", get(practice_by_path))
        .layer(session_layer)
}

#[derive(Debug)]
pub enum PageError {
    NotFound(String),
    Internal(String),
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::NotFound(message) => {
                render(StatusCode::NOT_FOUND, &NotFoundTemplate { message })
            }
            PageError::Internal(msg) => {
                error!("Page error: {}", msg);
                render(StatusCode::INTERNAL_SERVER_ERROR, &ErrorTemplate {})
            }
        }
    }
}

impl From<OnboardingError> for PageError {
    fn from(err: OnboardingError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<ProfileError> for PageError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::NotFound(_) => Self::NotFound("This practice does not exist.".to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<tower_sessions::session::Error> for PageError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Internal(format!("Session error: {err}"))
    }
}

fn render<T: Template>(status: StatusCode, template: &T) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            error!(error = %e, "Template rendering failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

/// Fallback for paths no route matched.
pub async fn not_found() -> Response {
    PageError::NotFound("The page you are looking for does not exist.".to_string()).into_response()
}

async fn onboarding_status(
    state: &AppState,
    user: Option<&CurrentUser>,
) -> Result<OnboardingStatus, PageError> {
    Ok(state
        .onboarding_service()
        .status(user.map(|u| &u.0))
        .await?)
}

/// Where a gated page sends the visitor instead of rendering, if anywhere.
fn gate_redirect(state: &AppState, status: &OnboardingStatus) -> Option<Response> {
    match OnboardingGate::from(status) {
        OnboardingGate::SignIn => {
            Some(Redirect::temporary(&state.config().identity.sign_in_url).into_response())
        }
        OnboardingGate::Onboarding => Some(Redirect::temporary("/onboarding").into_response()),
        OnboardingGate::Allowed => None,
    }
}

fn request_host<'a>(headers: &'a HeaderMap, uri: &'a Uri) -> Option<&'a str> {
    headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| uri.host())
}

/// GET /
/// A practice subdomain serves that practice; the apex routes by onboarding state
async fn home(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    uri: Uri,
    user: Option<CurrentUser>,
) -> Result<Response, PageError> {
    let root_domain = &state.config().server.root_domain;
    if let Some(slug) =
        request_host(&headers, &uri).and_then(|host| tenant::resolve_subdomain(host, root_domain))
    {
        return practice_page(&state, &slug).await;
    }

    let status = onboarding_status(&state, user.as_ref()).await?;
    if let Some(redirect) = gate_redirect(&state, &status) {
        return Ok(redirect);
    }

    Ok(Redirect::temporary("/dashboard").into_response())
}

/// GET /org/{slug} and GET /s/{subdomain}
async fn practice_by_path(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Response, PageError> {
    practice_page(&state, &tenant::normalize_slug(&slug)).await
}

async fn practice_page(state: &AppState, slug: &str) -> Result<Response, PageError> {
    let page = state.profile_service().resolve(slug).await?;

    Ok(match page.profile {
        Some(profile) => render(
            StatusCode::OK,
            &TenantTemplate::new(profile, chrono::Utc::now().year()),
        ),
        None => render(
            StatusCode::OK,
            &PlaceholderTemplate {
                name: page.organization.name,
                slug: page.organization.slug,
            },
        ),
    })
}

/// GET /onboarding
async fn onboarding_page(
    State(state): State<Arc<AppState>>,
    session: Session,
    user: Option<CurrentUser>,
) -> Result<Response, PageError> {
    let status = onboarding_status(&state, user.as_ref()).await?;
    match OnboardingGate::from(&status) {
        OnboardingGate::Onboarding => {}
        OnboardingGate::Allowed => return Ok(Redirect::temporary("/dashboard").into_response()),
        OnboardingGate::SignIn => {
            return Ok(gate_redirect(&state, &status)
                .unwrap_or_else(|| Redirect::temporary("/").into_response()));
        }
    }

    let token = csrf::issue(&session).await?;
    let form = match user {
        Some(user) => prefill(&state, user.user_id()).await,
        None => OnboardingForm::default(),
    };

    Ok(render(
        StatusCode::OK,
        &OnboardingTemplate::new(token, &state.config().server.root_domain, &form),
    ))
}

/// Seeds the form from the provider profile. Failures just leave it blank.
async fn prefill(state: &AppState, user_id: &str) -> OnboardingForm {
    match state.identity().get_user(user_id).await {
        Ok(user) => OnboardingForm {
            full_name: user.full_name().unwrap_or_default(),
            username: user
                .username
                .map(|u| u.to_ascii_lowercase())
                .unwrap_or_default(),
            practice_name: None,
        },
        Err(e) => {
            debug!(error = %e, "Could not prefill onboarding form");
            OnboardingForm::default()
        }
    }
}

#[derive(Debug, Deserialize)]
struct OnboardingSubmission {
    #[serde(default)]
    csrf_token: String,
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    practice_name: Option<String>,
}

/// POST /onboarding
async fn submit_onboarding(
    State(state): State<Arc<AppState>>,
    session: Session,
    user: Option<CurrentUser>,
    Form(submission): Form<OnboardingSubmission>,
) -> Result<Response, PageError> {
    let Some(user) = user else {
        return Ok(Redirect::to(&state.config().identity.sign_in_url).into_response());
    };

    if !csrf::verify(&session, &submission.csrf_token).await? {
        return Ok((StatusCode::FORBIDDEN, "Invalid or expired form token").into_response());
    }

    let form = OnboardingForm {
        full_name: submission.full_name,
        username: submission.username,
        practice_name: submission.practice_name,
    };
    let root_domain = &state.config().server.root_domain;

    let err = match state
        .onboarding_service()
        .complete(user.user_id(), form.clone())
        .await
    {
        Ok(_) => return Ok(Redirect::to("/dashboard").into_response()),
        Err(err) => err,
    };

    let token = csrf::issue(&session).await?;
    let page = OnboardingTemplate::new(token, root_domain, &form);

    Ok(match err {
        OnboardingError::Validation(errors) => render(
            StatusCode::UNPROCESSABLE_ENTITY,
            &page.with_field_errors(&errors),
        ),
        OnboardingError::InvalidInput(message) => {
            render(StatusCode::UNPROCESSABLE_ENTITY, &page.with_error(message))
        }
        OnboardingError::Conflict(message) => {
            render(StatusCode::CONFLICT, &page.with_error(message))
        }
        OnboardingError::IdentityProvider(message) => {
            error!("Onboarding failed at identity provider: {}", message);
            render(
                StatusCode::BAD_GATEWAY,
                &page.with_error("Failed to create organization"),
            )
        }
        other => {
            error!("Onboarding failed: {}", other);
            render(
                StatusCode::INTERNAL_SERVER_ERROR,
                &page.with_error("Something went wrong"),
            )
        }
    })
}

/// GET /dashboard
async fn dashboard(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    uri: Uri,
    user: Option<CurrentUser>,
) -> Result<Response, PageError> {
    let status = onboarding_status(&state, user.as_ref()).await?;
    if let Some(redirect) = gate_redirect(&state, &status) {
        return Ok(redirect);
    }

    let user_id = status.user_id.unwrap_or_default();
    let organizations = state.onboarding_service().list_organizations(&user_id).await?;

    let config = state.config();
    let authority = public_authority(
        &config.server.root_domain,
        request_host(&headers, &uri),
    );
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok())
        .unwrap_or(if config.server.secure_cookies { "https" } else { "http" });

    Ok(render(
        StatusCode::OK,
        &DashboardTemplate::new(organizations, scheme, &authority),
    ))
}

/// Root domain plus whatever port the current request arrived on.
fn public_authority(root_domain: &str, host: Option<&str>) -> String {
    let port = host
        .filter(|h| !h.starts_with('['))
        .and_then(|h| h.rsplit_once(':'))
        .map(|(_, port)| port)
        .filter(|port| !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()));

    match port {
        Some(port) => format!("{root_domain}:{port}"),
        None => root_domain.to_string(),
    }
}
