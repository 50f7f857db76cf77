use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::identity::IdentityProvider;
use crate::services::{OnboardingService, ProfileService};
use crate::state::SharedState;
use crate::web;

mod assets;
pub mod auth;
mod error;
mod observability;
mod onboarding;
mod organizations;
mod profiles;
mod system;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn identity(&self) -> &Arc<dyn IdentityProvider> {
        &self.shared.identity
    }

    #[must_use]
    pub fn onboarding_service(&self) -> &Arc<dyn OnboardingService> {
        &self.shared.onboarding_service
    }

    #[must_use]
    pub fn profile_service(&self) -> &Arc<dyn ProfileService> {
        &self.shared.profile_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let api_router = Router::new()
        .route("/health", get(system::health))
        .route("/onboarding/status", get(onboarding::get_status))
        .route("/onboarding", post(onboarding::complete))
        .route(
            "/organizations",
            get(organizations::list_mine).post(organizations::register),
        )
        .route("/organizations/{slug}", get(organizations::get_by_slug))
        .route(
            "/organizations/{slug}/profile",
            get(profiles::get_profile).put(profiles::put_profile),
        )
        .fallback(|| async { ApiError::NotFound("No such endpoint".to_string()) });

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .route("/metrics", get(observability::get_metrics))
        .route("/static/{*path}", get(assets::serve_asset))
        .merge(web::router(&state))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::identify_middleware,
        ))
        .fallback(web::not_found)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
