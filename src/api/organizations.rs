use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::validate_slug_param;
use super::{ApiError, ApiResponse, AppState, OrganizationCreated, OrganizationDto};
use crate::services::RegisterOrganization;

/// GET /api/organizations
/// Practices created by the caller
pub async fn list_mine(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<ApiResponse<Vec<OrganizationDto>>>, ApiError> {
    let organizations = state
        .onboarding_service()
        .list_organizations(user.user_id())
        .await?;

    Ok(Json(ApiResponse::success(
        organizations.into_iter().map(Into::into).collect(),
    )))
}

/// POST /api/organizations
/// Records an organization the identity provider already created
pub async fn register(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(payload): Json<RegisterOrganization>,
) -> Result<(StatusCode, Json<ApiResponse<OrganizationCreated>>), ApiError> {
    let organization = state
        .onboarding_service()
        .register_organization(user.user_id(), payload)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(OrganizationCreated {
            message: "Organization created successfully".to_string(),
            organization: organization.into(),
        })),
    ))
}

/// GET /api/organizations/{slug}
pub async fn get_by_slug(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<OrganizationDto>>, ApiError> {
    let slug = validate_slug_param(&slug)?;
    let page = state.profile_service().resolve(&slug).await?;

    Ok(Json(ApiResponse::success(page.organization.into())))
}
