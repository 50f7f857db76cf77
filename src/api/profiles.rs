use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::validate_slug_param;
use super::{ApiError, ApiResponse, AppState};
use crate::models::doctor::DoctorProfile;

/// GET /api/organizations/{slug}/profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<DoctorProfile>>, ApiError> {
    let slug = validate_slug_param(&slug)?;
    let profile = state.profile_service().get_profile(&slug).await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// PUT /api/organizations/{slug}/profile
/// Only the user who created the practice may edit it
pub async fn put_profile(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(slug): Path<String>,
    Json(profile): Json<DoctorProfile>,
) -> Result<Json<ApiResponse<DoctorProfile>>, ApiError> {
    let slug = validate_slug_param(&slug)?;
    let profile = state
        .profile_service()
        .save_profile(user.user_id(), &slug, profile)
        .await?;

    Ok(Json(ApiResponse::success(profile)))
}
