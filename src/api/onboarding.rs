use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::{ApiError, ApiResponse, AppState, OnboardingCompleted};
use crate::models::onboarding::OnboardingForm;
use crate::services::OnboardingStatus;

/// GET /api/onboarding/status
/// Anonymous callers get `is_authenticated: false` rather than a 401
pub async fn get_status(
    State(state): State<Arc<AppState>>,
    user: Option<CurrentUser>,
) -> Result<Json<ApiResponse<OnboardingStatus>>, ApiError> {
    let status = state
        .onboarding_service()
        .status(user.as_ref().map(|u| &u.0))
        .await?;

    Ok(Json(ApiResponse::success(status)))
}

/// POST /api/onboarding
/// Creates the caller's practice at the identity provider and locally
pub async fn complete(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(form): Json<OnboardingForm>,
) -> Result<(StatusCode, Json<ApiResponse<OnboardingCompleted>>), ApiError> {
    let result = state
        .onboarding_service()
        .complete(user.user_id(), form)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(OnboardingCompleted {
            user: result.user,
            organization: result.organization.into(),
        })),
    ))
}
