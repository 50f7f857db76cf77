use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::identity::{Identity, extract_session_token};

/// The verified provider user behind the current request.
///
/// Extracting `CurrentUser` rejects anonymous requests with 401; extract
/// `Option<CurrentUser>` on routes that also serve visitors.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl CurrentUser {
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.0.user_id
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(ApiError::unauthorized)
    }
}

impl<S> OptionalFromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().cloned())
    }
}

/// Identification middleware. Checks, in order:
/// 1. `Authorization: Bearer <session jwt>` header
/// 2. the provider's session cookie
///
/// A missing or invalid token leaves the request anonymous.
pub async fn identify_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = extract_session_token(request.headers(), &state.config().identity.session_cookie);

    if let Some(token) = token {
        match state.identity().authenticate(&token).await {
            Ok(identity) => {
                tracing::Span::current().record("user_id", identity.user_id.as_str());
                request.extensions_mut().insert(CurrentUser(identity));
            }
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unverifiable session token");
            }
        }
    }

    next.run(request).await
}
