//! Bearer-token extractor.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use portal::{Identity, PortalError};
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

/// The signed-in user. Rejects the request with 401 when the bearer token
/// is missing or unknown.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.strip_prefix("Bearer ").unwrap_or(value).trim())
            .filter(|token| !token.is_empty());

        let Some(token) = token else {
            return Err(PortalError::Unauthenticated.into());
        };

        match state.auth.authenticate(token).await {
            Some(identity) => Ok(CurrentUser(identity)),
            None => {
                warn!("Rejected unknown bearer token");
                Err(PortalError::Unauthenticated.into())
            }
        }
    }
}
