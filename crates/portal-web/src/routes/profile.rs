//! Client profile endpoints.

use axum::extract::State;
use axum::Json;
use coach_core::{ClientProfile, ProfileUpdate};
use portal::{PortalError, ProfileLoad, ProfileSession, ProfileState};
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::error::Result;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ProfileResponse {
    pub profile: ClientProfile,
    /// Whether this request created the default profile.
    pub created: bool,
}

/// Load the profile, creating the default one on first visit.
pub async fn get_profile(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<ProfileResponse>> {
    let load = state.portal.profiles().load(Some(&identity)).await?;
    let created = matches!(load, ProfileLoad::Created(_));
    let profile = load.into_profile().ok_or(PortalError::Unauthenticated)?;
    Ok(Json(ProfileResponse { profile, created }))
}

/// Merge the supplied fields into the profile. A first visit may be a PATCH,
/// so the session creates the default profile when needed.
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<ClientProfile>> {
    let mut session = ProfileSession::open(state.portal.profiles().clone(), Some(identity)).await?;
    session.update(update).await?;
    match session.state() {
        ProfileState::Ready(profile) => Ok(Json(profile.clone())),
        ProfileState::Unauthenticated => Err(PortalError::Unauthenticated.into()),
    }
}
