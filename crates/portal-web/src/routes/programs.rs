//! Workout program endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use coach_core::{ActiveProgram, Phase, ProgramMetadata, ProgramWizard, WorkoutProgram};
use portal::PortalError;
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::error::Result;
use crate::state::AppState;

/// Program details plus one draft per phase, as filled in by the client.
#[derive(Debug, Deserialize)]
pub struct CreateProgramRequest {
    #[serde(flatten)]
    pub metadata: ProgramMetadata,
    #[serde(default)]
    pub phases: Vec<Phase>,
}

pub async fn list_programs(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<Vec<WorkoutProgram>>> {
    Ok(Json(state.portal.programs().list_programs(&identity).await?))
}

/// Run the composition wizard over the submitted drafts and save the result.
pub async fn create_program(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Json(request): Json<CreateProgramRequest>,
) -> Result<(StatusCode, Json<WorkoutProgram>)> {
    let mut wizard =
        ProgramWizard::from_drafts(request.metadata, request.phases).map_err(PortalError::from)?;
    let program = state
        .portal
        .programs()
        .submit_wizard(&identity, &mut wizard)
        .await?;
    Ok((StatusCode::CREATED, Json(program)))
}

pub async fn get_program(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<WorkoutProgram>> {
    Ok(Json(state.portal.programs().get_program(&identity, &id).await?))
}

pub async fn delete_program(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.portal.programs().delete_program(&identity, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn start_program(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<ActiveProgram>)> {
    let active = state.portal.active().start_program(&identity, &id).await?;
    Ok((StatusCode::CREATED, Json(active)))
}
