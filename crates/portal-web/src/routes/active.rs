//! Active program endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use coach_core::{ActiveProgram, CompletedProgram, Goals};
use portal::{ActiveProgramView, GoalsSubmission, Photo};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Progress photo as sent by the client.
#[derive(Debug, Deserialize)]
pub struct PhotoUpload {
    pub filename: String,
    /// Standard base64 of the file contents.
    pub data: String,
}

#[derive(Debug, Deserialize)]
pub struct GoalsRequest {
    pub goals: Goals,
    #[serde(default)]
    pub photo: Option<PhotoUpload>,
}

/// The active program page, or `null` when nothing is active.
pub async fn get_active(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<Option<ActiveProgramView>>> {
    Ok(Json(state.portal.active().active_program(&identity).await?))
}

pub async fn set_goals(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Json(request): Json<GoalsRequest>,
) -> Result<Json<ActiveProgram>> {
    let photo = match request.photo {
        Some(upload) => {
            let bytes = STANDARD
                .decode(upload.data.trim())
                .map_err(|_| ApiError::BadRequest("Photo is not valid base64.".to_string()))?;
            Some(Photo {
                filename: upload.filename,
                bytes,
            })
        }
        None => None,
    };

    let submission = GoalsSubmission {
        goals: request.goals,
        photo,
    };
    Ok(Json(state.portal.active().set_goals(&identity, submission).await?))
}

pub async fn abandon(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<StatusCode> {
    state.portal.active().abandon(&identity).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn end(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<CompletedProgram>> {
    Ok(Json(state.portal.active().end(&identity).await?))
}

pub async fn completed_programs(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<Vec<CompletedProgram>>> {
    Ok(Json(state.portal.active().completed_programs(&identity).await?))
}

pub async fn completed_program(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<CompletedProgram>> {
    Ok(Json(state.portal.active().completed_program(&identity, &id).await?))
}
