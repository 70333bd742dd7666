//! Exercise, set and daily routine endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use coach_core::{
    DailyRoutine, Exercise, ExerciseSet, NewDailyRoutine, NewExercise, NewExerciseSet,
};

use crate::auth::CurrentUser;
use crate::error::Result;
use crate::state::AppState;

pub async fn list_exercises(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<Vec<Exercise>>> {
    Ok(Json(state.portal.catalog().list_exercises(&identity).await?))
}

pub async fn create_exercise(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Json(new): Json<NewExercise>,
) -> Result<(StatusCode, Json<Exercise>)> {
    let created = state.portal.catalog().create_exercise(&identity, &new).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn delete_exercise(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.portal.catalog().delete_exercise(&identity, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_sets(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<Vec<ExerciseSet>>> {
    Ok(Json(state.portal.catalog().list_sets(&identity).await?))
}

pub async fn create_set(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Json(new): Json<NewExerciseSet>,
) -> Result<(StatusCode, Json<ExerciseSet>)> {
    let created = state.portal.catalog().create_set(&identity, &new).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn delete_set(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.portal.catalog().delete_set(&identity, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_daily_routines(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<Vec<DailyRoutine>>> {
    Ok(Json(state.portal.catalog().list_daily_routines(&identity).await?))
}

pub async fn create_daily_routine(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Json(new): Json<NewDailyRoutine>,
) -> Result<(StatusCode, Json<DailyRoutine>)> {
    let created = state
        .portal
        .catalog()
        .create_daily_routine(&identity, &new)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn delete_daily_routine(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.portal.catalog().delete_daily_routine(&identity, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
