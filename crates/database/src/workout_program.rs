//! Workout program storage.
//!
//! A program row embeds its phases and the snapshot of every routine, set
//! and exercise they reference as JSON columns, so later edits to the
//! catalog never change a saved program.

use chrono::{DateTime, Utc};
use coach_core::{DailyRoutine, Exercise, ExerciseSet, NewWorkoutProgram, Phase, WorkoutProgram};
use sqlx::types::Json;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::error::{DatabaseError, Result};

#[derive(Debug, FromRow)]
struct ProgramRow {
    id: String,
    user_id: String,
    name: String,
    description: Option<String>,
    total_weeks: u32,
    total_phases: u32,
    phases: Json<Vec<Phase>>,
    daily_routines: Json<Vec<DailyRoutine>>,
    sets: Json<Vec<ExerciseSet>>,
    exercises: Json<Vec<Exercise>>,
    created_at: DateTime<Utc>,
}

impl From<ProgramRow> for WorkoutProgram {
    fn from(row: ProgramRow) -> Self {
        WorkoutProgram {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            description: row.description,
            total_weeks: row.total_weeks,
            total_phases: row.total_phases,
            phases: row.phases.0,
            daily_routines: row.daily_routines.0,
            sets: row.sets.0,
            exercises: row.exercises.0,
            created_at: row.created_at,
        }
    }
}

/// Save a composed program for `user_id`.
pub async fn create_program(
    pool: &SqlitePool,
    user_id: &str,
    new: &NewWorkoutProgram,
) -> Result<WorkoutProgram> {
    let program = WorkoutProgram {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        name: new.name.clone(),
        description: new.description.clone(),
        total_weeks: new.total_weeks,
        total_phases: new.total_phases,
        phases: new.phases.clone(),
        daily_routines: new.daily_routines.clone(),
        sets: new.sets.clone(),
        exercises: new.exercises.clone(),
        created_at: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO workout_programs (
            id, user_id, name, description, total_weeks, total_phases,
            phases, daily_routines, sets, exercises, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&program.id)
    .bind(&program.user_id)
    .bind(&program.name)
    .bind(&program.description)
    .bind(program.total_weeks)
    .bind(program.total_phases)
    .bind(Json(&program.phases))
    .bind(Json(&program.daily_routines))
    .bind(Json(&program.sets))
    .bind(Json(&program.exercises))
    .bind(program.created_at)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "WorkoutProgram", &program.id))?;

    tracing::debug!(
        "Saved program {} with {} phases for {}",
        program.id,
        program.phases.len(),
        user_id
    );

    Ok(program)
}

/// Get one of the user's programs, if it exists.
pub async fn find_program(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
) -> Result<Option<WorkoutProgram>> {
    let row = sqlx::query_as::<_, ProgramRow>(
        r#"
        SELECT id, user_id, name, description, total_weeks, total_phases,
               phases, daily_routines, sets, exercises, created_at
        FROM workout_programs
        WHERE user_id = ? AND id = ?
        "#,
    )
    .bind(user_id)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(WorkoutProgram::from))
}

/// Get one of the user's programs by ID.
pub async fn get_program(pool: &SqlitePool, user_id: &str, id: &str) -> Result<WorkoutProgram> {
    find_program(pool, user_id, id)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "WorkoutProgram",
            id: id.to_string(),
        })
}

/// List the user's programs, oldest first.
pub async fn list_programs(pool: &SqlitePool, user_id: &str) -> Result<Vec<WorkoutProgram>> {
    let rows = sqlx::query_as::<_, ProgramRow>(
        r#"
        SELECT id, user_id, name, description, total_weeks, total_phases,
               phases, daily_routines, sets, exercises, created_at
        FROM workout_programs
        WHERE user_id = ?
        ORDER BY created_at, rowid
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(WorkoutProgram::from).collect())
}

/// Delete one of the user's programs.
///
/// An active or completed record that points at the program is left alone.
pub async fn delete_program(pool: &SqlitePool, user_id: &str, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM workout_programs WHERE user_id = ? AND id = ?")
        .bind(user_id)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "WorkoutProgram",
            id: id.to_string(),
        });
    }

    Ok(())
}
