//! Exercise CRUD operations.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use coach_core::{BodyPart, Exercise, MeasurementOptions, NewExercise};
use sqlx::types::Json;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::error::{DatabaseError, Result};

#[derive(Debug, FromRow)]
struct ExerciseRow {
    id: String,
    user_id: String,
    name: String,
    description: Option<String>,
    body_parts: Json<BTreeSet<BodyPart>>,
    measurements: Json<MeasurementOptions>,
    weight: bool,
    created_at: DateTime<Utc>,
}

impl From<ExerciseRow> for Exercise {
    fn from(row: ExerciseRow) -> Self {
        Exercise {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            description: row.description,
            body_parts: row.body_parts.0,
            measurements: row.measurements.0,
            weight: row.weight,
            created_at: row.created_at,
        }
    }
}

/// Create an exercise owned by `user_id`.
pub async fn create_exercise(
    pool: &SqlitePool,
    user_id: &str,
    new: &NewExercise,
) -> Result<Exercise> {
    let exercise = Exercise {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        name: new.name.trim().to_string(),
        description: new.description.clone(),
        body_parts: new.body_parts.clone(),
        measurements: new.measurements.clone(),
        weight: new.weight,
        created_at: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO exercises (id, user_id, name, description, body_parts, measurements, weight, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&exercise.id)
    .bind(&exercise.user_id)
    .bind(&exercise.name)
    .bind(&exercise.description)
    .bind(Json(&exercise.body_parts))
    .bind(Json(&exercise.measurements))
    .bind(exercise.weight)
    .bind(exercise.created_at)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "Exercise", &exercise.id))?;

    Ok(exercise)
}

/// Get one of the user's exercises by ID.
pub async fn get_exercise(pool: &SqlitePool, user_id: &str, id: &str) -> Result<Exercise> {
    sqlx::query_as::<_, ExerciseRow>(
        r#"
        SELECT id, user_id, name, description, body_parts, measurements, weight, created_at
        FROM exercises
        WHERE user_id = ? AND id = ?
        "#,
    )
    .bind(user_id)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .map(Exercise::from)
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Exercise",
        id: id.to_string(),
    })
}

/// List the user's exercises, oldest first.
pub async fn list_exercises(pool: &SqlitePool, user_id: &str) -> Result<Vec<Exercise>> {
    let rows = sqlx::query_as::<_, ExerciseRow>(
        r#"
        SELECT id, user_id, name, description, body_parts, measurements, weight, created_at
        FROM exercises
        WHERE user_id = ?
        ORDER BY created_at, rowid
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Exercise::from).collect())
}

/// Delete one of the user's exercises.
pub async fn delete_exercise(pool: &SqlitePool, user_id: &str, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM exercises
        WHERE user_id = ? AND id = ?
        "#,
    )
    .bind(user_id)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Exercise",
            id: id.to_string(),
        });
    }

    Ok(())
}
