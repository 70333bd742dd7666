//! Active program lifecycle.
//!
//! `active_programs.user_id` is unique, so a user can hold at most one
//! active record. Starting is a single conditional insert and ending is a
//! single transaction; neither needs a prior read to stay consistent.

use chrono::{DateTime, Utc};
use coach_core::{ActiveProgram, CompletedProgram, Goals};
use sqlx::types::Json;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::completed_program::insert_completed;
use crate::error::{DatabaseError, Result};

#[derive(Debug, FromRow)]
struct ActiveRow {
    id: String,
    user_id: String,
    program_id: String,
    started_at: DateTime<Utc>,
    goals: Option<Json<Goals>>,
    photo_url: Option<String>,
}

impl From<ActiveRow> for ActiveProgram {
    fn from(row: ActiveRow) -> Self {
        ActiveProgram {
            id: row.id,
            user_id: row.user_id,
            program_id: row.program_id,
            started_at: row.started_at,
            goals: row.goals.map(|g| g.0),
            photo_url: row.photo_url,
        }
    }
}

/// Activate one of the user's programs.
///
/// Fails with `NotFound` when the program does not belong to the user and
/// with `AlreadyExists` when the user already has an active program.
pub async fn start_program(pool: &SqlitePool, user_id: &str, program_id: &str) -> Result<ActiveProgram> {
    let active = ActiveProgram {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        program_id: program_id.to_string(),
        started_at: Utc::now(),
        goals: None,
        photo_url: None,
    };

    let result = sqlx::query(
        r#"
        INSERT INTO active_programs (id, user_id, program_id, started_at)
        SELECT ?, ?, ?, ?
        WHERE EXISTS (
            SELECT 1 FROM workout_programs WHERE user_id = ? AND id = ?
        )
        "#,
    )
    .bind(&active.id)
    .bind(&active.user_id)
    .bind(&active.program_id)
    .bind(active.started_at)
    .bind(user_id)
    .bind(program_id)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "ActiveProgram", user_id))?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "WorkoutProgram",
            id: program_id.to_string(),
        });
    }

    tracing::info!("User {} started program {}", user_id, program_id);
    Ok(active)
}

/// Get the user's active program, if any.
pub async fn get_active(pool: &SqlitePool, user_id: &str) -> Result<Option<ActiveProgram>> {
    let row = sqlx::query_as::<_, ActiveRow>(
        r#"
        SELECT id, user_id, program_id, started_at, goals, photo_url
        FROM active_programs
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(ActiveProgram::from))
}

/// Store goals and the progress photo URL on an active record.
///
/// Both columns are replaced; saving without a photo clears the old URL.
pub async fn set_goals(
    pool: &SqlitePool,
    user_id: &str,
    active_id: &str,
    goals: &Goals,
    photo_url: Option<&str>,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE active_programs
        SET goals = ?, photo_url = ?
        WHERE user_id = ? AND id = ?
        "#,
    )
    .bind(Json(goals))
    .bind(photo_url)
    .bind(user_id)
    .bind(active_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "ActiveProgram",
            id: active_id.to_string(),
        });
    }

    tracing::debug!("Saved goals on active program {}", active_id);
    Ok(())
}

/// Drop the user's active program without archiving it.
pub async fn abandon(pool: &SqlitePool, user_id: &str) -> Result<ActiveProgram> {
    let row = sqlx::query_as::<_, ActiveRow>(
        r#"
        DELETE FROM active_programs
        WHERE user_id = ?
        RETURNING id, user_id, program_id, started_at, goals, photo_url
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "ActiveProgram",
        id: user_id.to_string(),
    })?;

    tracing::info!("User {} abandoned program {}", user_id, row.program_id);
    Ok(row.into())
}

/// Archive the user's active program and remove it in one transaction.
///
/// `ended_at` is the current time, clamped so it never precedes
/// `started_at`.
pub async fn end(pool: &SqlitePool, user_id: &str) -> Result<CompletedProgram> {
    let mut tx = pool.begin().await?;

    let active: ActiveProgram = sqlx::query_as::<_, ActiveRow>(
        r#"
        DELETE FROM active_programs
        WHERE user_id = ?
        RETURNING id, user_id, program_id, started_at, goals, photo_url
        "#,
    )
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "ActiveProgram",
        id: user_id.to_string(),
    })?
    .into();

    let completed = CompletedProgram {
        id: Uuid::new_v4().to_string(),
        user_id: active.user_id,
        program_id: active.program_id,
        started_at: active.started_at,
        ended_at: Utc::now().max(active.started_at),
        goals: active.goals,
        photo_url: active.photo_url,
    };
    insert_completed(&mut *tx, &completed).await?;

    tx.commit().await?;

    tracing::info!("User {} completed program {}", user_id, completed.program_id);
    Ok(completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completed_program::list_completed;
    use crate::workout_program::{create_program, tests::sample_program};
    use crate::Database;
    use coach_core::{BodyMeasurements, ConsistencyGoals};

    fn goals() -> Goals {
        Goals {
            current_weight: 180.0,
            current_body_fat: 20.0,
            body_measurements: BodyMeasurements::uniform(10.0),
            achievement_goals: "lose fat".to_string(),
            consistency_goals: ConsistencyGoals {
                percentage_complete: 80,
                days_per_week: 4,
            },
        }
    }

    async fn db_with_program() -> (Database, String) {
        let db = Database::in_memory().await.unwrap();
        let program = create_program(db.pool(), "user-1", &sample_program()).await.unwrap();
        (db, program.id)
    }

    #[tokio::test]
    async fn test_start_requires_owned_program() {
        let (db, program_id) = db_with_program().await;

        let result = start_program(db.pool(), "user-2", &program_id).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { entity: "WorkoutProgram", .. })));

        let result = start_program(db.pool(), "user-1", "missing").await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
        assert!(get_active(db.pool(), "user-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_at_most_one_active_program() {
        let (db, program_id) = db_with_program().await;
        let second = create_program(db.pool(), "user-1", &sample_program()).await.unwrap();

        let active = start_program(db.pool(), "user-1", &program_id).await.unwrap();
        let result = start_program(db.pool(), "user-1", &second.id).await;
        assert!(matches!(result, Err(DatabaseError::AlreadyExists { .. })));

        let stored = get_active(db.pool(), "user-1").await.unwrap().unwrap();
        assert_eq!(stored, active);
    }

    #[tokio::test]
    async fn test_set_goals_replaces_photo() {
        let (db, program_id) = db_with_program().await;
        let active = start_program(db.pool(), "user-1", &program_id).await.unwrap();

        set_goals(db.pool(), "user-1", &active.id, &goals(), Some("http://blobs/p.jpg"))
            .await
            .unwrap();
        let stored = get_active(db.pool(), "user-1").await.unwrap().unwrap();
        assert_eq!(stored.goals, Some(goals()));
        assert_eq!(stored.photo_url.as_deref(), Some("http://blobs/p.jpg"));

        set_goals(db.pool(), "user-1", &active.id, &goals(), None).await.unwrap();
        let stored = get_active(db.pool(), "user-1").await.unwrap().unwrap();
        assert_eq!(stored.photo_url, None);

        let result = set_goals(db.pool(), "user-2", &active.id, &goals(), None).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_abandon_does_not_archive() {
        let (db, program_id) = db_with_program().await;
        start_program(db.pool(), "user-1", &program_id).await.unwrap();

        abandon(db.pool(), "user-1").await.unwrap();
        assert!(get_active(db.pool(), "user-1").await.unwrap().is_none());
        assert!(list_completed(db.pool(), "user-1").await.unwrap().is_empty());

        assert!(matches!(
            abandon(db.pool(), "user-1").await,
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_end_moves_record_to_archive() {
        let (db, program_id) = db_with_program().await;
        let active = start_program(db.pool(), "user-1", &program_id).await.unwrap();
        set_goals(db.pool(), "user-1", &active.id, &goals(), Some("http://blobs/p.jpg"))
            .await
            .unwrap();

        let completed = end(db.pool(), "user-1").await.unwrap();
        assert_eq!(completed.program_id, program_id);
        assert_eq!(completed.started_at, active.started_at);
        assert!(completed.ended_at >= completed.started_at);
        assert_eq!(completed.goals, Some(goals()));
        assert_eq!(completed.photo_url.as_deref(), Some("http://blobs/p.jpg"));

        assert!(get_active(db.pool(), "user-1").await.unwrap().is_none());
        assert_eq!(list_completed(db.pool(), "user-1").await.unwrap(), vec![completed]);

        // A new program can be started once the previous one ended.
        start_program(db.pool(), "user-1", &program_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_end_never_precedes_start() {
        let (db, program_id) = db_with_program().await;
        start_program(db.pool(), "user-1", &program_id).await.unwrap();

        // Clock skew between writers can leave started_at ahead of now.
        let ahead = Utc::now() + chrono::Duration::hours(1);
        sqlx::query("UPDATE active_programs SET started_at = ? WHERE user_id = ?")
            .bind(ahead)
            .bind("user-1")
            .execute(db.pool())
            .await
            .unwrap();

        let completed = end(db.pool(), "user-1").await.unwrap();
        assert_eq!(completed.started_at, ahead);
        assert_eq!(completed.ended_at, ahead);
    }

    #[tokio::test]
    async fn test_end_without_active_program_writes_nothing() {
        let (db, _) = db_with_program().await;

        assert!(matches!(
            end(db.pool(), "user-1").await,
            Err(DatabaseError::NotFound { .. })
        ));
        assert!(list_completed(db.pool(), "user-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_completed_newest_first() {
        let (db, program_id) = db_with_program().await;

        start_program(db.pool(), "user-1", &program_id).await.unwrap();
        let first = end(db.pool(), "user-1").await.unwrap();
        start_program(db.pool(), "user-1", &program_id).await.unwrap();
        let second = end(db.pool(), "user-1").await.unwrap();

        let listed = list_completed(db.pool(), "user-1").await.unwrap();
        assert_eq!(listed, vec![second, first]);
    }
}
