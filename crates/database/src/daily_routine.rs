//! Daily routine CRUD operations.

use chrono::{DateTime, Utc};
use coach_core::{DailyRoutine, NewDailyRoutine};
use sqlx::types::Json;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::error::{DatabaseError, Result};

#[derive(Debug, FromRow)]
struct RoutineRow {
    id: String,
    user_id: String,
    name: String,
    description: Option<String>,
    routine_type: String,
    sets: Json<Vec<String>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<RoutineRow> for DailyRoutine {
    type Error = DatabaseError;

    fn try_from(row: RoutineRow) -> Result<Self> {
        let routine_type = row.routine_type.parse().map_err(|reason| DatabaseError::Corrupt {
            entity: "DailyRoutine",
            id: row.id.clone(),
            reason,
        })?;

        Ok(DailyRoutine {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            description: row.description,
            routine_type,
            sets: row.sets.0,
            created_at: row.created_at,
        })
    }
}

/// Create a daily routine owned by `user_id`.
pub async fn create_routine(
    pool: &SqlitePool,
    user_id: &str,
    new: &NewDailyRoutine,
) -> Result<DailyRoutine> {
    let routine = DailyRoutine {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        name: new.name.trim().to_string(),
        description: new.description.clone(),
        routine_type: new.routine_type,
        sets: new.sets.clone(),
        created_at: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO daily_routines (id, user_id, name, description, routine_type, sets, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&routine.id)
    .bind(&routine.user_id)
    .bind(&routine.name)
    .bind(&routine.description)
    .bind(routine.routine_type.label())
    .bind(Json(&routine.sets))
    .bind(routine.created_at)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "DailyRoutine", &routine.id))?;

    Ok(routine)
}

/// Get one of the user's routines by ID.
pub async fn get_routine(pool: &SqlitePool, user_id: &str, id: &str) -> Result<DailyRoutine> {
    sqlx::query_as::<_, RoutineRow>(
        r#"
        SELECT id, user_id, name, description, routine_type, sets, created_at
        FROM daily_routines
        WHERE user_id = ? AND id = ?
        "#,
    )
    .bind(user_id)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "DailyRoutine",
        id: id.to_string(),
    })?
    .try_into()
}

/// List the user's routines, oldest first.
pub async fn list_routines(pool: &SqlitePool, user_id: &str) -> Result<Vec<DailyRoutine>> {
    let rows = sqlx::query_as::<_, RoutineRow>(
        r#"
        SELECT id, user_id, name, description, routine_type, sets, created_at
        FROM daily_routines
        WHERE user_id = ?
        ORDER BY created_at, rowid
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(DailyRoutine::try_from).collect()
}

/// Delete one of the user's routines.
pub async fn delete_routine(pool: &SqlitePool, user_id: &str, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM daily_routines WHERE user_id = ? AND id = ?")
        .bind(user_id)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "DailyRoutine",
            id: id.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use coach_core::RoutineType;

    #[tokio::test]
    async fn test_routine_crud() {
        let db = Database::in_memory().await.unwrap();

        let new = NewDailyRoutine {
            name: "Leg Day".to_string(),
            description: None,
            routine_type: RoutineType::LowerBody,
            sets: vec!["set-1".to_string()],
        };
        let created = create_routine(db.pool(), "user-1", &new).await.unwrap();

        let fetched = get_routine(db.pool(), "user-1", &created.id).await.unwrap();
        assert_eq!(fetched.routine_type, RoutineType::LowerBody);
        assert_eq!(fetched.sets, vec!["set-1"]);

        delete_routine(db.pool(), "user-1", &created.id).await.unwrap();
        assert!(matches!(
            get_routine(db.pool(), "user-1", &created.id).await,
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_routine_type_is_corrupt() {
        let db = Database::in_memory().await.unwrap();

        sqlx::query(
            "INSERT INTO daily_routines (id, user_id, name, routine_type, created_at) VALUES ('r-1', 'user-1', 'Odd', 'Yoga', ?)",
        )
        .bind(Utc::now())
        .execute(db.pool())
        .await
        .unwrap();

        let result = list_routines(db.pool(), "user-1").await;
        assert!(matches!(result, Err(DatabaseError::Corrupt { .. })));
    }
}
