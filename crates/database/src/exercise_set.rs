//! Exercise set CRUD operations.

use chrono::{DateTime, Utc};
use coach_core::{ExerciseSet, NewExerciseSet};
use sqlx::types::Json;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::error::{DatabaseError, Result};

#[derive(Debug, FromRow)]
struct SetRow {
    id: String,
    user_id: String,
    name: String,
    description: Option<String>,
    exercises: Json<Vec<String>>,
    created_at: DateTime<Utc>,
}

impl From<SetRow> for ExerciseSet {
    fn from(row: SetRow) -> Self {
        ExerciseSet {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            description: row.description,
            exercises: row.exercises.0,
            created_at: row.created_at,
        }
    }
}

/// Create a set owned by `user_id`. Exercise order and repeats are kept.
pub async fn create_set(pool: &SqlitePool, user_id: &str, new: &NewExerciseSet) -> Result<ExerciseSet> {
    let set = ExerciseSet {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        name: new.name.trim().to_string(),
        description: new.description.clone(),
        exercises: new.exercises.clone(),
        created_at: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO sets (id, user_id, name, description, exercises, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&set.id)
    .bind(&set.user_id)
    .bind(&set.name)
    .bind(&set.description)
    .bind(Json(&set.exercises))
    .bind(set.created_at)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "Set", &set.id))?;

    Ok(set)
}

/// Get one of the user's sets by ID.
pub async fn get_set(pool: &SqlitePool, user_id: &str, id: &str) -> Result<ExerciseSet> {
    sqlx::query_as::<_, SetRow>(
        r#"
        SELECT id, user_id, name, description, exercises, created_at
        FROM sets
        WHERE user_id = ? AND id = ?
        "#,
    )
    .bind(user_id)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .map(ExerciseSet::from)
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Set",
        id: id.to_string(),
    })
}

/// List the user's sets, oldest first.
pub async fn list_sets(pool: &SqlitePool, user_id: &str) -> Result<Vec<ExerciseSet>> {
    let rows = sqlx::query_as::<_, SetRow>(
        r#"
        SELECT id, user_id, name, description, exercises, created_at
        FROM sets
        WHERE user_id = ?
        ORDER BY created_at, rowid
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ExerciseSet::from).collect())
}

/// Delete one of the user's sets.
pub async fn delete_set(pool: &SqlitePool, user_id: &str, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM sets WHERE user_id = ? AND id = ?")
        .bind(user_id)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Set",
            id: id.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    #[tokio::test]
    async fn test_set_keeps_exercise_order() {
        let db = Database::in_memory().await.unwrap();

        let new = NewExerciseSet {
            name: "Push".to_string(),
            description: None,
            exercises: vec!["ex-2".to_string(), "ex-1".to_string(), "ex-2".to_string()],
        };
        let created = create_set(db.pool(), "user-1", &new).await.unwrap();

        let fetched = get_set(db.pool(), "user-1", &created.id).await.unwrap();
        assert_eq!(fetched.exercises, vec!["ex-2", "ex-1", "ex-2"]);
        assert_eq!(list_sets(db.pool(), "user-1").await.unwrap(), vec![fetched]);

        delete_set(db.pool(), "user-1", &created.id).await.unwrap();
        assert!(list_sets(db.pool(), "user-1").await.unwrap().is_empty());
    }
}
