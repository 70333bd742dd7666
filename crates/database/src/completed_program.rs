//! Archive of programs the user finished.

use chrono::{DateTime, Utc};
use coach_core::{CompletedProgram, Goals};
use sqlx::types::Json;
use sqlx::{FromRow, SqliteConnection, SqlitePool};

use crate::error::{DatabaseError, Result};

#[derive(Debug, FromRow)]
struct CompletedRow {
    id: String,
    user_id: String,
    program_id: String,
    started_at: DateTime<Utc>,
    ended_at: DateTime<Utc>,
    goals: Option<Json<Goals>>,
    photo_url: Option<String>,
}

impl From<CompletedRow> for CompletedProgram {
    fn from(row: CompletedRow) -> Self {
        CompletedProgram {
            id: row.id,
            user_id: row.user_id,
            program_id: row.program_id,
            started_at: row.started_at,
            ended_at: row.ended_at,
            goals: row.goals.map(|g| g.0),
            photo_url: row.photo_url,
        }
    }
}

/// Insert an archive record. Only called from inside the end-program
/// transaction, so it takes the transaction's connection.
pub(crate) async fn insert_completed(
    conn: &mut SqliteConnection,
    completed: &CompletedProgram,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO completed_programs (id, user_id, program_id, started_at, ended_at, goals, photo_url)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&completed.id)
    .bind(&completed.user_id)
    .bind(&completed.program_id)
    .bind(completed.started_at)
    .bind(completed.ended_at)
    .bind(completed.goals.as_ref().map(Json))
    .bind(&completed.photo_url)
    .execute(conn)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "CompletedProgram", &completed.id))?;

    Ok(())
}

/// Get one of the user's completed programs by ID.
pub async fn get_completed(pool: &SqlitePool, user_id: &str, id: &str) -> Result<CompletedProgram> {
    sqlx::query_as::<_, CompletedRow>(
        r#"
        SELECT id, user_id, program_id, started_at, ended_at, goals, photo_url
        FROM completed_programs
        WHERE user_id = ? AND id = ?
        "#,
    )
    .bind(user_id)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .map(CompletedProgram::from)
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "CompletedProgram",
        id: id.to_string(),
    })
}

/// List the user's completed programs, most recently ended first.
pub async fn list_completed(pool: &SqlitePool, user_id: &str) -> Result<Vec<CompletedProgram>> {
    let rows = sqlx::query_as::<_, CompletedRow>(
        r#"
        SELECT id, user_id, program_id, started_at, ended_at, goals, photo_url
        FROM completed_programs
        WHERE user_id = ?
        ORDER BY ended_at DESC, rowid DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(CompletedProgram::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use chrono::TimeZone;

    fn archived(id: &str, user_id: &str) -> CompletedProgram {
        CompletedProgram {
            id: id.to_string(),
            user_id: user_id.to_string(),
            program_id: "program-1".to_string(),
            started_at: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
            ended_at: Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
            goals: None,
            photo_url: None,
        }
    }

    #[tokio::test]
    async fn test_get_completed_is_owner_scoped() {
        let db = Database::in_memory().await.unwrap();
        let record = archived("done-1", "user-1");
        let mut conn = db.pool().acquire().await.unwrap();
        insert_completed(&mut *conn, &record).await.unwrap();
        drop(conn);

        assert_eq!(get_completed(db.pool(), "user-1", "done-1").await.unwrap(), record);
        assert!(matches!(
            get_completed(db.pool(), "user-2", "done-1").await,
            Err(DatabaseError::NotFound { entity: "CompletedProgram", .. })
        ));
    }
}
