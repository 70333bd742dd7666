//! Client profile storage, one row per user.

use chrono::Utc;
use coach_core::{ClientProfile, ProfileUpdate};
use sqlx::{FromRow, SqliteConnection, SqlitePool};

use crate::error::{DatabaseError, Result};

const SELECT_PROFILE: &str = r#"
    SELECT user_id, full_name, date_of_birth, gender, email, phone, address,
           height, weight, medical_history, fitness_goals, activity_level,
           preferred_workout_times, dietary_preferences, created_at, updated_at
    FROM client_profiles
    WHERE user_id = ?
"#;

#[derive(Debug, FromRow)]
struct ProfileRow {
    user_id: String,
    full_name: String,
    date_of_birth: String,
    gender: String,
    email: String,
    phone: Option<String>,
    address: Option<String>,
    height: f64,
    weight: f64,
    medical_history: Option<String>,
    fitness_goals: Option<String>,
    activity_level: String,
    preferred_workout_times: Option<String>,
    dietary_preferences: Option<String>,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
}

impl From<ProfileRow> for ClientProfile {
    fn from(row: ProfileRow) -> Self {
        ClientProfile {
            user_id: row.user_id,
            full_name: row.full_name,
            date_of_birth: row.date_of_birth,
            gender: row.gender,
            email: row.email,
            phone: row.phone,
            address: row.address,
            height: row.height,
            weight: row.weight,
            medical_history: row.medical_history,
            fitness_goals: row.fitness_goals,
            activity_level: row.activity_level,
            preferred_workout_times: row.preferred_workout_times,
            dietary_preferences: row.dietary_preferences,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Get a user's profile, if one was created.
pub async fn get_profile(pool: &SqlitePool, user_id: &str) -> Result<Option<ClientProfile>> {
    let row = sqlx::query_as::<_, ProfileRow>(SELECT_PROFILE)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(ClientProfile::from))
}

/// Insert `profile` unless the user already has one.
///
/// Returns the stored profile and whether this call created it. Two
/// concurrent first loads both end up with the same row.
pub async fn create_if_missing(pool: &SqlitePool, profile: &ClientProfile) -> Result<(ClientProfile, bool)> {
    let mut conn = pool.acquire().await?;

    let result = sqlx::query(
        r#"
        INSERT INTO client_profiles (
            user_id, full_name, date_of_birth, gender, email, phone, address,
            height, weight, medical_history, fitness_goals, activity_level,
            preferred_workout_times, dietary_preferences, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_id) DO NOTHING
        "#,
    )
    .bind(&profile.user_id)
    .bind(&profile.full_name)
    .bind(&profile.date_of_birth)
    .bind(&profile.gender)
    .bind(&profile.email)
    .bind(&profile.phone)
    .bind(&profile.address)
    .bind(profile.height)
    .bind(profile.weight)
    .bind(&profile.medical_history)
    .bind(&profile.fitness_goals)
    .bind(&profile.activity_level)
    .bind(&profile.preferred_workout_times)
    .bind(&profile.dietary_preferences)
    .bind(profile.created_at)
    .bind(profile.updated_at)
    .execute(&mut *conn)
    .await?;

    let created = result.rows_affected() == 1;
    let stored = fetch(&mut *conn, &profile.user_id).await?;
    if created {
        tracing::info!("Created default profile for {}", profile.user_id);
    }

    Ok((stored, created))
}

/// Merge `update` into the stored profile and return the result.
pub async fn update_profile(
    pool: &SqlitePool,
    user_id: &str,
    update: &ProfileUpdate,
) -> Result<ClientProfile> {
    let mut tx = pool.begin().await?;

    let mut profile = fetch(&mut *tx, user_id).await?;
    profile.apply(update);
    profile.updated_at = Utc::now().max(profile.created_at);

    sqlx::query(
        r#"
        UPDATE client_profiles
        SET full_name = ?, date_of_birth = ?, gender = ?, email = ?, phone = ?,
            address = ?, height = ?, weight = ?, medical_history = ?,
            fitness_goals = ?, activity_level = ?, preferred_workout_times = ?,
            dietary_preferences = ?, updated_at = ?
        WHERE user_id = ?
        "#,
    )
    .bind(&profile.full_name)
    .bind(&profile.date_of_birth)
    .bind(&profile.gender)
    .bind(&profile.email)
    .bind(&profile.phone)
    .bind(&profile.address)
    .bind(profile.height)
    .bind(profile.weight)
    .bind(&profile.medical_history)
    .bind(&profile.fitness_goals)
    .bind(&profile.activity_level)
    .bind(&profile.preferred_workout_times)
    .bind(&profile.dietary_preferences)
    .bind(profile.updated_at)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!("Updated profile for {}", user_id);
    Ok(profile)
}

async fn fetch(conn: &mut SqliteConnection, user_id: &str) -> Result<ClientProfile> {
    sqlx::query_as::<_, ProfileRow>(SELECT_PROFILE)
        .bind(user_id)
        .fetch_optional(conn)
        .await?
        .map(ClientProfile::from)
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "ClientProfile",
            id: user_id.to_string(),
        })
}
