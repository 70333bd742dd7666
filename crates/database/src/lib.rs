//! SQLite persistence layer for the coach portal.
//!
//! Every table is scoped by `user_id`; each module exposes free async
//! functions over a [`SqlitePool`] for one collection.
//!
//! # Example
//!
//! ```no_run
//! use coach_core::{BodyPart, MeasurementOptions, NewExercise};
//! use database::{exercise, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:portal.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let new = NewExercise {
//!         name: "Bench Press".to_string(),
//!         body_parts: [BodyPart::Chest].into_iter().collect(),
//!         measurements: MeasurementOptions::new().with(MeasurementOptions::REPS),
//!         ..NewExercise::default()
//!     };
//!     let created = exercise::create_exercise(db.pool(), "user-1", &new).await?;
//!     println!("created {}", created.id);
//!
//!     Ok(())
//! }
//! ```

pub mod active_program;
pub mod client_profile;
pub mod completed_program;
pub mod daily_routine;
pub mod error;
pub mod exercise;
pub mod exercise_set;
pub mod workout_program;

pub use error::{DatabaseError, Result};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 10;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// Every connection to `sqlite::memory:` opens its own empty database,
    /// so in-memory callers should use [`Database::connect_with_pool_size`]
    /// with a pool size of 1.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Single-connection in-memory database with migrations applied.
    pub async fn in_memory() -> Result<Self> {
        let db = Self::connect_with_pool_size("sqlite::memory:", 1).await?;
        db.migrate().await?;
        Ok(db)
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Check that a connection can run a trivial query.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
