//! Saving and browsing workout programs.

use std::sync::Arc;

use coach_core::{ProgramWizard, WorkoutProgram};
use database::{workout_program, Database};
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::error::Result;
use crate::feed::{Feed, Subscription};
use crate::identity::Identity;

/// Program repository operations for the signed-in user.
#[derive(Debug, Clone)]
pub struct Programs {
    database: Database,
    catalog: Catalog,
    feed: Arc<Feed<WorkoutProgram>>,
}

impl Programs {
    pub fn new(database: Database, catalog: Catalog) -> Self {
        Self {
            database,
            catalog,
            feed: Arc::new(Feed::new()),
        }
    }

    /// Persist the wizard's program and move it to the submitted step.
    ///
    /// The snapshot is resolved against the user's library as it is right
    /// now. If validation or the write fails the wizard stays where it was.
    pub async fn submit_wizard(
        &self,
        identity: &Identity,
        wizard: &mut ProgramWizard,
    ) -> Result<WorkoutProgram> {
        let owner = identity.user_id.as_str();
        let library = self.catalog.library(identity).await?;
        let new = wizard.prepare_submission(&library)?;

        let program = workout_program::create_program(self.database.pool(), owner, &new).await?;
        wizard.mark_submitted(program.id.clone())?;
        info!(
            "Saved program {} ({} routines, {} sets, {} exercises) for {}",
            program.id,
            program.daily_routines.len(),
            program.sets.len(),
            program.exercises.len(),
            owner
        );

        self.refresh(owner).await;
        Ok(program)
    }

    pub async fn list_programs(&self, identity: &Identity) -> Result<Vec<WorkoutProgram>> {
        Ok(workout_program::list_programs(self.database.pool(), &identity.user_id).await?)
    }

    pub async fn get_program(&self, identity: &Identity, id: &str) -> Result<WorkoutProgram> {
        Ok(workout_program::get_program(self.database.pool(), &identity.user_id, id).await?)
    }

    /// Delete a program. Active and completed records that point at it stay.
    pub async fn delete_program(&self, identity: &Identity, id: &str) -> Result<()> {
        workout_program::delete_program(self.database.pool(), &identity.user_id, id).await?;
        info!("Deleted program {} for {}", id, identity.user_id);
        self.refresh(&identity.user_id).await;
        Ok(())
    }

    pub async fn watch_programs(&self, identity: &Identity) -> Result<Subscription<WorkoutProgram>> {
        let pool = self.database.pool();
        let owner = identity.user_id.as_str();
        Ok(self
            .feed
            .subscribe(owner, || workout_program::list_programs(pool, owner))
            .await?)
    }

    async fn refresh(&self, owner: &str) {
        let pool = self.database.pool();
        let refreshed = self
            .feed
            .refresh(owner, || workout_program::list_programs(pool, owner))
            .await;
        if let Err(e) = refreshed {
            warn!("Failed to refresh program feed for {}: {}", owner, e);
        }
    }
}
