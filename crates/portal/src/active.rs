//! Active program flow: start, goals, abandon and end.

use std::sync::Arc;

use coach_core::{
    first_workout, has_goals, ActiveProgram, CompletedProgram, FirstWorkout, Goals, WorkoutProgram,
};
use database::{active_program, completed_program, workout_program, Database, DatabaseError};
use serde::Serialize;
use tracing::{debug, warn};

use crate::blob::{photo_path, BlobStore};
use crate::error::{PortalError, Result};
use crate::identity::Identity;

const NO_ACTIVE_PROGRAM: &str = "No active program.";
const INVALID_PHOTO_NAME: &str = "Invalid photo file name.";

/// A progress photo to store with the goals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Goals form contents.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalsSubmission {
    pub goals: Goals,
    pub photo: Option<Photo>,
}

/// Everything the active program page shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveProgramView {
    pub active: ActiveProgram,
    pub program: WorkoutProgram,
    pub has_goals: bool,
    pub first_workout: Option<FirstWorkout>,
}

fn no_active(e: DatabaseError) -> PortalError {
    match e {
        DatabaseError::NotFound { .. } => PortalError::not_found(NO_ACTIVE_PROGRAM),
        other => other.into(),
    }
}

/// Lifecycle of the user's single active program.
#[derive(Clone)]
pub struct ActiveFlow {
    database: Database,
    blobs: Arc<dyn BlobStore>,
}

impl ActiveFlow {
    pub fn new(database: Database, blobs: Arc<dyn BlobStore>) -> Self {
        Self { database, blobs }
    }

    /// Make one of the user's programs active.
    ///
    /// Fails with `AlreadyActive` while another program is active.
    pub async fn start_program(&self, identity: &Identity, program_id: &str) -> Result<ActiveProgram> {
        Ok(active_program::start_program(self.database.pool(), &identity.user_id, program_id).await?)
    }

    /// Validate and record goals, uploading the photo first when present.
    ///
    /// Invalid goals are rejected before anything is written.
    pub async fn set_goals(
        &self,
        identity: &Identity,
        submission: GoalsSubmission,
    ) -> Result<ActiveProgram> {
        submission.goals.validate()?;
        let owner = identity.user_id.as_str();

        let mut active = active_program::get_active(self.database.pool(), owner)
            .await?
            .ok_or_else(|| PortalError::not_found(NO_ACTIVE_PROGRAM))?;

        let (stored_path, photo_url) = match &submission.photo {
            Some(photo) => {
                let path = Some(&photo.filename)
                    .filter(|name| !name.contains('/'))
                    .and_then(|name| photo_path(owner, &active.id, name).ok())
                    .ok_or_else(|| PortalError::ValidationFailed(INVALID_PHOTO_NAME.to_string()))?;
                self.blobs.upload(&path, &photo.bytes).await?;
                debug!("Uploaded progress photo {}", path);
                match self.blobs.download_url(&path).await {
                    Ok(url) => (Some(path), Some(url)),
                    Err(e) => {
                        self.discard_photo(&path).await;
                        return Err(e.into());
                    }
                }
            }
            None => (None, None),
        };

        let saved = active_program::set_goals(
            self.database.pool(),
            owner,
            &active.id,
            &submission.goals,
            photo_url.as_deref(),
        )
        .await;
        if let Err(e) = saved {
            if let Some(path) = &stored_path {
                self.discard_photo(path).await;
            }
            return Err(no_active(e));
        }

        active.goals = Some(submission.goals);
        active.photo_url = photo_url;
        Ok(active)
    }

    /// Remove a photo whose goals were never saved.
    async fn discard_photo(&self, path: &str) {
        match self.blobs.delete(path).await {
            Ok(()) => debug!("Discarded unsaved progress photo {}", path),
            Err(e) => warn!("Failed to discard progress photo {}: {}", path, e),
        }
    }

    /// Drop the active program without archiving it.
    pub async fn abandon(&self, identity: &Identity) -> Result<()> {
        active_program::abandon(self.database.pool(), &identity.user_id)
            .await
            .map_err(no_active)?;
        Ok(())
    }

    /// Archive the active program. The archive insert and the removal of the
    /// active record commit together.
    pub async fn end(&self, identity: &Identity) -> Result<CompletedProgram> {
        Ok(active_program::end(self.database.pool(), &identity.user_id)
            .await
            .map_err(no_active)?)
    }

    /// The active program with its workout program, or `None` when inactive.
    pub async fn active_program(&self, identity: &Identity) -> Result<Option<ActiveProgramView>> {
        let owner = identity.user_id.as_str();
        let Some(active) = active_program::get_active(self.database.pool(), owner).await? else {
            return Ok(None);
        };

        let program = workout_program::find_program(self.database.pool(), owner, &active.program_id)
            .await?
            .ok_or_else(|| PortalError::not_found("Workout Program not found."))?;

        debug!("Loaded active program {} for {}", program.id, owner);
        Ok(Some(ActiveProgramView {
            has_goals: has_goals(active.goals.as_ref()),
            first_workout: first_workout(&program),
            active,
            program,
        }))
    }

    /// Archived programs, most recently ended first.
    pub async fn completed_programs(&self, identity: &Identity) -> Result<Vec<CompletedProgram>> {
        Ok(completed_program::list_completed(self.database.pool(), &identity.user_id).await?)
    }

    /// One archived program.
    pub async fn completed_program(&self, identity: &Identity, id: &str) -> Result<CompletedProgram> {
        Ok(completed_program::get_completed(self.database.pool(), &identity.user_id, id).await?)
    }
}
