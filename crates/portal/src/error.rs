//! Error types for portal operations.

use coach_core::{GoalsError, ValidationError, WizardError};
use database::DatabaseError;
use thiserror::Error;

use crate::blob::BlobError;

/// Errors surfaced to portal callers.
///
/// Messages of the non-backend variants are meant to be shown to the user
/// as they are.
#[derive(Debug, Error)]
pub enum PortalError {
    /// No signed-in user.
    #[error("You must be signed in.")]
    Unauthenticated,

    /// The requested record does not exist for this user.
    #[error("{0}")]
    NotFound(String),

    /// Input rejected before any write.
    #[error("{0}")]
    ValidationFailed(String),

    /// The user already has an active program.
    #[error("You already have an active program. End or abandon it first.")]
    AlreadyActive,

    /// Storage failure.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Failures of the storage collaborators.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Database(DatabaseError),

    #[error(transparent)]
    Blob(BlobError),
}

impl PortalError {
    /// Shorthand for a not-found error with a display message.
    pub fn not_found(message: impl Into<String>) -> Self {
        PortalError::NotFound(message.into())
    }

    /// Whether this error came from a storage collaborator.
    pub fn is_backend(&self) -> bool {
        matches!(self, PortalError::Backend(_))
    }
}

fn entity_label(entity: &str) -> &str {
    match entity {
        "WorkoutProgram" => "Workout Program",
        "ActiveProgram" => "Active program",
        "CompletedProgram" => "Completed program",
        "DailyRoutine" => "Daily routine",
        "ClientProfile" => "Profile",
        other => other,
    }
}

impl From<DatabaseError> for PortalError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::NotFound { entity, .. } => {
                PortalError::NotFound(format!("{} not found.", entity_label(entity)))
            }
            DatabaseError::AlreadyExists {
                entity: "ActiveProgram",
                ..
            } => PortalError::AlreadyActive,
            other => PortalError::Backend(BackendError::Database(other)),
        }
    }
}

impl From<BlobError> for PortalError {
    fn from(e: BlobError) -> Self {
        PortalError::Backend(BackendError::Blob(e))
    }
}

impl From<ValidationError> for PortalError {
    fn from(e: ValidationError) -> Self {
        PortalError::ValidationFailed(e.to_string())
    }
}

impl From<GoalsError> for PortalError {
    fn from(e: GoalsError) -> Self {
        PortalError::ValidationFailed(e.to_string())
    }
}

impl From<WizardError> for PortalError {
    fn from(e: WizardError) -> Self {
        PortalError::ValidationFailed(e.to_string())
    }
}

/// Result type for portal operations.
pub type Result<T> = std::result::Result<T, PortalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_errors_map_to_taxonomy() {
        let err: PortalError = DatabaseError::NotFound {
            entity: "WorkoutProgram",
            id: "p-1".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Workout Program not found.");

        let err: PortalError = DatabaseError::AlreadyExists {
            entity: "ActiveProgram",
            id: "user-1".to_string(),
        }
        .into();
        assert!(matches!(err, PortalError::AlreadyActive));

        let err: PortalError = DatabaseError::AlreadyExists {
            entity: "Exercise",
            id: "e-1".to_string(),
        }
        .into();
        assert!(err.is_backend());
    }

    #[test]
    fn test_validation_errors_keep_message() {
        let err: PortalError = WizardError::PhaseMissingName { phase: 2 }.into();
        assert_eq!(err.to_string(), "Phase 2 is missing a name.");
    }
}
