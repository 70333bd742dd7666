//! Domain model for the coach portal.
//!
//! This crate has no I/O. It defines:
//!
//! - the workout program graph ([`WorkoutProgram`] → [`Phase`] →
//!   [`DailyRoutine`] → [`ExerciseSet`] → [`Exercise`]) and active/completed
//!   program records
//! - [`resolve_references`], which materializes everything a program's
//!   phases reference
//! - [`ProgramWizard`], the step-by-step program composer
//! - [`Goals`] and their validation rules
//! - [`ClientProfile`] with partial updates
//!
//! # Example
//!
//! ```rust
//! use coach_core::{Library, ProgramMetadata, ProgramWizard};
//! use chrono::Weekday;
//!
//! let mut wizard = ProgramWizard::new();
//! wizard.set_metadata(ProgramMetadata {
//!     name: "Base Building".to_string(),
//!     description: None,
//!     total_weeks: 4,
//!     total_phases: 1,
//! })?;
//! wizard.rename_phase(0, "Foundation")?;
//! wizard.toggle_week(0, 1)?;
//! wizard.assign_routine(0, Weekday::Mon, Some("routine-id".to_string()))?;
//!
//! let program = wizard.prepare_submission(&Library::default())?;
//! assert_eq!(program.phases.len(), 1);
//! # Ok::<(), coach_core::WizardError>(())
//! ```

pub mod goals;
pub mod overview;
pub mod profile;
pub mod resolver;
pub mod types;
pub mod validation;
pub mod wizard;

#[cfg(test)]
mod testing;

pub use goals::{has_goals, BodyMeasurements, ConsistencyGoals, Goals, GoalsError};
pub use overview::{first_workout, FirstWorkout, SetOverview};
pub use profile::{ClientProfile, ProfileUpdate};
pub use resolver::{resolve_references, Library, ResolvedReferences};
pub use types::{
    ActiveProgram, BodyPart, CompletedProgram, DailyRoutine, Exercise, ExerciseSet,
    MeasurementOptions, NewDailyRoutine, NewExercise, NewExerciseSet, NewWorkoutProgram, Phase,
    RoutineType, WeeklyTemplate, WorkoutProgram, DAYS_PER_WEEK, WEEKDAYS,
};
pub use validation::ValidationError;
pub use wizard::{ProgramMetadata, ProgramWizard, WizardError, WizardState};
