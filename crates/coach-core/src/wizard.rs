//! Multi-step composition of a workout program.
//!
//! The wizard moves through three steps:
//!
//! ```text
//! MetadataEntry ──set_metadata──▶ PhaseEntry ──mark_submitted──▶ Submitted
//! ```
//!
//! In `PhaseEntry` there is exactly one phase editor per declared phase.
//! [`ProgramWizard::prepare_submission`] validates the phases and builds the
//! denormalized program; the caller persists it and only then calls
//! [`ProgramWizard::mark_submitted`], so a failed write leaves the wizard
//! editable.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::resolver::Library;
use crate::types::{NewWorkoutProgram, Phase};

/// Program-level fields collected in the first step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramMetadata {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub total_weeks: u32,
    pub total_phases: u32,
}

impl ProgramMetadata {
    /// Validate the metadata step.
    pub fn validate(&self) -> Result<(), WizardError> {
        if self.name.trim().is_empty() {
            return Err(WizardError::ProgramNameRequired);
        }
        if self.total_weeks < 1 {
            return Err(WizardError::TotalWeeks);
        }
        if self.total_phases < 1 {
            return Err(WizardError::TotalPhases);
        }
        if self.total_phases > self.total_weeks {
            return Err(WizardError::TooManyPhases {
                total_phases: self.total_phases,
                total_weeks: self.total_weeks,
            });
        }
        Ok(())
    }
}

/// Errors reported by the wizard. Phase numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("Program name is required.")]
    ProgramNameRequired,

    #[error("Total weeks must be at least 1.")]
    TotalWeeks,

    #[error("Total phases must be at least 1.")]
    TotalPhases,

    #[error("Total phases ({total_phases}) cannot exceed total weeks ({total_weeks}).")]
    TooManyPhases { total_phases: u32, total_weeks: u32 },

    #[error("Expected {expected} phases but received {actual}.")]
    PhaseCountMismatch { expected: u32, actual: usize },

    #[error("Phase {phase} does not exist.")]
    UnknownPhase { phase: usize },

    #[error("Week {week} is outside the program (weeks 1-{total_weeks}).")]
    WeekOutOfRange { week: u32, total_weeks: u32 },

    #[error("Phase {phase} is missing a name.")]
    PhaseMissingName { phase: usize },

    #[error("Phase {phase} has no weeks selected.")]
    PhaseMissingWeeks { phase: usize },

    #[error("Cannot {action} at this step of program creation.")]
    InvalidStep { action: &'static str },
}

/// Current wizard step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardState {
    MetadataEntry,
    PhaseEntry {
        metadata: ProgramMetadata,
        phases: Vec<Phase>,
    },
    Submitted {
        program_id: String,
    },
}

/// State machine for composing a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramWizard {
    state: WizardState,
}

impl Default for ProgramWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramWizard {
    /// Start a new wizard at the metadata step.
    pub fn new() -> Self {
        Self {
            state: WizardState::MetadataEntry,
        }
    }

    /// Build a wizard in the phase step from complete drafts.
    ///
    /// Used when all phase editors are filled in by a remote client at once.
    pub fn from_drafts(metadata: ProgramMetadata, phases: Vec<Phase>) -> Result<Self, WizardError> {
        let mut wizard = Self::new();
        wizard.set_metadata(metadata)?;

        let expected = wizard.metadata().map_or(0, |m| m.total_phases);
        if phases.len() != expected as usize {
            return Err(WizardError::PhaseCountMismatch {
                expected,
                actual: phases.len(),
            });
        }

        for (index, phase) in phases.into_iter().enumerate() {
            wizard.replace_phase(index, phase)?;
        }
        Ok(wizard)
    }

    /// Current step.
    pub fn state(&self) -> &WizardState {
        &self.state
    }

    /// Metadata, once the first step is complete.
    pub fn metadata(&self) -> Option<&ProgramMetadata> {
        match &self.state {
            WizardState::PhaseEntry { metadata, .. } => Some(metadata),
            _ => None,
        }
    }

    /// Phase drafts, empty outside the phase step.
    pub fn phases(&self) -> &[Phase] {
        match &self.state {
            WizardState::PhaseEntry { phases, .. } => phases,
            _ => &[],
        }
    }

    /// Whether the program has been persisted.
    pub fn is_submitted(&self) -> bool {
        matches!(self.state, WizardState::Submitted { .. })
    }

    /// Complete the metadata step and open one blank editor per phase.
    pub fn set_metadata(&mut self, metadata: ProgramMetadata) -> Result<(), WizardError> {
        if !matches!(self.state, WizardState::MetadataEntry) {
            return Err(WizardError::InvalidStep {
                action: "enter program details",
            });
        }
        metadata.validate()?;

        let phases = vec![Phase::default(); metadata.total_phases as usize];
        self.state = WizardState::PhaseEntry { metadata, phases };
        Ok(())
    }

    fn editor(&mut self, index: usize, action: &'static str) -> Result<(&mut Phase, u32), WizardError> {
        match &mut self.state {
            WizardState::PhaseEntry { metadata, phases } => {
                let total_weeks = metadata.total_weeks;
                phases
                    .get_mut(index)
                    .map(|phase| (phase, total_weeks))
                    .ok_or(WizardError::UnknownPhase { phase: index + 1 })
            }
            _ => Err(WizardError::InvalidStep { action }),
        }
    }

    /// Set the name of phase `index` (0-based).
    pub fn rename_phase(&mut self, index: usize, name: impl Into<String>) -> Result<(), WizardError> {
        let (phase, _) = self.editor(index, "edit a phase")?;
        phase.name = name.into();
        Ok(())
    }

    /// Select or deselect a week for phase `index`.
    pub fn toggle_week(&mut self, index: usize, week: u32) -> Result<(), WizardError> {
        let (phase, total_weeks) = self.editor(index, "edit a phase")?;
        if week < 1 || week > total_weeks {
            return Err(WizardError::WeekOutOfRange { week, total_weeks });
        }
        if !phase.weeks.remove(&week) {
            phase.weeks.insert(week);
        }
        Ok(())
    }

    /// Assign a routine to a weekday of phase `index`, or clear it with `None`.
    pub fn assign_routine(
        &mut self,
        index: usize,
        day: Weekday,
        routine_id: Option<String>,
    ) -> Result<(), WizardError> {
        let (phase, _) = self.editor(index, "edit a phase")?;
        phase.weekly_template.assign(day, routine_id);
        Ok(())
    }

    /// Replace the whole draft of phase `index`.
    pub fn replace_phase(&mut self, index: usize, draft: Phase) -> Result<(), WizardError> {
        let (phase, total_weeks) = self.editor(index, "edit a phase")?;
        if let Some(week) = draft.weeks.iter().find(|w| **w < 1 || **w > total_weeks) {
            return Err(WizardError::WeekOutOfRange {
                week: *week,
                total_weeks,
            });
        }
        *phase = draft;
        Ok(())
    }

    /// Validate the phases and assemble the program snapshot.
    ///
    /// Stops at the first phase with a blank name or no weeks. Weekday slots
    /// pointing at routines missing from `library` are cleared so the stored
    /// phases only reference routines in the snapshot.
    pub fn prepare_submission(&self, library: &Library) -> Result<NewWorkoutProgram, WizardError> {
        let WizardState::PhaseEntry { metadata, phases } = &self.state else {
            return Err(WizardError::InvalidStep {
                action: "save the program",
            });
        };

        for (index, phase) in phases.iter().enumerate() {
            if phase.name.trim().is_empty() {
                return Err(WizardError::PhaseMissingName { phase: index + 1 });
            }
            if phase.weeks.is_empty() {
                return Err(WizardError::PhaseMissingWeeks { phase: index + 1 });
            }
        }

        let phases: Vec<Phase> = phases
            .iter()
            .enumerate()
            .map(|(index, phase)| {
                let mut phase = phase.clone();
                phase.name = phase.name.trim().to_string();
                phase.weekly_template.retain(|id| {
                    let known = library.has_routine(id);
                    if !known {
                        warn!(phase = index + 1, routine_id = id, "Clearing unknown routine from template");
                    }
                    known
                });
                phase
            })
            .collect();

        let resolved = library.resolve(&phases);

        Ok(NewWorkoutProgram {
            name: metadata.name.trim().to_string(),
            description: metadata
                .description
                .as_ref()
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            total_weeks: metadata.total_weeks,
            total_phases: metadata.total_phases,
            phases,
            daily_routines: resolved.daily_routines,
            sets: resolved.sets,
            exercises: resolved.exercises,
        })
    }

    /// Record that the program was persisted.
    pub fn mark_submitted(&mut self, program_id: impl Into<String>) -> Result<(), WizardError> {
        if !matches!(self.state, WizardState::PhaseEntry { .. }) {
            return Err(WizardError::InvalidStep {
                action: "finish program creation",
            });
        }
        self.state = WizardState::Submitted {
            program_id: program_id.into(),
        };
        Ok(())
    }
}
