//! Display summary of where a program begins.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::types::{DailyRoutine, WorkoutProgram};

/// Shown in place of an exercise missing from the snapshot.
pub const UNKNOWN_EXERCISE: &str = "Unknown Exercise";

/// A set with its exercise names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetOverview {
    pub set_id: String,
    pub name: String,
    pub exercises: Vec<String>,
}

/// The first scheduled workout of a program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirstWorkout {
    pub phase_name: String,
    pub week: Option<u32>,
    pub weekday: Weekday,
    pub routine: DailyRoutine,
    pub sets: Vec<SetOverview>,
}

/// Locate the first workout: the first phase, its earliest week, and the
/// first weekday with a routine. Returns `None` for an empty first phase or
/// when the routine is missing from the snapshot.
pub fn first_workout(program: &WorkoutProgram) -> Option<FirstWorkout> {
    let phase = program.phases.first()?;
    let (weekday, routine_id) = phase.weekly_template.first_assigned()?;
    let routine = program.daily_routines.iter().find(|r| r.id == routine_id)?;

    let sets = routine
        .sets
        .iter()
        .filter_map(|set_id| program.sets.iter().find(|s| &s.id == set_id))
        .map(|set| SetOverview {
            set_id: set.id.clone(),
            name: set.name.clone(),
            exercises: set
                .exercises
                .iter()
                .map(|exercise_id| {
                    program
                        .exercises
                        .iter()
                        .find(|e| &e.id == exercise_id)
                        .map_or_else(|| UNKNOWN_EXERCISE.to_string(), |e| e.name.clone())
                })
                .collect(),
        })
        .collect();

    Some(FirstWorkout {
        phase_name: phase.name.clone(),
        week: phase.weeks.first().copied(),
        weekday,
        routine: routine.clone(),
        sets,
    })
}
