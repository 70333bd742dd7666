//! Reference resolution from program phases to full entities.
//!
//! Phases reference daily routines by id, routines reference sets, and sets
//! reference exercises. Resolution walks that chain and materializes every
//! reachable entity from the caller's collections. Ids with no match are
//! dropped rather than treated as errors: the entity may have been deleted or
//! its collection may not be loaded yet.

use std::collections::HashMap;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{DailyRoutine, Exercise, ExerciseSet, Phase};

/// A user's current routines, sets and exercises.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Library {
    pub daily_routines: Vec<DailyRoutine>,
    pub sets: Vec<ExerciseSet>,
    pub exercises: Vec<Exercise>,
}

impl Library {
    /// Resolve the entities referenced by `phases` against this library.
    pub fn resolve(&self, phases: &[Phase]) -> ResolvedReferences {
        resolve_references(phases, &self.daily_routines, &self.sets, &self.exercises)
    }

    /// Whether a routine with this id is present.
    pub fn has_routine(&self, id: &str) -> bool {
        self.daily_routines.iter().any(|routine| routine.id == id)
    }
}

/// Entities reachable from a program's phases, each in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedReferences {
    pub daily_routines: Vec<DailyRoutine>,
    pub sets: Vec<ExerciseSet>,
    pub exercises: Vec<Exercise>,
}

impl ResolvedReferences {
    /// Look up a resolved routine.
    pub fn routine(&self, id: &str) -> Option<&DailyRoutine> {
        self.daily_routines.iter().find(|routine| routine.id == id)
    }

    /// Look up a resolved set.
    pub fn set(&self, id: &str) -> Option<&ExerciseSet> {
        self.sets.iter().find(|set| set.id == id)
    }

    /// Look up a resolved exercise.
    pub fn exercise(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|exercise| exercise.id == id)
    }
}

fn index_by_id<'a, T>(items: &'a [T], id: impl Fn(&T) -> &str) -> HashMap<&'a str, &'a T> {
    let mut index = HashMap::with_capacity(items.len());
    for item in items {
        // First occurrence wins if a collection carries duplicate ids.
        index.entry(id(item)).or_insert(item);
    }
    index
}

/// Compute the transitive closure of ids referenced by `phases`.
///
/// Routine ids come from every phase's weekly template (rest days skipped),
/// set ids from those routines, and exercise ids from those sets. Each id
/// appears at most once in the output, at the position it was first
/// discovered. Only entities present in the supplied collections are returned.
pub fn resolve_references(
    phases: &[Phase],
    routines: &[DailyRoutine],
    sets: &[ExerciseSet],
    exercises: &[Exercise],
) -> ResolvedReferences {
    let routine_index = index_by_id(routines, |r| r.id.as_str());
    let set_index = index_by_id(sets, |s| s.id.as_str());
    let exercise_index = index_by_id(exercises, |e| e.id.as_str());

    let routine_ids: IndexSet<&str> = phases
        .iter()
        .flat_map(|phase| phase.weekly_template.routine_ids())
        .collect();

    let resolved_routines: Vec<&DailyRoutine> = routine_ids
        .iter()
        .filter_map(|id| routine_index.get(id).copied())
        .collect();

    let set_ids: IndexSet<&str> = resolved_routines
        .iter()
        .flat_map(|routine| routine.sets.iter().map(String::as_str))
        .collect();

    let resolved_sets: Vec<&ExerciseSet> = set_ids
        .iter()
        .filter_map(|id| set_index.get(id).copied())
        .collect();

    let exercise_ids: IndexSet<&str> = resolved_sets
        .iter()
        .flat_map(|set| set.exercises.iter().map(String::as_str))
        .collect();

    let resolved_exercises: Vec<&Exercise> = exercise_ids
        .iter()
        .filter_map(|id| exercise_index.get(id).copied())
        .collect();

    let dropped = (routine_ids.len() - resolved_routines.len())
        + (set_ids.len() - resolved_sets.len())
        + (exercise_ids.len() - resolved_exercises.len());
    if dropped > 0 {
        debug!(dropped, "Dropped unresolved references");
    }

    ResolvedReferences {
        daily_routines: resolved_routines.into_iter().cloned().collect(),
        sets: resolved_sets.into_iter().cloned().collect(),
        exercises: resolved_exercises.into_iter().cloned().collect(),
    }
}
