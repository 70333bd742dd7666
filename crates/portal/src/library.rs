//! Joined view of a user's routines, sets and exercises.

use coach_core::{DailyRoutine, Exercise, ExerciseSet, Library};

use crate::feed::{Snapshot, Subscription};

/// Combines the three catalog feeds into a stream of [`Library`] values.
///
/// Nothing is yielded until every feed has delivered at least once; after
/// that each change to any feed yields a recomputed library.
#[derive(Debug)]
pub struct LibraryWatcher {
    routines: Subscription<DailyRoutine>,
    sets: Subscription<ExerciseSet>,
    exercises: Subscription<Exercise>,
    latest_routines: Option<Snapshot<DailyRoutine>>,
    latest_sets: Option<Snapshot<ExerciseSet>>,
    latest_exercises: Option<Snapshot<Exercise>>,
}

impl LibraryWatcher {
    pub fn new(
        routines: Subscription<DailyRoutine>,
        sets: Subscription<ExerciseSet>,
        exercises: Subscription<Exercise>,
    ) -> Self {
        Self {
            routines,
            sets,
            exercises,
            latest_routines: None,
            latest_sets: None,
            latest_exercises: None,
        }
    }

    /// Wait for the next complete library. `None` once a feed is gone.
    pub async fn next(&mut self) -> Option<Library> {
        loop {
            tokio::select! {
                routines = self.routines.next() => self.latest_routines = Some(routines?),
                sets = self.sets.next() => self.latest_sets = Some(sets?),
                exercises = self.exercises.next() => self.latest_exercises = Some(exercises?),
            }

            if let Some(library) = self.library() {
                return Some(library);
            }
        }
    }

    /// The joined library, if every feed has delivered.
    pub fn library(&self) -> Option<Library> {
        let routines = self.latest_routines.as_ref()?;
        let sets = self.latest_sets.as_ref()?;
        let exercises = self.latest_exercises.as_ref()?;
        Some(Library {
            daily_routines: routines.to_vec(),
            sets: sets.to_vec(),
            exercises: exercises.to_vec(),
        })
    }
}
