//! Exercise catalog: exercises, sets and daily routines.

use std::collections::HashSet;
use std::sync::Arc;

use coach_core::{
    DailyRoutine, Exercise, ExerciseSet, Library, NewDailyRoutine, NewExercise, NewExerciseSet,
    ValidationError,
};
use database::{daily_routine, exercise, exercise_set, Database};
use tracing::{debug, warn};

use crate::error::Result;
use crate::feed::{Feed, Subscription};
use crate::identity::Identity;
use crate::library::LibraryWatcher;

#[derive(Debug, Default)]
struct CatalogFeeds {
    exercises: Feed<Exercise>,
    sets: Feed<ExerciseSet>,
    routines: Feed<DailyRoutine>,
}

/// Owner-scoped catalog operations with live feeds.
#[derive(Debug, Clone)]
pub struct Catalog {
    database: Database,
    feeds: Arc<CatalogFeeds>,
}

/// Fail with `UnknownReference` for the first id not in `owned`.
fn check_owned<'a>(
    entity: &'static str,
    ids: &[String],
    owned: impl Iterator<Item = &'a str>,
) -> std::result::Result<(), ValidationError> {
    let owned: HashSet<&str> = owned.collect();
    match ids.iter().find(|id| !owned.contains(id.as_str())) {
        Some(id) => Err(ValidationError::UnknownReference {
            entity,
            id: id.clone(),
        }),
        None => Ok(()),
    }
}

impl Catalog {
    pub fn new(database: Database) -> Self {
        Self {
            database,
            feeds: Arc::new(CatalogFeeds::default()),
        }
    }

    /// Create an exercise after checking the form rules.
    pub async fn create_exercise(&self, identity: &Identity, new: &NewExercise) -> Result<Exercise> {
        new.validate()?;
        let owner = identity.user_id.as_str();

        let created = exercise::create_exercise(self.database.pool(), owner, new).await?;
        debug!("Created exercise {} for {}", created.id, owner);

        self.refresh_exercises(owner).await;
        Ok(created)
    }

    /// Create a set. Every exercise id must belong to the user.
    pub async fn create_set(&self, identity: &Identity, new: &NewExerciseSet) -> Result<ExerciseSet> {
        new.validate()?;
        let owner = identity.user_id.as_str();

        let exercises = exercise::list_exercises(self.database.pool(), owner).await?;
        check_owned("exercise", &new.exercises, exercises.iter().map(|e| e.id.as_str()))?;

        let created = exercise_set::create_set(self.database.pool(), owner, new).await?;
        debug!("Created set {} for {}", created.id, owner);

        self.refresh_sets(owner).await;
        Ok(created)
    }

    /// Create a daily routine. Every set id must belong to the user.
    pub async fn create_daily_routine(
        &self,
        identity: &Identity,
        new: &NewDailyRoutine,
    ) -> Result<DailyRoutine> {
        new.validate()?;
        let owner = identity.user_id.as_str();

        let sets = exercise_set::list_sets(self.database.pool(), owner).await?;
        check_owned("set", &new.sets, sets.iter().map(|s| s.id.as_str()))?;

        let created = daily_routine::create_routine(self.database.pool(), owner, new).await?;
        debug!("Created daily routine {} for {}", created.id, owner);

        self.refresh_routines(owner).await;
        Ok(created)
    }

    pub async fn list_exercises(&self, identity: &Identity) -> Result<Vec<Exercise>> {
        Ok(exercise::list_exercises(self.database.pool(), &identity.user_id).await?)
    }

    pub async fn list_sets(&self, identity: &Identity) -> Result<Vec<ExerciseSet>> {
        Ok(exercise_set::list_sets(self.database.pool(), &identity.user_id).await?)
    }

    pub async fn list_daily_routines(&self, identity: &Identity) -> Result<Vec<DailyRoutine>> {
        Ok(daily_routine::list_routines(self.database.pool(), &identity.user_id).await?)
    }

    /// Delete an exercise. Sets that list it keep the dangling id.
    pub async fn delete_exercise(&self, identity: &Identity, id: &str) -> Result<()> {
        exercise::delete_exercise(self.database.pool(), &identity.user_id, id).await?;
        self.refresh_exercises(&identity.user_id).await;
        Ok(())
    }

    /// Delete a set. Routines that list it keep the dangling id.
    pub async fn delete_set(&self, identity: &Identity, id: &str) -> Result<()> {
        exercise_set::delete_set(self.database.pool(), &identity.user_id, id).await?;
        self.refresh_sets(&identity.user_id).await;
        Ok(())
    }

    /// Delete a daily routine. Saved programs keep their snapshot.
    pub async fn delete_daily_routine(&self, identity: &Identity, id: &str) -> Result<()> {
        daily_routine::delete_routine(self.database.pool(), &identity.user_id, id).await?;
        self.refresh_routines(&identity.user_id).await;
        Ok(())
    }

    /// Load the user's current library in one go.
    pub async fn library(&self, identity: &Identity) -> Result<Library> {
        let pool = self.database.pool();
        let owner = identity.user_id.as_str();
        let (daily_routines, sets, exercises) = tokio::try_join!(
            daily_routine::list_routines(pool, owner),
            exercise_set::list_sets(pool, owner),
            exercise::list_exercises(pool, owner),
        )?;
        Ok(Library {
            daily_routines,
            sets,
            exercises,
        })
    }

    pub async fn watch_exercises(&self, identity: &Identity) -> Result<Subscription<Exercise>> {
        let pool = self.database.pool();
        let owner = identity.user_id.as_str();
        Ok(self
            .feeds
            .exercises
            .subscribe(owner, || exercise::list_exercises(pool, owner))
            .await?)
    }

    pub async fn watch_sets(&self, identity: &Identity) -> Result<Subscription<ExerciseSet>> {
        let pool = self.database.pool();
        let owner = identity.user_id.as_str();
        Ok(self
            .feeds
            .sets
            .subscribe(owner, || exercise_set::list_sets(pool, owner))
            .await?)
    }

    pub async fn watch_daily_routines(
        &self,
        identity: &Identity,
    ) -> Result<Subscription<DailyRoutine>> {
        let pool = self.database.pool();
        let owner = identity.user_id.as_str();
        Ok(self
            .feeds
            .routines
            .subscribe(owner, || daily_routine::list_routines(pool, owner))
            .await?)
    }

    /// Watch the joined library. Dropping the watcher unsubscribes all three feeds.
    pub async fn watch_library(&self, identity: &Identity) -> Result<LibraryWatcher> {
        let routines = self.watch_daily_routines(identity).await?;
        let sets = self.watch_sets(identity).await?;
        let exercises = self.watch_exercises(identity).await?;
        Ok(LibraryWatcher::new(routines, sets, exercises))
    }

    async fn refresh_exercises(&self, owner: &str) {
        let pool = self.database.pool();
        let refreshed = self
            .feeds
            .exercises
            .refresh(owner, || exercise::list_exercises(pool, owner))
            .await;
        if let Err(e) = refreshed {
            warn!("Failed to refresh exercise feed for {}: {}", owner, e);
        }
    }

    async fn refresh_sets(&self, owner: &str) {
        let pool = self.database.pool();
        let refreshed = self
            .feeds
            .sets
            .refresh(owner, || exercise_set::list_sets(pool, owner))
            .await;
        if let Err(e) = refreshed {
            warn!("Failed to refresh set feed for {}: {}", owner, e);
        }
    }

    async fn refresh_routines(&self, owner: &str) {
        let pool = self.database.pool();
        let refreshed = self
            .feeds
            .routines
            .refresh(owner, || daily_routine::list_routines(pool, owner))
            .await;
        if let Err(e) = refreshed {
            warn!("Failed to refresh routine feed for {}: {}", owner, e);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::PortalError;
    use coach_core::{BodyPart, MeasurementOptions, RoutineType};

    pub(crate) fn new_exercise(name: &str) -> NewExercise {
        NewExercise {
            name: name.to_string(),
            description: None,
            body_parts: [BodyPart::Chest].into_iter().collect(),
            measurements: MeasurementOptions::new().with(MeasurementOptions::REPS),
            weight: true,
        }
    }

    pub(crate) fn new_set(name: &str, exercises: &[&str]) -> NewExerciseSet {
        NewExerciseSet {
            name: name.to_string(),
            description: None,
            exercises: exercises.iter().map(|id| id.to_string()).collect(),
        }
    }

    pub(crate) fn new_routine(name: &str, sets: &[&str]) -> NewDailyRoutine {
        NewDailyRoutine {
            name: name.to_string(),
            description: None,
            routine_type: RoutineType::UpperBody,
            sets: sets.iter().map(|id| id.to_string()).collect(),
        }
    }

    async fn catalog() -> Catalog {
        Catalog::new(Database::in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn test_create_chain() {
        let catalog = catalog().await;
        let dana = Identity::new("user-1");

        let bench = catalog.create_exercise(&dana, &new_exercise("Bench")).await.unwrap();
        let push = catalog
            .create_set(&dana, &new_set("Push", &[bench.id.as_str(), bench.id.as_str()]))
            .await
            .unwrap();
        let day = catalog
            .create_daily_routine(&dana, &new_routine("Upper", &[push.id.as_str()]))
            .await
            .unwrap();

        let library = catalog.library(&dana).await.unwrap();
        assert_eq!(library.daily_routines, vec![day]);
        assert_eq!(library.sets[0].exercises.len(), 2);
        assert_eq!(library.exercises, vec![bench]);
    }

    #[tokio::test]
    async fn test_form_rules_reject_before_write() {
        let catalog = catalog().await;
        let dana = Identity::new("user-1");

        let mut nameless = new_exercise("");
        nameless.body_parts.clear();
        let err = catalog.create_exercise(&dana, &nameless).await.unwrap_err();
        assert_eq!(err.to_string(), "Exercise name is required.");

        let err = catalog.create_set(&dana, &new_set("Push", &[])).await.unwrap_err();
        assert_eq!(err.to_string(), "Please select at least one exercise.");

        assert!(catalog.list_exercises(&dana).await.unwrap().is_empty());
        assert!(catalog.list_sets(&dana).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_references_must_be_owned() {
        let catalog = catalog().await;
        let dana = Identity::new("user-1");
        let lee = Identity::new("user-2");

        let bench = catalog.create_exercise(&lee, &new_exercise("Bench")).await.unwrap();
        let err = catalog
            .create_set(&dana, &new_set("Push", &[bench.id.as_str()]))
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::ValidationFailed(_)));

        let err = catalog
            .create_daily_routine(&dana, &new_routine("Upper", &["missing-set"]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown set: missing-set");
    }

    #[tokio::test]
    async fn test_feed_republishes_after_write() {
        let catalog = catalog().await;
        let dana = Identity::new("user-1");

        let mut feed = catalog.watch_exercises(&dana).await.unwrap();
        assert!(feed.next().await.unwrap().is_empty());

        catalog.create_exercise(&dana, &new_exercise("Row")).await.unwrap();
        let snapshot = feed.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].name, "Row");

        catalog.delete_exercise(&dana, &snapshot[0].id).await.unwrap();
        assert!(feed.next().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_writes_end_on_full_snapshot() {
        let catalog = catalog().await;
        let dana = Identity::new("user-1");
        let feed = catalog.watch_exercises(&dana).await.unwrap();

        let squat = new_exercise("Squat");
        let lunge = new_exercise("Lunge");
        let (a, b) = tokio::join!(
            catalog.create_exercise(&dana, &squat),
            catalog.create_exercise(&dana, &lunge),
        );
        a.unwrap();
        b.unwrap();

        let mut names: Vec<_> = feed.current().iter().map(|e| e.name.clone()).collect();
        names.sort();
        assert_eq!(names, vec!["Lunge", "Squat"]);
    }

    #[tokio::test]
    async fn test_library_watcher_sees_new_routine() {
        let catalog = catalog().await;
        let dana = Identity::new("user-1");

        let mut watcher = catalog.watch_library(&dana).await.unwrap();
        let library = watcher.next().await.unwrap();
        assert!(library.daily_routines.is_empty());

        let day = catalog
            .create_daily_routine(&dana, &new_routine("Cardio", &[]))
            .await
            .unwrap();
        let library = watcher.next().await.unwrap();
        assert!(library.has_routine(&day.id));
    }
}
