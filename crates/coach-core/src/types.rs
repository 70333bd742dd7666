//! Entity types for the workout program graph.
//!
//! Programs reference daily routines, routines reference sets, and sets
//! reference exercises, all by id. A [`WorkoutProgram`] additionally carries a
//! resolved snapshot of every entity it references.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::goals::Goals;

/// Number of day slots in a weekly template.
pub const DAYS_PER_WEEK: usize = 7;

/// Weekday slots in template order (Sunday first).
pub const WEEKDAYS: [Weekday; DAYS_PER_WEEK] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Body part tags that can be attached to an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BodyPart {
    Arms,
    Biceps,
    Triceps,
    Shoulders,
    Chest,
    Back,
    Core,
    Abs,
    Obliques,
    Glutes,
    Hamstrings,
    Quadriceps,
    Calves,
    #[serde(rename = "Upper Body")]
    UpperBody,
    #[serde(rename = "Lower Body")]
    LowerBody,
    #[serde(rename = "Full Body")]
    FullBody,
    Cardio,
    Other,
}

impl BodyPart {
    /// All body parts, in the order they are offered to users.
    pub const ALL: [BodyPart; 18] = [
        BodyPart::Arms,
        BodyPart::Biceps,
        BodyPart::Triceps,
        BodyPart::Shoulders,
        BodyPart::Chest,
        BodyPart::Back,
        BodyPart::Core,
        BodyPart::Abs,
        BodyPart::Obliques,
        BodyPart::Glutes,
        BodyPart::Hamstrings,
        BodyPart::Quadriceps,
        BodyPart::Calves,
        BodyPart::UpperBody,
        BodyPart::LowerBody,
        BodyPart::FullBody,
        BodyPart::Cardio,
        BodyPart::Other,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            BodyPart::Arms => "Arms",
            BodyPart::Biceps => "Biceps",
            BodyPart::Triceps => "Triceps",
            BodyPart::Shoulders => "Shoulders",
            BodyPart::Chest => "Chest",
            BodyPart::Back => "Back",
            BodyPart::Core => "Core",
            BodyPart::Abs => "Abs",
            BodyPart::Obliques => "Obliques",
            BodyPart::Glutes => "Glutes",
            BodyPart::Hamstrings => "Hamstrings",
            BodyPart::Quadriceps => "Quadriceps",
            BodyPart::Calves => "Calves",
            BodyPart::UpperBody => "Upper Body",
            BodyPart::LowerBody => "Lower Body",
            BodyPart::FullBody => "Full Body",
            BodyPart::Cardio => "Cardio",
            BodyPart::Other => "Other",
        }
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Enabled measurement kinds for an exercise.
///
/// The well-known kinds are `reps`, `amap`, `timed` and `laps`; any other key
/// is accepted so new kinds can be added without a schema change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasurementOptions(BTreeMap<String, bool>);

impl MeasurementOptions {
    pub const REPS: &'static str = "reps";
    pub const AMAP: &'static str = "amap";
    pub const TIMED: &'static str = "timed";
    pub const LAPS: &'static str = "laps";

    /// Create an empty option map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper that enables a measurement kind.
    pub fn with(mut self, kind: &str) -> Self {
        self.set(kind, true);
        self
    }

    /// Set a measurement kind on or off.
    pub fn set(&mut self, kind: &str, enabled: bool) {
        self.0.insert(kind.to_string(), enabled);
    }

    /// Whether a measurement kind is enabled.
    pub fn is_enabled(&self, kind: &str) -> bool {
        self.0.get(kind).copied().unwrap_or(false)
    }

    /// Whether any measurement kind is enabled.
    pub fn any_enabled(&self) -> bool {
        self.0.values().any(|enabled| *enabled)
    }

    /// Enabled kinds in key order.
    pub fn enabled_kinds(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(kind, _)| kind.as_str())
    }
}

/// Category tag of a daily routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoutineType {
    #[serde(rename = "Upper Body")]
    UpperBody,
    #[serde(rename = "Lower Body")]
    LowerBody,
    Cardio,
    #[serde(rename = "Total Body")]
    TotalBody,
    Other,
}

impl RoutineType {
    /// Human-readable label, also used as the stored value.
    pub fn label(&self) -> &'static str {
        match self {
            RoutineType::UpperBody => "Upper Body",
            RoutineType::LowerBody => "Lower Body",
            RoutineType::Cardio => "Cardio",
            RoutineType::TotalBody => "Total Body",
            RoutineType::Other => "Other",
        }
    }
}

impl fmt::Display for RoutineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RoutineType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Upper Body" => Ok(RoutineType::UpperBody),
            "Lower Body" => Ok(RoutineType::LowerBody),
            "Cardio" => Ok(RoutineType::Cardio),
            "Total Body" => Ok(RoutineType::TotalBody),
            "Other" => Ok(RoutineType::Other),
            other => Err(format!("unknown routine type: {other}")),
        }
    }
}

/// A single exercise definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub body_parts: BTreeSet<BodyPart>,
    pub measurements: MeasurementOptions,
    /// Whether weight is tracked for this exercise.
    pub weight: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an exercise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewExercise {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub body_parts: BTreeSet<BodyPart>,
    #[serde(default)]
    pub measurements: MeasurementOptions,
    #[serde(default)]
    pub weight: bool,
}

/// An ordered group of exercises.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSet {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    /// Exercise ids; order is meaningful and duplicates are allowed.
    pub exercises: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewExerciseSet {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub exercises: Vec<String>,
}

/// A routine performed on one day, made of sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRoutine {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub routine_type: RoutineType,
    /// Set ids in display order.
    pub sets: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a daily routine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDailyRoutine {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub routine_type: RoutineType,
    #[serde(default)]
    pub sets: Vec<String>,
}

/// Seven weekday slots, each holding an optional daily routine id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyTemplate {
    pub days: [Option<String>; DAYS_PER_WEEK],
}

impl WeeklyTemplate {
    fn index(day: Weekday) -> usize {
        day.num_days_from_sunday() as usize
    }

    /// Routine id assigned to a weekday, if any.
    pub fn slot(&self, day: Weekday) -> Option<&str> {
        self.days[Self::index(day)].as_deref()
    }

    /// Assign (or clear, with `None`) the routine for a weekday.
    pub fn assign(&mut self, day: Weekday, routine_id: Option<String>) {
        self.days[Self::index(day)] = routine_id.filter(|id| !id.trim().is_empty());
    }

    /// Assigned routine ids in slot order, skipping rest days.
    pub fn routine_ids(&self) -> impl Iterator<Item = &str> {
        self.days.iter().filter_map(|slot| slot.as_deref())
    }

    /// First assigned slot in template order.
    pub fn first_assigned(&self) -> Option<(Weekday, &str)> {
        WEEKDAYS
            .iter()
            .find_map(|day| self.slot(*day).map(|id| (*day, id)))
    }

    /// Clear every slot whose routine id fails the predicate.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        for slot in self.days.iter_mut() {
            if slot.as_deref().is_some_and(|id| !keep(id)) {
                *slot = None;
            }
        }
    }
}

/// A group of program weeks sharing one weekly template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    /// Week numbers (1-based) covered by this phase.
    pub weeks: BTreeSet<u32>,
    pub weekly_template: WeeklyTemplate,
}

/// A stored workout program with its resolved snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutProgram {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub total_weeks: u32,
    pub total_phases: u32,
    pub phases: Vec<Phase>,
    pub daily_routines: Vec<DailyRoutine>,
    pub sets: Vec<ExerciseSet>,
    pub exercises: Vec<Exercise>,
    pub created_at: DateTime<Utc>,
}

/// A fully composed program ready to be persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWorkoutProgram {
    pub name: String,
    pub description: Option<String>,
    pub total_weeks: u32,
    pub total_phases: u32,
    pub phases: Vec<Phase>,
    pub daily_routines: Vec<DailyRoutine>,
    pub sets: Vec<ExerciseSet>,
    pub exercises: Vec<Exercise>,
}

/// The program a user is currently following.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveProgram {
    pub id: String,
    pub user_id: String,
    pub program_id: String,
    pub started_at: DateTime<Utc>,
    pub goals: Option<Goals>,
    pub photo_url: Option<String>,
}

/// Archived copy of an active program that was ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedProgram {
    pub id: String,
    pub user_id: String,
    pub program_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub goals: Option<Goals>,
    pub photo_url: Option<String>,
}
