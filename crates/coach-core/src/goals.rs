//! Baseline goals and body measurements recorded for an active program.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body measurements in inches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyMeasurements {
    pub biceps: f64,
    pub triceps: f64,
    pub chest: f64,
    pub waist: f64,
    pub hips: f64,
    pub thighs: f64,
    pub calves: f64,
}

impl BodyMeasurements {
    /// The same value for every measurement.
    pub fn uniform(value: f64) -> Self {
        Self {
            biceps: value,
            triceps: value,
            chest: value,
            waist: value,
            hips: value,
            thighs: value,
            calves: value,
        }
    }

    /// Named measurements in declaration order.
    pub fn entries(&self) -> [(&'static str, f64); 7] {
        [
            ("biceps", self.biceps),
            ("triceps", self.triceps),
            ("chest", self.chest),
            ("waist", self.waist),
            ("hips", self.hips),
            ("thighs", self.thighs),
            ("calves", self.calves),
        ]
    }
}

/// Training consistency targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyGoals {
    /// Target share of scheduled workouts to complete, 1–100.
    pub percentage_complete: u32,
    /// Target training days per week, 1–7.
    pub days_per_week: u32,
}

/// Goals captured when a program starts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Goals {
    /// Current weight in pounds.
    pub current_weight: f64,
    /// Current body fat percentage.
    pub current_body_fat: f64,
    pub body_measurements: BodyMeasurements,
    pub achievement_goals: String,
    pub consistency_goals: ConsistencyGoals,
}

/// The first goal rule a submission violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GoalsError {
    #[error("Please fill in all required fields with valid values: current weight must be greater than 0.")]
    CurrentWeight,

    #[error("Please fill in all required fields with valid values: body fat must be greater than 0 and at most 100.")]
    CurrentBodyFat,

    #[error("Please fill in all required fields with valid values: completion percentage must be between 1 and 100.")]
    PercentageComplete,

    #[error("Please fill in all required fields with valid values: days per week must be between 1 and 7.")]
    DaysPerWeek,

    #[error("Please fill in all required fields with valid values: {0} measurement must be greater than 0.")]
    Measurement(&'static str),

    #[error("Please fill in all required fields with valid values: achievement goals cannot be empty.")]
    AchievementGoals,
}

// NaN and infinity never count as positive.
fn positive(value: f64) -> bool {
    value > 0.0 && value.is_finite()
}

impl Goals {
    /// Check every rule in declaration order and report the first failure.
    pub fn validate(&self) -> Result<(), GoalsError> {
        if !positive(self.current_weight) {
            return Err(GoalsError::CurrentWeight);
        }
        if !positive(self.current_body_fat) || self.current_body_fat > 100.0 {
            return Err(GoalsError::CurrentBodyFat);
        }

        let consistency = &self.consistency_goals;
        if !(1..=100).contains(&consistency.percentage_complete) {
            return Err(GoalsError::PercentageComplete);
        }
        if !(1..=7).contains(&consistency.days_per_week) {
            return Err(GoalsError::DaysPerWeek);
        }

        if let Some((name, _)) = self
            .body_measurements
            .entries()
            .into_iter()
            .find(|(_, value)| !positive(*value))
        {
            return Err(GoalsError::Measurement(name));
        }

        if self.achievement_goals.trim().is_empty() {
            return Err(GoalsError::AchievementGoals);
        }

        Ok(())
    }

    /// Whether goals have been filled in enough to begin training.
    pub fn is_set(&self) -> bool {
        self.current_weight > 0.0
            && self.current_body_fat > 0.0
            && !self.achievement_goals.trim().is_empty()
            && self.consistency_goals.percentage_complete > 0
            && self.consistency_goals.days_per_week > 0
    }
}

/// `true` when goals exist and are set.
pub fn has_goals(goals: Option<&Goals>) -> bool {
    goals.is_some_and(Goals::is_set)
}
