//! Fixture builders shared by unit tests.

use chrono::{TimeZone, Utc, Weekday};

use crate::types::{
    BodyPart, DailyRoutine, Exercise, ExerciseSet, MeasurementOptions, Phase, RoutineType,
};

pub fn exercise(id: &str) -> Exercise {
    Exercise {
        id: id.to_string(),
        user_id: "user-1".to_string(),
        name: format!("Exercise {id}"),
        description: None,
        body_parts: [BodyPart::Chest].into_iter().collect(),
        measurements: MeasurementOptions::new().with(MeasurementOptions::REPS),
        weight: true,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

pub fn set(id: &str, exercises: &[&str]) -> ExerciseSet {
    ExerciseSet {
        id: id.to_string(),
        user_id: "user-1".to_string(),
        name: format!("Set {id}"),
        description: None,
        exercises: exercises.iter().map(|e| e.to_string()).collect(),
        created_at: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
    }
}

pub fn routine(id: &str, sets: &[&str]) -> DailyRoutine {
    DailyRoutine {
        id: id.to_string(),
        user_id: "user-1".to_string(),
        name: format!("Routine {id}"),
        description: None,
        routine_type: RoutineType::TotalBody,
        sets: sets.iter().map(|s| s.to_string()).collect(),
        created_at: Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap(),
    }
}

pub fn phase(name: &str, weeks: &[u32], slots: &[(Weekday, &str)]) -> Phase {
    let mut phase = Phase {
        name: name.to_string(),
        weeks: weeks.iter().copied().collect(),
        ..Phase::default()
    };
    for (day, routine_id) in slots {
        phase
            .weekly_template
            .assign(*day, Some(routine_id.to_string()));
    }
    phase
}
