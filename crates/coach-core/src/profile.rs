//! Client profile model and partial updates.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{validate_email, validate_length, ValidationError, MAX_NAME_LENGTH};

/// Personal details kept for each client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientProfile {
    pub user_id: String,
    pub full_name: String,
    /// ISO date (`YYYY-MM-DD`), or empty when unknown.
    pub date_of_birth: String,
    pub gender: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Height in inches.
    pub height: f64,
    /// Weight in pounds.
    pub weight: f64,
    pub medical_history: Option<String>,
    pub fitness_goals: Option<String>,
    pub activity_level: String,
    pub preferred_workout_times: Option<String>,
    pub dietary_preferences: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClientProfile {
    /// A blank profile seeded from the signed-in identity.
    pub fn new_default(
        user_id: impl Into<String>,
        display_name: Option<&str>,
        email: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            full_name: display_name.unwrap_or_default().to_string(),
            date_of_birth: String::new(),
            gender: String::new(),
            email: email.unwrap_or_default().to_string(),
            phone: None,
            address: None,
            height: 0.0,
            weight: 0.0,
            medical_history: None,
            fitness_goals: None,
            activity_level: String::new(),
            preferred_workout_times: None,
            dietary_preferences: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge the supplied fields into this profile.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *target = value.clone();
            }
        }
        fn set_opt(target: &mut Option<String>, value: &Option<String>) {
            if let Some(value) = value {
                *target = Some(value.clone()).filter(|v| !v.is_empty());
            }
        }

        set(&mut self.full_name, &update.full_name);
        set(&mut self.date_of_birth, &update.date_of_birth);
        set(&mut self.gender, &update.gender);
        set(&mut self.email, &update.email);
        set_opt(&mut self.phone, &update.phone);
        set_opt(&mut self.address, &update.address);
        set(&mut self.height, &update.height);
        set(&mut self.weight, &update.weight);
        set_opt(&mut self.medical_history, &update.medical_history);
        set_opt(&mut self.fitness_goals, &update.fitness_goals);
        set(&mut self.activity_level, &update.activity_level);
        set_opt(&mut self.preferred_workout_times, &update.preferred_workout_times);
        set_opt(&mut self.dietary_preferences, &update.dietary_preferences);
    }

    /// Age in whole years on `today`, if the date of birth parses.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        let birth = NaiveDate::parse_from_str(self.date_of_birth.trim(), "%Y-%m-%d").ok()?;
        if birth > today {
            return None;
        }
        let mut age = today.year() - birth.year();
        if (today.month(), today.day()) < (birth.month(), birth.day()) {
            age -= 1;
        }
        u32::try_from(age).ok()
    }
}

/// A partial profile update; `None` leaves a field untouched.
///
/// For optional text fields an empty string clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub medical_history: Option<String>,
    pub fitness_goals: Option<String>,
    pub activity_level: Option<String>,
    pub preferred_workout_times: Option<String>,
    pub dietary_preferences: Option<String>,
}

impl ProfileUpdate {
    /// Whether the update carries no fields.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Validate the supplied fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(email) = self.email.as_deref() {
            validate_email(email)?;
        }
        if let Some(name) = self.full_name.as_deref() {
            validate_length("Full name", name.trim(), MAX_NAME_LENGTH)?;
        }
        if let Some(dob) = self.date_of_birth.as_deref() {
            let dob = dob.trim();
            if !dob.is_empty() && NaiveDate::parse_from_str(dob, "%Y-%m-%d").is_err() {
                return Err(ValidationError::InvalidDate("Date of birth"));
            }
        }
        if self.height.is_some_and(|h| h < 0.0) {
            return Err(ValidationError::Negative("Height"));
        }
        if self.weight.is_some_and(|w| w < 0.0) {
            return Err(ValidationError::Negative("Weight"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn profile() -> ClientProfile {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        ClientProfile::new_default("user-1", Some("Dana"), Some("dana@example.com"), now)
    }

    #[test]
    fn test_default_profile_seeded_from_identity() {
        let profile = profile();
        assert_eq!(profile.full_name, "Dana");
        assert_eq!(profile.email, "dana@example.com");
        assert!(profile.date_of_birth.is_empty());
        assert_eq!(profile.height, 0.0);

        let anonymous = ClientProfile::new_default("user-2", None, None, profile.created_at);
        assert!(anonymous.full_name.is_empty());
        assert!(anonymous.email.is_empty());
    }

    #[test]
    fn test_apply_partial_update() {
        let mut profile = profile();
        profile.phone = Some("555-0100".to_string());

        profile.apply(&ProfileUpdate {
            gender: Some("female".to_string()),
            weight: Some(140.0),
            phone: Some(String::new()),
            fitness_goals: Some("Run a 10k".to_string()),
            ..ProfileUpdate::default()
        });

        assert_eq!(profile.gender, "female");
        assert_eq!(profile.weight, 140.0);
        assert_eq!(profile.phone, None);
        assert_eq!(profile.fitness_goals.as_deref(), Some("Run a 10k"));
        assert_eq!(profile.full_name, "Dana");
    }

    #[test]
    fn test_age_on() {
        let mut profile = profile();
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(profile.age_on(today), None);

        profile.date_of_birth = "1990-06-01".to_string();
        assert_eq!(profile.age_on(today), Some(34));

        profile.date_of_birth = "1990-06-02".to_string();
        assert_eq!(profile.age_on(today), Some(33));

        profile.date_of_birth = "2030-01-01".to_string();
        assert_eq!(profile.age_on(today), None);

        profile.date_of_birth = "June 1st".to_string();
        assert_eq!(profile.age_on(today), None);
    }

    #[test]
    fn test_update_validation() {
        assert!(ProfileUpdate::default().is_empty());
        assert!(ProfileUpdate::default().validate().is_ok());

        let bad_email = ProfileUpdate {
            email: Some("not-an-email".to_string()),
            ..ProfileUpdate::default()
        };
        assert!(matches!(bad_email.validate(), Err(ValidationError::InvalidEmail(_))));

        let bad_date = ProfileUpdate {
            date_of_birth: Some("01/02/1990".to_string()),
            ..ProfileUpdate::default()
        };
        assert_eq!(bad_date.validate(), Err(ValidationError::InvalidDate("Date of birth")));

        let cleared_date = ProfileUpdate {
            date_of_birth: Some(String::new()),
            ..ProfileUpdate::default()
        };
        assert!(cleared_date.validate().is_ok());

        let negative = ProfileUpdate {
            height: Some(-1.0),
            ..ProfileUpdate::default()
        };
        assert_eq!(negative.validate(), Err(ValidationError::Negative("Height")));
    }
}
