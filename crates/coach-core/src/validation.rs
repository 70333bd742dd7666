//! Input validation for catalog entries and profile fields.

use thiserror::Error;

use crate::types::{NewDailyRoutine, NewExercise, NewExerciseSet};

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Empty value where one is required.
    #[error("{0} is required.")]
    Required(&'static str),

    /// Value too long.
    #[error("{field} is too long ({actual} chars, max {max})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    /// Invalid email format.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Date not in `YYYY-MM-DD` form.
    #[error("{0} must be a date in YYYY-MM-DD format.")]
    InvalidDate(&'static str),

    /// Non-negative number expected.
    #[error("{0} cannot be negative.")]
    Negative(&'static str),

    #[error("Please select at least one body part.")]
    NoBodyParts,

    #[error("Please select at least one measurement option.")]
    NoMeasurements,

    #[error("Please select at least one exercise.")]
    NoExercises,

    /// A referenced entity does not exist for this user.
    #[error("Unknown {entity}: {id}")]
    UnknownReference { entity: &'static str, id: String },
}

/// Maximum allowed length for email addresses.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum allowed length for entity names.
pub const MAX_NAME_LENGTH: usize = 120;

/// Maximum allowed length for free-text descriptions.
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Validate a required name: non-blank and within [`MAX_NAME_LENGTH`].
pub fn validate_name(field: &'static str, name: &str) -> Result<(), ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::Required(field));
    }
    validate_length(field, name, MAX_NAME_LENGTH)
}

/// Validate an optional description length.
pub fn validate_description(description: Option<&str>) -> Result<(), ValidationError> {
    match description {
        Some(text) => validate_length("Description", text.trim(), MAX_DESCRIPTION_LENGTH),
        None => Ok(()),
    }
}

pub(crate) fn validate_length(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }
    Ok(())
}

/// Validate a profile email address.
///
/// The address must split on a single `@` into a local part without
/// whitespace and a domain of two or more dot-separated labels. Labels are
/// ASCII letters, digits and inner hyphens.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::Required("Email"));
    }
    validate_length("Email", email, MAX_EMAIL_LENGTH)?;

    let invalid = |reason: &str| Err(ValidationError::InvalidEmail(reason.to_string()));

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return invalid("expected one @ between name and domain");
    };
    if local.is_empty() || local.chars().any(char::is_whitespace) {
        return invalid("name before @ is empty or contains spaces");
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return invalid("domain needs a dot, as in example.com");
    }
    for label in labels {
        let well_formed = !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !well_formed {
            return invalid("domain is not well formed");
        }
    }

    Ok(())
}

impl NewExercise {
    /// Check the form rules for a new exercise.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name("Exercise name", &self.name)?;
        validate_description(self.description.as_deref())?;
        if self.body_parts.is_empty() {
            return Err(ValidationError::NoBodyParts);
        }
        if !self.measurements.any_enabled() {
            return Err(ValidationError::NoMeasurements);
        }
        Ok(())
    }
}

impl NewExerciseSet {
    /// Check the form rules for a new set.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name("Set name", &self.name)?;
        validate_description(self.description.as_deref())?;
        if self.exercises.is_empty() {
            return Err(ValidationError::NoExercises);
        }
        if self.exercises.iter().any(|id| id.trim().is_empty()) {
            return Err(ValidationError::Required("Every exercise selection"));
        }
        Ok(())
    }
}

impl NewDailyRoutine {
    /// Check the form rules for a new daily routine.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name("Daily routine name", &self.name)?;
        validate_description(self.description.as_deref())?;
        if self.sets.iter().any(|id| id.trim().is_empty()) {
            return Err(ValidationError::Required("Every set selection"));
        }
        Ok(())
    }
}
