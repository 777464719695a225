//! Validation helpers for DTOs.

use validator::{ValidateEmail, ValidationError};

use crate::dao::models::CHOICES_PER_QUESTION;

/// Reject empty or whitespace-only strings.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Validate an email address after trimming surrounding whitespace.
pub fn validate_email_address(value: &str) -> Result<(), ValidationError> {
    validate_not_blank(value)?;
    if !value.trim().validate_email() {
        let mut err = ValidationError::new("email");
        err.message = Some("must be a valid email address".into());
        return Err(err);
    }
    Ok(())
}

/// Map a `choiceN` marker (1-based) onto a 0-based choice index.
///
/// ```ignore
/// choice_index("choice1") // Some(0)
/// choice_index("choice5") // None
/// ```
pub fn choice_index(marker: &str) -> Option<usize> {
    let position: usize = marker.trim().strip_prefix("choice")?.parse().ok()?;
    (1..=CHOICES_PER_QUESTION)
        .contains(&position)
        .then(|| position - 1)
}

/// Validate a `correct_choice` marker.
pub fn validate_choice_marker(marker: &str) -> Result<(), ValidationError> {
    if choice_index(marker).is_none() {
        let mut err = ValidationError::new("correct_choice");
        err.message = Some(
            format!("must be one of choice1..choice{CHOICES_PER_QUESTION} (got `{marker}`)").into(),
        );
        return Err(err);
    }
    Ok(())
}
