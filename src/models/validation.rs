use super::{InquiryRequest, ValidationError, ValidationResult};

/// Trait for validating input models
pub trait Validate {
    fn validate(&self) -> ValidationResult<()>;
}

/// Validation constants
pub const MAX_NAME_LENGTH: usize = 200;
pub const MAX_EMAIL_LENGTH: usize = 320;
pub const MAX_MESSAGE_LENGTH: usize = 5000;
pub const MAX_PHONE_LENGTH: usize = 50;
pub const MAX_TOPIC_LENGTH: usize = 100;

impl Validate for InquiryRequest {
    fn validate(&self) -> ValidationResult<()> {
        validate_required_text("name", &self.name, MAX_NAME_LENGTH)?;
        validate_required_text("email", &self.email, MAX_EMAIL_LENGTH)?;
        validate_required_text("message", &self.message, MAX_MESSAGE_LENGTH)?;
        validate_optional_text("phone", &self.phone, MAX_PHONE_LENGTH)?;
        validate_optional_text("topic", &self.topic, MAX_TOPIC_LENGTH)?;
        Ok(())
    }
}

/// Validate a required free-text field
pub fn validate_required_text(field: &str, value: &str, max_length: usize) -> ValidationResult<()> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::RequiredField {
            field: field.to_string(),
        });
    }

    validate_length(field, trimmed, max_length)
}

/// Validate an optional free-text field
pub fn validate_optional_text(
    field: &str,
    value: &Option<String>,
    max_length: usize,
) -> ValidationResult<()> {
    if let Some(value) = value {
        validate_length(field, value.trim(), max_length)?;
    }
    Ok(())
}

fn validate_length(field: &str, value: &str, max_length: usize) -> ValidationResult<()> {
    let length = value.chars().count();
    if length > max_length {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max_length,
            actual_length: length,
        });
    }
    Ok(())
}
