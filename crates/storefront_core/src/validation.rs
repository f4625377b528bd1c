//! Input checks shared by the workflows.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{ServiceError, ServiceResult};

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

/// Returns the trimmed value, or a validation error naming the field.
pub fn required(field: &str, value: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

pub fn email(field: &str, value: &str) -> ServiceResult<String> {
    let value = required(field, value)?;
    if !EMAIL_REGEX.is_match(&value) {
        return Err(ServiceError::Validation(format!(
            "{} is not a valid email address",
            field
        )));
    }
    Ok(value)
}

/// Blank optional strings are treated as absent.
pub fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn non_negative_price(value: f64) -> ServiceResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(ServiceError::Validation(
            "price must be a non-negative number".to_string(),
        ));
    }
    Ok(value)
}

pub fn non_negative_count(field: &str, value: i64) -> ServiceResult<i64> {
    if value < 0 {
        return Err(ServiceError::Validation(format!(
            "{} must not be negative",
            field
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required("name", "  Rahim ").unwrap(), "Rahim");
        assert!(matches!(
            required("name", "   "),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn email_shape() {
        assert!(email("email", "a@b.co").is_ok());
        assert!(email("email", "not-an-email").is_err());
        assert!(email("email", "a b@c.d").is_err());
    }

    #[test]
    fn negative_numbers_are_rejected() {
        assert!(non_negative_price(-0.01).is_err());
        assert!(non_negative_price(f64::INFINITY).is_err());
        assert_eq!(non_negative_price(500.0).unwrap(), 500.0);
        assert!(non_negative_count("sales", -1).is_err());
    }

    #[test]
    fn blank_optionals_become_none() {
        assert_eq!(optional(Some("  ".into())), None);
        assert_eq!(optional(Some(" x ".into())), Some("x".to_string()));
    }
}
