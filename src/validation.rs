//! Input validation for registration and settings forms.

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid {field}: {reason}")]
    Field { field: &'static str, reason: String },
}

fn field_err(field: &'static str, reason: impl Into<String>) -> ValidationError {
    ValidationError::Field {
        field,
        reason: reason.into(),
    }
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?[0-9][0-9 \-]{6,14}$").unwrap())
}

fn pin_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{4}$").unwrap())
}

fn username_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9_.-]{2,31}$").unwrap())
}

/// Person or clinic name: non-empty after trimming, at least 2 characters.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().chars().count() < 2 {
        return Err(field_err("name", "must be at least 2 characters"));
    }
    Ok(())
}

/// Phone number: digits with optional leading `+`, spaces and dashes allowed.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if !phone_regex().is_match(phone.trim()) {
        return Err(field_err("phone", "must be 7-15 digits"));
    }
    Ok(())
}

/// Doctor PIN: exactly 4 numeric digits.
pub fn validate_pin(pin: &str) -> Result<(), ValidationError> {
    if !pin_regex().is_match(pin) {
        return Err(field_err("pin", "must be exactly 4 digits"));
    }
    Ok(())
}

/// Login username: lowercase alphanumeric plus `_ . -`, 3-32 characters.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if !username_regex().is_match(username) {
        return Err(field_err(
            "username",
            "3-32 characters, lowercase letters, digits, '_', '.', '-'",
        ));
    }
    Ok(())
}

/// Patient age, when provided, must be plausible.
pub fn validate_age(age: Option<u32>) -> Result<(), ValidationError> {
    match age {
        Some(a) if a > 130 => Err(field_err("age", "must be at most 130")),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_need_two_characters() {
        assert!(validate_name("Jo").is_ok());
        assert!(validate_name("Jane Doe").is_ok());
        assert!(validate_name(" a ").is_err());
        assert!(validate_name("").is_err());
    }

    #[test]
    fn phone_formats() {
        assert!(validate_phone("5551234567").is_ok());
        assert!(validate_phone("+91 98765 43210").is_ok());
        assert!(validate_phone("555-123-4567").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("call me").is_err());
    }

    #[test]
    fn pin_is_exactly_four_digits() {
        assert!(validate_pin("0000").is_ok());
        assert!(validate_pin("123").is_err());
        assert!(validate_pin("12345").is_err());
        assert!(validate_pin("12a4").is_err());
    }

    #[test]
    fn usernames() {
        assert!(validate_username("frontdesk").is_ok());
        assert!(validate_username("clinic-1").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("Has Spaces").is_err());
    }

    #[test]
    fn age_bounds() {
        assert!(validate_age(None).is_ok());
        assert!(validate_age(Some(0)).is_ok());
        assert!(validate_age(Some(130)).is_ok());
        assert!(validate_age(Some(131)).is_err());
    }

    #[test]
    fn error_carries_field_name() {
        let err = validate_pin("nope").unwrap_err();
        assert_eq!(err.to_string(), "Invalid pin: must be exactly 4 digits");
    }
}
