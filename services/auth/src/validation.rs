//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Shortest accepted password
pub const MIN_PASSWORD_LEN: usize = 6;
/// Longest accepted password
pub const MAX_PASSWORD_LEN: usize = 128;

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    let length = password.chars().count();
    if length < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        ));
    }

    if length > MAX_PASSWORD_LEN {
        return Err(format!(
            "Password must be at most {} characters long",
            MAX_PASSWORD_LEN
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("cook@example.com").is_ok());
        assert!(validate_email("first.last+tag@kitchen.co.uk").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("cook").is_err());
        assert!(validate_email("cook@example").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password(&"x".repeat(MAX_PASSWORD_LEN)).is_ok());

        assert!(validate_password("").is_err());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"x".repeat(MAX_PASSWORD_LEN + 1)).is_err());
    }
}
