//! Domain services
//!
//! Stateless checks shared by several entry points (registration, password
//! changes, the bootstrap administrator).

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LENGTH: usize = 8;

const PASSWORD_SPECIAL_CHARS: &str = r#"!@#$%^&*()_+-=[]{};':"\|,.<>/?"#;

/// Validation result for domain operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// Create valid result
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    /// Add error to result
    pub fn add_error(&mut self, error: String) {
        self.is_valid = false;
        self.errors.push(error);
    }
}

/// Domain validation service
pub struct ValidationService;

impl ValidationService {
    /// Basic `local@domain.tld` shape check
    pub fn is_valid_email(email: &str) -> bool {
        static EMAIL: OnceLock<Regex> = OnceLock::new();
        let pattern = EMAIL.get_or_init(|| {
            Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$")
                .expect("email pattern is valid")
        });
        pattern.is_match(email)
    }

    /// Password policy: length, upper, lower, digit and special character
    pub fn validate_password(password: &str) -> ValidationResult {
        let mut result = ValidationResult::valid();

        if password.chars().count() < MIN_PASSWORD_LENGTH {
            result.add_error(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            ));
        }
        if !password.chars().any(|c| c.is_ascii_uppercase()) {
            result.add_error("Password must contain an uppercase letter".to_string());
        }
        if !password.chars().any(|c| c.is_ascii_lowercase()) {
            result.add_error("Password must contain a lowercase letter".to_string());
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            result.add_error("Password must contain a digit".to_string());
        }
        if !password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)) {
            result.add_error("Password must contain a special character".to_string());
        }

        result
    }
}
