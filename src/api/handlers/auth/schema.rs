//! Input shape rules for sign-in and registration.

use regex::Regex;

use super::types::RegisterInput;
use crate::api::error::ValidationErrors;

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 50;
const PASSWORD_MIN: usize = 8;

pub(super) fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email))
}

fn check_name(value: &str, label: &str, errors: &mut Vec<String>) {
    let len = value.chars().count();
    if len < NAME_MIN {
        errors.push(format!("{label} must be at least {NAME_MIN} characters"));
    } else if len > NAME_MAX {
        errors.push(format!("{label} must be at most {NAME_MAX} characters"));
    }
}

fn check_password(password: &str, errors: &mut Vec<String>) {
    if password.chars().count() < PASSWORD_MIN {
        errors.push(format!(
            "Password must be at least {PASSWORD_MIN} characters"
        ));
    }
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_lower && has_upper && has_digit) {
        errors.push(
            "Password must contain at least one uppercase letter, one lowercase letter and one number"
                .to_string(),
        );
    }
}

/// Collects every violated rule so the client sees all of them at once.
pub(super) fn validate_register(input: &RegisterInput) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    check_name(&input.first_name, "First name", &mut errors);
    check_name(&input.last_name, "Last name", &mut errors);
    if !valid_email(&input.email) {
        errors.push("Email must be valid".to_string());
    }
    check_password(&input.password, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

/// Sign-in only checks shape; callers collapse failures into a generic error.
pub(super) fn valid_credentials_shape(email: &str, password: &str) -> bool {
    valid_email(email) && password.chars().count() >= PASSWORD_MIN
}
