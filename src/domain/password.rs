use validator::ValidationError;

const MIN_LENGTH: usize = 6;
const MAX_LENGTH: usize = 128;

/// Password policy: 6..=128 characters with at least one uppercase letter,
/// one lowercase letter and one digit.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let length = password.chars().count();
    if length < MIN_LENGTH {
        let mut error = ValidationError::new("password_length");
        error.message = Some(format!("Password must be at least {} characters long", MIN_LENGTH).into());
        return Err(error);
    }
    if length > MAX_LENGTH {
        let mut error = ValidationError::new("password_length");
        error.message = Some(format!("Password cannot exceed {} characters", MAX_LENGTH).into());
        return Err(error);
    }

    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !(has_upper && has_lower && has_digit) {
        let mut error = ValidationError::new("password_complexity");
        error.message = Some(
            "Password must contain at least one uppercase letter, one lowercase letter, and one number".into(),
        );
        return Err(error);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_mixed_case_with_digit() {
        assert!(validate_password_strength("Secret1").is_ok());
    }

    #[test]
    fn rejects_short_or_simple_passwords() {
        assert_eq!(validate_password_strength("Ab1").unwrap_err().code, "password_length");
        assert_eq!(validate_password_strength("secret123").unwrap_err().code, "password_complexity");
        assert_eq!(validate_password_strength("SECRET123").unwrap_err().code, "password_complexity");
        assert_eq!(validate_password_strength("Secretive").unwrap_err().code, "password_complexity");
    }
}
