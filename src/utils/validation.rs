use crate::error::{AppError, Result};

/// Minimum password length accepted at registration and rotation.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Basic email format check
pub fn validate_email(email: &str) -> bool {
    validator::validate_email(email)
}

/// Validate an email address, returning the rejection message used by the
/// signup and profile-update paths.
pub fn validate_email_format(email: &str) -> Result<()> {
    if email.trim().is_empty() || !validate_email(email) {
        return Err(AppError::validation("Invalid email address"));
    }

    if email.len() > 254 {
        return Err(AppError::validation("Invalid email address"));
    }

    Ok(())
}

/// Enforce the minimum password length.
pub fn validate_password(password: &str) -> Result<()> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::validation(
            "Password must be at least 6 characters long",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com"));
        assert!(validate_email("test.email+tag@domain.co.uk"));
        assert!(validate_email("user123@test-domain.com"));

        assert!(!validate_email("invalid-email"));
        assert!(!validate_email("@domain.com"));
        assert!(!validate_email("user@"));
    }

    #[test]
    fn test_validate_email_format() {
        assert!(validate_email_format("user@example.com").is_ok());

        assert!(validate_email_format("").is_err());
        assert!(validate_email_format("invalid-email").is_err());
        assert!(validate_email_format(&format!("{}@b.com", "a".repeat(250))).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret1").is_ok());
        assert!(validate_password("123456").is_ok());

        assert!(validate_password("").is_err());
        assert!(validate_password("12345").is_err());
    }
}
