use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 32, message = "Username must be 3-32 characters"))]
    #[schema(example = "alice")]
    pub username: String,
    #[validate(
        length(min = 6, max = 128, message = "Password must be 6-128 characters"),
        custom(function = "password_strength")
    )]
    #[schema(example = "Passw0rd")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
}

/// At least one lowercase letter and one digit
fn password_strength(password: &str) -> Result<(), ValidationError> {
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if has_lower && has_digit {
        Ok(())
    } else {
        Err(ValidationError::new("password_strength").with_message(
            "Password must contain at least one lowercase letter and one digit".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(username: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_username_bounds() {
        assert!(register("abc", "Passw0rd").validate().is_ok());
        assert!(register(&"a".repeat(32), "Passw0rd").validate().is_ok());
        assert!(register("ab", "Passw0rd").validate().is_err());
        assert!(register(&"a".repeat(33), "Passw0rd").validate().is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(register("alice", "abc123").validate().is_ok());
        assert!(register("alice", "ab12").validate().is_err());
        assert!(register("alice", "PASSW0RD").validate().is_err());
        assert!(register("alice", "password").validate().is_err());
        assert!(register("alice", &format!("a1{}", "x".repeat(127))).validate().is_err());
    }
}
