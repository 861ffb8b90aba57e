use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::models::UserPublic;

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if !is_valid_email(&self.email) {
            return Err(AppError::BadRequest("Invalid email address".into()));
        }
        if self.password.len() < 6 {
            return Err(AppError::BadRequest(
                "Password must be at least 6 characters".into(),
            ));
        }
        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest("Name is required".into()));
        }
        Ok(())
    }
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(AppError::BadRequest("Email and password are required".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthData {
    pub user: UserPublic,
    pub token: String,
}

pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("user.name@shop.example.in"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("plainaddress"));
        assert!(!is_valid_email("@no-local.com"));
        assert!(!is_valid_email("user@nodot"));
        assert!(!is_valid_email("user@.com"));
        assert!(!is_valid_email("user@domain."));
    }

    #[test]
    fn register_validation_runs_before_persistence() {
        let ok = RegisterRequest {
            email: "a@b.com".into(),
            password: "secret1".into(),
            name: "A".into(),
            phone: None,
        };
        assert!(ok.validate().is_ok());

        let short = RegisterRequest {
            email: "a@b.com".into(),
            password: "abc".into(),
            name: "A".into(),
            phone: None,
        };
        assert!(short.validate().is_err());

        let unnamed = RegisterRequest {
            email: "a@b.com".into(),
            password: "secret1".into(),
            name: "  ".into(),
            phone: None,
        };
        assert!(unnamed.validate().is_err());
    }
}
