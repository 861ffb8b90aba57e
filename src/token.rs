use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub const DEFAULT_EXPIRATION_HOURS: i64 = 24;

/// Bearer-token claims: identity, email and role at issuance.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub exp: usize,
    pub iat: usize,
}

pub fn issue(
    secret: &[u8],
    user_id: Uuid,
    email: &str,
    role: &str,
    expiration_hours: i64,
) -> AppResult<String> {
    let now = Utc::now();
    let exp = now
        .checked_add_signed(Duration::hours(expiration_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("failed to compute expiry")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        exp: exp.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn decode_claims(secret: &[u8], token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

pub fn secret_from_env() -> AppResult<String> {
    std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))
}

pub fn expiration_hours_from_env() -> i64 {
    std::env::var("JWT_EXPIRATION_HOURS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .filter(|h| *h > 0)
        .unwrap_or(DEFAULT_EXPIRATION_HOURS)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"unit-test-secret";

    #[test]
    fn issued_token_decodes_to_the_same_claims() {
        let user_id = Uuid::new_v4();
        let token = issue(SECRET, user_id, "a@b.com", "customer", 24).unwrap();
        let claims = decode_claims(SECRET, &token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.role, "customer");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue(SECRET, Uuid::new_v4(), "a@b.com", "admin", 24).unwrap();
        assert!(decode_claims(b"another-secret", &token).is_err());
    }
}
