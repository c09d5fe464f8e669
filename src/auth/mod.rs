//! Bearer tokens and roles.
//!
//! Tokens are HS256 JWTs carrying the user id, email and role. Revocation is
//! handled separately by [`crate::blacklist`].

mod password;
pub mod schema;

pub use password::{hash_password, verify_password, PasswordError};

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::database::models::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Basic,
    Normal,
    Admin,
}

impl Role {
    pub const NAMES: &'static [&'static str] = &["BASIC", "NORMAL", "ADMIN"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Basic => "BASIC",
            Role::Normal => "NORMAL",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BASIC" => Ok(Role::Basic),
            "NORMAL" => Ok(Role::Normal),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_else(Utc::now)
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT secret is not configured")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

/// Signing material and token lifetime, built once at startup
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtKeys").field("lifetime", &self.lifetime).finish_non_exhaustive()
    }
}

impl JwtKeys {
    pub fn new(secret: &str, lifetime_hours: u64) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime: Duration::hours(i64::try_from(lifetime_hours).unwrap_or(i64::MAX / 3600)),
        })
    }

    pub fn from_config(security: &SecurityConfig) -> Result<Self, JwtError> {
        Self::new(&security.jwt_secret, security.jwt_lifetime_hours)
    }
}

pub fn issue_token(keys: &JwtKeys, user: &User) -> Result<(String, DateTime<Utc>), JwtError> {
    let now = Utc::now();
    let expires_at = now + keys.lifetime;
    let claims = Claims {
        sub: user.id,
        email: user.email_address.clone(),
        role: user.role(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };

    let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))?;
    Ok((token, expires_at))
}

/// Check signature and expiry
pub fn verify_token(keys: &JwtKeys, token: &str) -> Result<Claims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    let data = decode::<Claims>(token, &keys.decoding, &validation)?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str) -> User {
        User {
            id: Uuid::new_v4(),
            first_name: "Edwin".into(),
            last_name: "Hubble".into(),
            email_address: "edwin@hubble.com".into(),
            password: String::new(),
            role: role.into(),
            planet_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn issued_tokens_verify() {
        let keys = JwtKeys::new("test-secret", 1).unwrap();
        let user = user("NORMAL");
        let (token, expires_at) = issue_token(&keys, &user).unwrap();

        let claims = verify_token(&keys, &token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, Role::Normal);
        assert_eq!(claims.expires_at().timestamp(), expires_at.timestamp());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let keys = JwtKeys::new("one", 1).unwrap();
        let other = JwtKeys::new("two", 1).unwrap();
        let (token, _) = issue_token(&keys, &user("ADMIN")).unwrap();
        assert!(matches!(verify_token(&other, &token), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let keys = JwtKeys::new("secret", 1).unwrap();
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "a@b.com".into(),
            role: Role::Basic,
            iat: Utc::now().timestamp() - 7200,
            exp: Utc::now().timestamp() - 3600,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding).unwrap();
        assert!(verify_token(&keys, &token).is_err());
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(JwtKeys::new("", 1), Err(JwtError::InvalidSecret)));
    }

    #[test]
    fn roles_round_trip_through_strings() {
        for name in Role::NAMES {
            assert_eq!(name.parse::<Role>().unwrap().as_str(), *name);
        }
        assert!("ROOT".parse::<Role>().is_err());
    }
}
