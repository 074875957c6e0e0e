use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{Role, User};

/// Session token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// The authenticated caller of a request, as decoded from its session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

impl Requester {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Admins act on the id they ask for; everybody else only ever on themself.
    pub fn resolve_target(&self, requested: i64) -> i64 {
        if self.is_admin() { requested } else { self.id }
    }
}

impl From<Claims> for Requester {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// HS256 signing and verification keys for session tokens.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: TimeDelta,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl: TimeDelta) -> Result<Self, AppError> {
        if secret.is_empty() {
            return Err(AppError::ConfigError("JWT secret must not be empty".into()));
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        })
    }

    /// Sign a token carrying the user's id, email and role.
    pub fn sign(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::ConfigError("Token lifetime is out of range".into()))?;
        let claims = Claims {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        tracing::debug!(user_id = user.id, "session token signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }
}
