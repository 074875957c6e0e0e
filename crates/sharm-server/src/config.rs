use axum::http::{HeaderValue, Method, header};
use chrono::TimeDelta;
use tower_http::cors::CorsLayer;

use sharm_core::{AppError, TokenKeys};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_JWT_TTL_HOURS: i64 = 24;
const MAX_JWT_TTL_HOURS: i64 = 24 * 365;

/// HTTP-side settings read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub cors_origin: String,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
}

impl ServerConfig {
    /// Read configuration from environment variables.
    ///
    /// - `JWT_SECRET` (required)
    /// - `JWT_TTL_HOURS` (optional, defaults to 24, at most one year)
    /// - `SHARM_PORT` (optional, defaults to 8080)
    /// - `SHARM_CORS_ORIGIN` (optional, defaults to `http://localhost:3000`)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::ConfigError("JWT_SECRET must be set".into()))?;

        let port = match lookup("SHARM_PORT") {
            None => DEFAULT_PORT,
            Some(raw) => raw.parse().map_err(|_| {
                AppError::ConfigError(format!("Invalid SHARM_PORT '{raw}': expected 0-65535"))
            })?,
        };

        let jwt_ttl_hours = match lookup("JWT_TTL_HOURS") {
            None => DEFAULT_JWT_TTL_HOURS,
            Some(raw) => match raw.parse::<i64>() {
                Ok(hours) if (1..=MAX_JWT_TTL_HOURS).contains(&hours) => hours,
                _ => {
                    return Err(AppError::ConfigError(format!(
                        "Invalid JWT_TTL_HOURS '{raw}': expected 1-{MAX_JWT_TTL_HOURS}"
                    )));
                }
            },
        };

        let cors_origin =
            lookup("SHARM_CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());

        Ok(Self {
            port,
            cors_origin,
            jwt_secret,
            jwt_ttl_hours,
        })
    }

    pub fn token_keys(&self) -> Result<TokenKeys, AppError> {
        let ttl = TimeDelta::try_hours(self.jwt_ttl_hours).ok_or_else(|| {
            AppError::ConfigError(format!("JWT_TTL_HOURS {} is out of range", self.jwt_ttl_hours))
        })?;
        TokenKeys::new(&self.jwt_secret, ttl)
    }

    /// CORS for the single configured origin, with credentials.
    pub fn cors_layer(&self) -> Result<CorsLayer, AppError> {
        let origin: HeaderValue = self.cors_origin.parse().map_err(|_| {
            AppError::ConfigError(format!("Invalid SHARM_CORS_ORIGIN '{}'", self.cors_origin))
        })?;

        Ok(CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]))
    }
}
