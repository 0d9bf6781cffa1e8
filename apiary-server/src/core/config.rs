//! Server configuration
//!
//! Every field comes from an environment variable (after `.env` loading)
//! with a default:
//!
//! | Variable | Default |
//! |----------|---------|
//! | DATABASE_PATH | data/apiary.db |
//! | HTTP_PORT | 3000 |
//! | ENVIRONMENT | development |
//! | JWT_SECRET | required outside development |
//! | JWT_EXPIRY_HOURS | 24 |
//! | LOG_LEVEL / LOG_DIR | unset |
//! | ADMIN_EMAIL / ADMIN_PASSWORD / ADMIN_NAME | unset (no bootstrap admin) |
//! | SEED_DEMO_CATALOG | false |

use shared::error::{AppError, ErrorCode};

use crate::auth::JwtConfig;

/// Minimum JWT secret length outside development
const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database file (`:memory:` is handled by tests through `DbService::in_memory`)
    pub database_path: String,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    /// Overrides the default log filter
    pub log_level: Option<String>,
    /// Daily-rolling log files are written here when set
    pub log_dir: Option<String>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub admin_name: String,
    /// Insert the demo catalog on startup when the catalog is empty
    pub seed_demo_catalog: bool,
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env_opt(name)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_bool(name: &str) -> bool {
    env_opt(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

impl Config {
    /// Require a secret env var: must be set, non-empty and long enough outside development
    fn require_secret(name: &str, environment: &str) -> Result<String, AppError> {
        match env_opt(name) {
            Some(val) if environment != "development" && val.len() < MIN_SECRET_LEN => {
                Err(AppError::with_message(
                    ErrorCode::ConfigError,
                    format!("{name} must be at least {MIN_SECRET_LEN} characters in {environment} environment"),
                ))
            }
            Some(val) => Ok(val),
            None if environment != "development" => Err(AppError::with_message(
                ErrorCode::ConfigError,
                format!("{name} must be set in {environment} environment"),
            )),
            None => {
                tracing::warn!("{name} not set, using development secret");
                Ok(format!("dev-{name}-not-for-production"))
            }
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        let environment = env_opt("ENVIRONMENT").unwrap_or_else(|| "development".into());

        Ok(Self {
            database_path: env_opt("DATABASE_PATH").unwrap_or_else(|| "data/apiary.db".into()),
            http_port: env_parse("HTTP_PORT", 3000),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            jwt_expiry_hours: env_parse("JWT_EXPIRY_HOURS", 24),
            log_level: env_opt("LOG_LEVEL"),
            log_dir: env_opt("LOG_DIR"),
            admin_email: env_opt("ADMIN_EMAIL"),
            admin_password: env_opt("ADMIN_PASSWORD"),
            admin_name: env_opt("ADMIN_NAME").unwrap_or_else(|| "Administrador Apícola".into()),
            seed_demo_catalog: env_bool("SEED_DEMO_CATALOG"),
            environment,
        })
    }

    /// In-memory configuration for tests (fixed secret, bootstrap admin, no seed)
    pub fn for_tests() -> Self {
        Self {
            database_path: ":memory:".into(),
            http_port: 0,
            environment: "test".into(),
            jwt_secret: "test-secret-test-secret-test-secret!".into(),
            jwt_expiry_hours: 1,
            log_level: None,
            log_dir: None,
            admin_email: Some("admin@apicola.com".into()),
            admin_password: Some("admin123".into()),
            admin_name: "Administrador Apícola".into(),
            seed_demo_catalog: false,
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig {
            secret: self.jwt_secret.clone(),
            expiry_hours: self.jwt_expiry_hours,
        }
    }
}
