//! Server state shared by every handler

use std::sync::Arc;

use shared::error::AppError;
use sqlx::SqlitePool;

use crate::auth::{JwtService, service as auth_service};
use crate::core::Config;
use crate::db::DbService;
use crate::maintenance;

/// Cheap to clone: the pool and services are reference counted
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub pool: SqlitePool,
    jwt_service: Arc<JwtService>,
}

impl ServerState {
    pub fn new(config: Config, db: DbService) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(&config.jwt_config()));
        Self {
            config: Arc::new(config),
            pool: db.pool,
            jwt_service,
        }
    }

    /// Open the database, then create the bootstrap admin and demo catalog if configured
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let db = DbService::new(&config.database_path).await?;
        let state = Self::new(config.clone(), db);
        state.bootstrap().await?;
        Ok(state)
    }

    /// Idempotent startup data: admin account and (optionally) the demo catalog
    pub async fn bootstrap(&self) -> Result<(), AppError> {
        match (&self.config.admin_email, &self.config.admin_password) {
            (Some(email), Some(password)) => {
                auth_service::bootstrap_admin(&self.pool, &self.config.admin_name, email, password)
                    .await?;
            }
            _ => tracing::info!("ADMIN_EMAIL / ADMIN_PASSWORD not set, no bootstrap admin"),
        }

        if self.config.seed_demo_catalog {
            maintenance::seed_demo_catalog(&self.pool).await?;
        }
        Ok(())
    }

    pub fn get_jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }
}
