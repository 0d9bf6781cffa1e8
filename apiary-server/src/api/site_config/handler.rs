//! Site configuration handlers

use axum::extract::State;
use shared::error::{ApiResponse, AppError, AppResult};
use shared::models::{SiteConfig, SiteConfigUpdate};
use sqlx::SqlitePool;

use crate::api::extract::AppJson;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{RepoResult, site_config as site_config_repo};
use crate::utils::validation::{MAX_URL_LEN, validate_optional_text, validate_payload};
use crate::utils::{ok, ok_with_message};

/// Stored configuration, or the defaults (persisted) on first read
async fn load_or_create(pool: &SqlitePool) -> RepoResult<SiteConfig> {
    if let Some(config) = site_config_repo::find(pool).await? {
        return Ok(config);
    }
    let config = SiteConfig {
        updated_at: shared::util::now_millis(),
        ..SiteConfig::default()
    };
    site_config_repo::upsert(pool, &config).await?;
    tracing::info!("Default site configuration created");
    Ok(config)
}

/// GET /api/site-config
pub async fn get(State(state): State<ServerState>) -> AppResult<ApiResponse<SiteConfig>> {
    Ok(ok(load_or_create(&state.pool).await?))
}

/// PUT /api/admin/site-config - partial update
pub async fn update(
    State(state): State<ServerState>,
    admin: CurrentUser,
    AppJson(payload): AppJson<SiteConfigUpdate>,
) -> AppResult<ApiResponse<SiteConfig>> {
    validate_payload(&payload)?;
    validate_optional_text(&payload.logo, "logo", MAX_URL_LEN)?;
    if let Some(images) = &payload.images
        && images.iter().any(|image| image.len() > MAX_URL_LEN)
    {
        return Err(AppError::validation(format!(
            "images entries must be at most {MAX_URL_LEN} characters"
        )));
    }

    let mut config = load_or_create(&state.pool).await?;
    config.apply(payload);
    config.updated_at = shared::util::now_millis();
    site_config_repo::upsert(&state.pool, &config).await?;

    tracing::info!(admin_id = admin.id, "Site configuration updated");
    Ok(ok_with_message("Site configuration updated", config))
}
