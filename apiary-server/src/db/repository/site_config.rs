//! Site Configuration Repository (singleton row, id = 1)

use super::{RepoResult, parse_column};
use shared::models::SiteConfig;
use sqlx::SqlitePool;

#[derive(Debug, sqlx::FromRow)]
struct SiteConfigRow {
    company_name: String,
    page_title: String,
    page_subtitle: String,
    phone: String,
    address: String,
    email: String,
    facebook: String,
    instagram: String,
    x: String,
    tiktok: String,
    images: String,
    logo: String,
    logo_kind: String,
    updated_at: i64,
}

impl TryFrom<SiteConfigRow> for SiteConfig {
    type Error = super::RepoError;

    fn try_from(row: SiteConfigRow) -> RepoResult<Self> {
        Ok(SiteConfig {
            company_name: row.company_name,
            page_title: row.page_title,
            page_subtitle: row.page_subtitle,
            phone: row.phone,
            address: row.address,
            email: row.email,
            facebook: row.facebook,
            instagram: row.instagram,
            x: row.x,
            tiktok: row.tiktok,
            images: serde_json::from_str(&row.images)?,
            logo: row.logo,
            logo_kind: parse_column("site_config.logo_kind", &row.logo_kind)?,
            updated_at: row.updated_at,
        })
    }
}

pub async fn find(pool: &SqlitePool) -> RepoResult<Option<SiteConfig>> {
    let row = sqlx::query_as::<_, SiteConfigRow>(
        "SELECT company_name, page_title, page_subtitle, phone, address, email, facebook, instagram, x, tiktok, images, logo, logo_kind, updated_at FROM site_config WHERE id = 1",
    )
    .fetch_optional(pool)
    .await?;
    row.map(SiteConfig::try_from).transpose()
}

/// Insert or replace the singleton row
pub async fn upsert(pool: &SqlitePool, config: &SiteConfig) -> RepoResult<()> {
    let images = serde_json::to_string(&config.images)?;
    sqlx::query(
        "INSERT INTO site_config (id, company_name, page_title, page_subtitle, phone, address, email, facebook, instagram, x, tiktok, images, logo, logo_kind, updated_at) \
         VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14) \
         ON CONFLICT(id) DO UPDATE SET company_name = excluded.company_name, page_title = excluded.page_title, \
         page_subtitle = excluded.page_subtitle, phone = excluded.phone, address = excluded.address, email = excluded.email, \
         facebook = excluded.facebook, instagram = excluded.instagram, x = excluded.x, tiktok = excluded.tiktok, \
         images = excluded.images, logo = excluded.logo, logo_kind = excluded.logo_kind, updated_at = excluded.updated_at",
    )
    .bind(&config.company_name)
    .bind(&config.page_title)
    .bind(&config.page_subtitle)
    .bind(&config.phone)
    .bind(&config.address)
    .bind(&config.email)
    .bind(&config.facebook)
    .bind(&config.instagram)
    .bind(&config.x)
    .bind(&config.tiktok)
    .bind(images)
    .bind(&config.logo)
    .bind(config.logo_kind.as_str())
    .bind(config.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}
