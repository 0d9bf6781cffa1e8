//! Site Configuration Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// How the storefront logo is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogoKind {
    /// One of the built-in emoji / icon presets
    #[default]
    Preset,
    /// Uploaded image (data URL or path)
    Custom,
}

impl LogoKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preset => "preset",
            Self::Custom => "custom",
        }
    }
}

impl std::str::FromStr for LogoKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preset" => Ok(Self::Preset),
            "custom" => Ok(Self::Custom),
            other => Err(format!("unknown logo kind: {other}")),
        }
    }
}

/// Storefront settings (singleton)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub company_name: String,
    pub page_title: String,
    pub page_subtitle: String,
    pub phone: String,
    pub address: String,
    pub email: String,
    pub facebook: String,
    pub instagram: String,
    pub x: String,
    pub tiktok: String,
    /// Gallery images
    pub images: Vec<String>,
    pub logo: String,
    pub logo_kind: LogoKind,
    pub updated_at: i64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            company_name: "Apícola Dorada".to_string(),
            page_title: "Miel Pura y Natural Directo del Colmenar".to_string(),
            page_subtitle: "Descubre nuestra selección de productos apícolas...".to_string(),
            phone: "+57 300 123 4567".to_string(),
            address: "Finca La Colmena, Vereda El Panal".to_string(),
            email: "contacto@apicoladorada.com".to_string(),
            facebook: "https://facebook.com/apicoladorada".to_string(),
            instagram: "https://instagram.com/apicoladorada".to_string(),
            x: "https://x.com/apicoladorada".to_string(),
            tiktok: "https://tiktok.com/@apicoladorada".to_string(),
            images: Vec::new(),
            logo: "🍯".to_string(),
            logo_kind: LogoKind::Preset,
            updated_at: 0,
        }
    }
}

/// Update site configuration payload (absent fields keep their value)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SiteConfigUpdate {
    #[validate(length(min = 1, max = 200))]
    pub company_name: Option<String>,
    pub page_title: Option<String>,
    pub page_subtitle: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub x: Option<String>,
    pub tiktok: Option<String>,
    pub images: Option<Vec<String>>,
    pub logo: Option<String>,
    pub logo_kind: Option<LogoKind>,
}

impl SiteConfig {
    /// Apply a partial update
    pub fn apply(&mut self, update: SiteConfigUpdate) {
        macro_rules! merge {
            ($($field:ident),* $(,)?) => {
                $(if let Some(v) = update.$field { self.$field = v; })*
            };
        }
        merge!(
            company_name,
            page_title,
            page_subtitle,
            phone,
            address,
            email,
            facebook,
            instagram,
            x,
            tiktok,
            images,
            logo,
            logo_kind,
        );
    }
}
