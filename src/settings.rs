use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Run-wide settings: defaults, then `seo_fixer.{toml,json,yaml}`, then `SEO_*` env vars.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub db_path: PathBuf,
    pub base_url: String,
    pub report_dir: PathBuf,
    pub backup_dir: PathBuf,
    #[serde(default)]
    pub tables_path: Option<PathBuf>,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name("seo_fixer").required(false))
                .add_source(Environment::with_prefix("SEO")),
        )
    }

    fn from_builder(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let settings: Settings = builder
            .set_default("db_path", "iiot_bay_database.db")?
            .set_default("base_url", "https://www.iiot-bay.com")?
            .set_default("report_dir", ".")?
            .set_default("backup_dir", "backups")?
            .build()
            .context("Failed to build settings")?
            .try_deserialize()
            .context("Invalid settings")?;
        Ok(settings)
    }
}

/// Absolute URL of a post.
pub fn post_url(base_url: &str, slug: &str) -> String {
    format!("{}/post/{}", base_url.trim_end_matches('/'), slug)
}
