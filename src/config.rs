//! Server settings that are not part of the Leptos options.
//!
//! Read from `RENTNEST_*` environment variables, falling back to values
//! suitable for local development.
use std::path::PathBuf;

use crate::listing::uploader::MAX_IMAGE_BYTES;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_path: String,
    pub storage_dir: PathBuf,
    /// Prefix of public object URLs; the server mounts `storage_dir` here.
    pub storage_base_url: String,
    pub max_upload_bytes: u64,
    /// Shared secret for moderation calls (listing verification). When
    /// unset nobody can change verification status.
    pub admin_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: "rentnest.db".to_string(),
            storage_dir: PathBuf::from("storage"),
            storage_base_url: "/storage".to_string(),
            max_upload_bytes: MAX_IMAGE_BYTES,
            admin_token: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset or unparsable values
    /// keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = AppConfig::default();
        if let Some(path) = lookup("RENTNEST_DB_PATH") {
            config.database_path = path;
        }
        if let Some(dir) = lookup("RENTNEST_STORAGE_DIR") {
            config.storage_dir = PathBuf::from(dir);
        }
        if let Some(base) = lookup("RENTNEST_STORAGE_URL") {
            config.storage_base_url = base.trim_end_matches('/').to_string();
        }
        if let Some(max) = lookup("RENTNEST_MAX_UPLOAD_BYTES").and_then(|v| v.parse().ok()) {
            config.max_upload_bytes = max;
        }
        config.admin_token = lookup("RENTNEST_ADMIN_TOKEN").filter(|t| !t.trim().is_empty());
        config
    }

    /// Mount point for the static file service, e.g. `/storage`. Only
    /// meaningful when the base URL is a local path.
    pub fn storage_mount(&self) -> Option<&str> {
        self.storage_base_url
            .starts_with('/')
            .then_some(self.storage_base_url.as_str())
    }
}
