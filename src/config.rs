use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::dates::MAX_AGE_YEARS;
use crate::i18n::{Locale, UnsupportedLocale};

pub const CONFIG_ENV: &str = "FITPRO_CONFIG";
pub const BACKEND_URL_ENV: &str = "FITPRO_BACKEND_URL";
pub const LOCALE_ENV: &str = "FITPRO_LOCALE";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid {var}")]
    Locale {
        var: &'static str,
        source: UnsupportedLocale,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub backend_url: String,
    pub default_locale: Locale,
    pub max_birth_age_years: u32,
    pub avatar_bucket: String,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:54321".to_string(),
            default_locale: Locale::FALLBACK,
            max_birth_age_years: MAX_AGE_YEARS,
            avatar_bucket: "avatars".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Defaults, then the file named by `FITPRO_CONFIG`, then the single-value
    /// overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|var| std::env::var(var).ok())
    }

    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match env(CONFIG_ENV).filter(|path| !path.is_empty()) {
            Some(path) => {
                debug!(%path, "Loading config file");
                Self::from_file(Path::new(&path))?
            }
            None => Self::default(),
        };

        if let Some(url) = env(BACKEND_URL_ENV) {
            config.backend_url = url;
        }
        if let Some(tag) = env(LOCALE_ENV) {
            config.default_locale = tag.parse().map_err(|source| ConfigError::Locale {
                var: LOCALE_ENV,
                source,
            })?;
        }
        Ok(config)
    }

    /// Where uploaded blobs become publicly readable.
    pub fn storage_url(&self) -> String {
        format!(
            "{}/storage/v1/object/public",
            self.backend_url.trim_end_matches('/')
        )
    }
}
