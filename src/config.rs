use crate::utils::makes_to_slug;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

pub const TORI_SEARCH_URL: &str =
    "https://autot.tori.fi/kuljetuskalusto-ja-raskas-kalusto/myydaan?alusta_2=";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub makes: Vec<String>,
    pub telegram_bot_token: String,
    pub telegram_chat_id: i64,
    #[serde(default)]
    pub api_token: String,
    #[serde(default = "default_interval")]
    pub check_interval_seconds: u64,
    #[serde(default)]
    pub request_delay_ms: u64,
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    #[serde(default = "default_makes_file")]
    pub makes_file: PathBuf,
}

fn default_interval() -> u64 {
    10
}

fn default_database_path() -> PathBuf {
    PathBuf::from("listings.db")
}

fn default_makes_file() -> PathBuf {
    PathBuf::from("nettimakes.json")
}

impl AppConfig {
    /// Listing-page URLs for the marketplace, derived from `makes`.
    pub fn tori_listing_urls(&self) -> Vec<String> {
        vec![format!("{}{}", TORI_SEARCH_URL, makes_to_slug(&self.makes))]
    }
}

pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: AppConfig = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(config)
}

#[derive(Debug, Clone, Deserialize)]
pub struct MakeEntry {
    pub id: u32,
    pub name: String,
}

/// Name-to-id lookup for the Nettikone `make` filter.
#[derive(Debug, Default)]
pub struct MakeCatalog {
    makes: Vec<MakeEntry>,
}

impl MakeCatalog {
    pub fn new(makes: Vec<MakeEntry>) -> Self {
        Self { makes }
    }

    /// A missing or unreadable catalog is logged and treated as empty.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Make catalog {} not readable: {}", path.display(), e);
                return Self::default();
            }
        };
        match serde_json::from_str(&content) {
            Ok(makes) => Self::new(makes),
            Err(e) => {
                warn!("Make catalog {} is invalid: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn id_of(&self, name: &str) -> Option<u32> {
        self.makes
            .iter()
            .find(|m| m.name.to_lowercase() == name.to_lowercase())
            .map(|m| m.id)
    }

    /// Ids for every known make; unknown names are logged and skipped.
    pub fn ids_for(&self, names: &[String]) -> Vec<u32> {
        names
            .iter()
            .filter_map(|name| {
                let id = self.id_of(name);
                if id.is_none() {
                    warn!("Unknown Nettikone make '{}', not filtering on it", name);
                }
                id
            })
            .collect()
    }
}
