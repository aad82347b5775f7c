use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::loader::{DatePolicy, LoadOptions};

/// Env var consulted when `--config` is not given.
pub const CONFIG_ENV: &str = "METAL_DASHBOARD_CONFIG";
/// Picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("reading config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// One price series shown as a dashboard tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetalSource {
    /// Display name, also used for export file names.
    pub name: String,
    /// Chemical symbol shown next to the name.
    #[serde(default)]
    pub symbol: String,
    /// CSV file, relative to `data_dir` unless absolute.
    pub file: PathBuf,
    /// `#RRGGBB` line colour. Omitted means a generated palette hue.
    #[serde(default)]
    pub color: Option<String>,
}

impl MetalSource {
    fn new(name: &str, symbol: &str, file: &str, color: &str) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            file: PathBuf::from(file),
            color: Some(color.to_string()),
        }
    }

    /// Tab label, e.g. `Copper (Cu)`.
    pub fn label(&self) -> String {
        if self.symbol.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.symbol)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    /// Drop rows with unparseable dates instead of failing the whole file.
    pub skip_unparseable_dates: bool,
    pub metals: Vec<MetalSource>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            skip_unparseable_dates: false,
            metals: vec![
                MetalSource::new("Copper", "Cu", "LME_Copper.csv", "#FF6B35"),
                MetalSource::new("Aluminum", "Al", "LME_Aluminium.csv", "#4ECDC4"),
                MetalSource::new("Iron", "Fe", "LME_Iron.csv", "#95A3A4"),
            ],
        }
    }
}

impl DashboardConfig {
    /// Load from a JSON file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve the config: explicit path > env var > `dashboard.json` > defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            .or_else(|| {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                fallback.exists().then_some(fallback)
            });

        match path {
            Some(path) => {
                log::info!("Loading configuration from {}", path.display());
                Self::from_file(&path)
            }
            None => {
                log::debug!("No config file, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Full path of a metal's CSV file.
    pub fn path_for(&self, metal: &MetalSource) -> PathBuf {
        self.data_dir.join(&metal.file)
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            date_policy: if self.skip_unparseable_dates {
                DatePolicy::SkipRow
            } else {
                DatePolicy::Strict
            },
        }
    }

    /// Look a metal up by name or symbol, ignoring case.
    pub fn find_metal(&self, key: &str) -> Option<&MetalSource> {
        let key = key.trim();
        self.metals
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(key) || m.symbol.eq_ignore_ascii_case(key))
    }
}
