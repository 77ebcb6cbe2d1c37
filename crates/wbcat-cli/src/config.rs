//! TOML settings
//!
//! Every section and field is optional; missing values take the defaults
//! below. Command-line flags are applied on top by the caller.
//!
//! ```toml
//! [catalogue]
//! cache_path = "bin/wb_catalogue.json"
//!
//! [engine]
//! max_in_flight = 8
//! exclusions = [130090]
//!
//! [export]
//! output_dir = "."
//! stem = "Result"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use wbcat_engine::EngineConfig;
use wbcat_export::ExportOptions;
use wbcat_http::{FacetEndpoint, HttpConfig, CATALOGUE_URL};

/// Settings file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "wbcat.toml";

/// Where the catalogue comes from and where it is cached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogueSettings {
    /// Menu tree document URL
    pub url: String,
    /// Local copy of the document
    pub cache_path: PathBuf,
}

impl Default for CatalogueSettings {
    fn default() -> Self {
        Self {
            url: CATALOGUE_URL.to_string(),
            cache_path: PathBuf::from("bin/wb_catalogue.json"),
        }
    }
}

/// Log output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log file, truncated at start
    pub file: PathBuf,
    /// Filter directive used when `RUST_LOG` is unset
    pub filter: String,
    /// Write JSON lines instead of text
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: PathBuf::from("bin/wbcat.log"),
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// All settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub catalogue: CatalogueSettings,
    pub http: HttpConfig,
    pub facets: FacetEndpoint,
    pub engine: EngineConfig,
    pub export: ExportOptions,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Parse settings from TOML text
    ///
    /// # Errors
    /// Fails on malformed TOML or wrongly typed values.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid settings")
    }

    /// Load `path`, or [`DEFAULT_CONFIG_FILE`] if present, or defaults
    ///
    /// # Errors
    /// Fails if an explicitly named file cannot be read, or any file does
    /// not parse.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read settings file {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }
}
