//! Build configuration
//!
//! Builds are configured in code through [`crate::FixtureBuilder::with_config`]
//! or from a JSON file, so a test suite can share one policy without
//! recompiling. Every key is optional; missing keys take their defaults.
//!
//! ```json
//! { "designator": "Fixture", "allocate_missing": true }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::classify::DEFAULT_DESIGNATOR;

/// Environment variable naming a JSON config file for [`BuildConfig::from_env`].
pub const CONFIG_ENV_VAR: &str = "FIXTURE_GRAPH_CONFIG";

/// Fixture build policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Type-name suffix the default classifier treats as a fixture
    pub designator: String,
    /// Fill nil handle fields with a default instance. When off, nil handles
    /// stay nil and contribute no-op hooks.
    pub allocate_missing: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            designator: DEFAULT_DESIGNATOR.to_string(),
            allocate_missing: true,
        }
    }
}

impl BuildConfig {
    /// Load configuration from a JSON file
    ///
    /// # Returns
    /// * `Ok(BuildConfig)` - Parsed configuration
    /// * `Err` - If the file can't be read or the JSON is invalid
    pub fn try_load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading build config {}", path.display()))?;
        let config = serde_json::from_str(&contents)
            .with_context(|| format!("parsing build config {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration from a JSON file, falling back to defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match Self::try_load_from_file(&path) {
            Ok(config) => {
                log::info!("[Config] Loaded build configuration from {:?}", path.as_ref());
                config
            }
            Err(err) => {
                log::warn!("[Config] {:#}. Using defaults.", err);
                Self::default()
            }
        }
    }

    /// Load from the file named by `FIXTURE_GRAPH_CONFIG`, or use defaults
    /// when the variable is unset.
    pub fn from_env() -> Self {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) => Self::load_from_file(path),
            Err(_) => Self::default(),
        }
    }
}
