use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::markdown::DocNaming;

const APP_NAME: &str = "rover";
const CONFIG_FILE: &str = "config.json";

/// Default system instruction sent with every enrichment request.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You specialize in generating Mermaid Markdown syntax for source code projects.";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub enrichment: EnrichmentConfig,
    pub walk: WalkConfig,
}

/// Settings for the text-generation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Full URL of the text-generation endpoint (from ROVER_ENDPOINT)
    pub endpoint: Option<String>,
    /// Bearer token (from ROVER_API_TOKEN)
    pub api_token: Option<String>,
    /// Per-request timeout in seconds (from ROVER_TIMEOUT_SECS)
    pub timeout_secs: u64,
    /// Retries after the first attempt for transient failures (from ROVER_MAX_RETRIES)
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub system_prompt: String,
    /// Language tag of the appended diagram fence.
    pub diagram_tag: String,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_token: None,
            timeout_secs: 60,
            max_retries: 2,
            base_delay_ms: 500,
            max_delay_ms: 8_000,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            diagram_tag: "mermaid".to_string(),
        }
    }
}

impl EnrichmentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Settings for the directory walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    /// Name of the per-directory ignore-rule file.
    pub ignore_file_name: String,
    /// Directory names that are never descended into.
    pub exclude_dirs: Vec<String>,
    pub naming: DocNaming,
    /// Stop at the first failing file instead of collecting failures.
    pub fail_fast: bool,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            ignore_file_name: ".gitignore".to_string(),
            exclude_dirs: vec![".git".to_string()],
            naming: DocNaming::default(),
            fail_fast: false,
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from the user's config directory
    /// when no path is given, then apply environment overrides.
    ///
    /// An explicit path must exist. The default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match get_config_path() {
                Ok(default_path) if default_path.exists() => Self::from_file(&default_path)?,
                _ => Self::default(),
            },
        };
        config.apply_env();
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(config)
    }

    fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from a key lookup. Unparseable numbers are ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup("ROVER_ENDPOINT") {
            self.enrichment.endpoint = Some(endpoint);
        }
        if let Some(token) = lookup("ROVER_API_TOKEN") {
            self.enrichment.api_token = Some(token);
        }
        if let Some(secs) = lookup("ROVER_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            self.enrichment.timeout_secs = secs;
        }
        if let Some(retries) = lookup("ROVER_MAX_RETRIES").and_then(|s| s.parse().ok()) {
            self.enrichment.max_retries = retries;
        }
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
