use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::domain::{VersionBump, VersioningStrategy};
use crate::error::{GitReleaseError, Result};

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "gitrelease.toml";
/// File name looked up in the user's config directory
pub const USER_CONFIG_FILE: &str = ".gitrelease.toml";

/// Represents the complete configuration for git-release-manager.
///
/// Contains the default project, the GitHub connection, per-feature settings
/// and behavior options. Every table is optional.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub features: FeaturesConfig,

    #[serde(default)]
    pub behavior: BehaviorConfig,
}

/// Project used when neither CLI flags nor an entity descriptor name one
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ProjectConfig {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub versioning_strategy: Option<VersioningStrategy>,
}

fn default_host() -> String {
    "github.com".to_string()
}

/// Connection to a GitHub (or GitHub Enterprise) instance
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitHubConfig {
    #[serde(default = "default_host")]
    pub host: String,

    /// Overrides the REST base URL derived from `host`
    pub api_base_url: Option<String>,

    /// Falls back to `GITHUB_TOKEN` / `GH_TOKEN` when unset
    pub token: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        GitHubConfig {
            host: default_host(),
            api_base_url: None,
            token: None,
        }
    }
}

/// Settings of a single feature
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct FeatureConfig {
    #[serde(default)]
    pub omit: bool,

    /// Script run after the feature's workflow succeeds
    pub on_success: Option<String>,

    /// Script that replaces the feature entirely
    pub command: Option<String>,
}

/// Per-feature settings keyed by `create_rc`, `promote_rc`, `patch` and `custom`
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct FeaturesConfig {
    #[serde(flatten)]
    pub entries: HashMap<String, FeatureConfig>,
}

impl FeaturesConfig {
    pub fn get(&self, name: &str) -> Option<&FeatureConfig> {
        self.entries.get(name)
    }
}

fn default_confirm() -> bool {
    true
}

/// Configuration for behavior customization.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BehaviorConfig {
    #[serde(default)]
    pub default_bump: VersionBump,

    /// Ask before mutating anything; `--force` skips the prompt
    #[serde(default = "default_confirm")]
    pub confirm: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        BehaviorConfig {
            default_bump: VersionBump::default(),
            confirm: default_confirm(),
        }
    }
}

/// Parse a configuration document
pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).map_err(|e| GitReleaseError::config(e.to_string()))
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `gitrelease.toml` in current directory
/// 3. `.gitrelease.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)
            .map_err(|e| GitReleaseError::config(format!("Cannot read {}: {}", path, e)))?
    } else if Path::new(LOCAL_CONFIG_FILE).exists() {
        fs::read_to_string(LOCAL_CONFIG_FILE)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(USER_CONFIG_FILE);
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    parse_config(&config_str)
}
