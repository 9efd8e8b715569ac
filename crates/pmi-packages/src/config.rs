//! Plugin configuration

use crate::version::Version;
use pmi_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Packages the plugin needs, in installation order
pub const DEFAULT_REQUIRED_PACKAGES: &[&str] = &[
    "wekaPython",
    "RPlugin",
    "LibSVM",
    "distributedWekaBase",
    "distributedWekaSpark2Dev",
    "wekaDeeplearning4j",
    "kerasZoo",
];

/// Plugin configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Version of the running base toolkit
    #[serde(default = "default_base_version")]
    pub base_version: Version,

    /// Packages to ensure at start-up, in order
    #[serde(default = "default_required_packages")]
    pub required_packages: Vec<String>,

    /// Toolkit binary filename, used by the distributed execution engine to
    /// locate its own archive
    #[serde(default = "default_toolkit_archive")]
    pub toolkit_archive: String,

    /// Directory holding installed packages
    #[serde(default = "default_packages_dir")]
    pub packages_dir: PathBuf,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Package repository configuration
    #[serde(default)]
    pub repository: RepositoryConfig,
}

impl PluginConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file if it exists, otherwise use defaults
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.repository.url.trim().is_empty() {
            return Err(Error::config("repository url must not be empty"));
        }
        if self.repository.timeout_secs == 0 {
            return Err(Error::config("repository timeout_secs must be positive"));
        }
        if let Some(bad) = self
            .required_packages
            .iter()
            .find(|name| name.trim().is_empty() || name.contains(['/', '\\']))
        {
            return Err(Error::config(format!("invalid package name '{}'", bad)));
        }
        Ok(())
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            base_version: default_base_version(),
            required_packages: default_required_packages(),
            toolkit_archive: default_toolkit_archive(),
            packages_dir: default_packages_dir(),
            logging: LoggingConfig::default(),
            repository: RepositoryConfig::default(),
        }
    }
}

/// Where start-up log output goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogSinkKind {
    /// Human readable output on the console
    #[default]
    Console,
    /// Leave subscriber set-up to the host
    None,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log sink
    #[serde(default)]
    pub sink: LogSinkKind,

    /// Filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Emit JSON lines instead of plain text
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            sink: LogSinkKind::Console,
            filter: default_filter(),
            json: false,
        }
    }
}

/// Package repository configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Base URL of the package metadata repository
    #[serde(default = "default_repository_url")]
    pub url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            url: default_repository_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_version() -> Version {
    Version::from_components(&[3, 8, 5])
}

fn default_required_packages() -> Vec<String> {
    DEFAULT_REQUIRED_PACKAGES.iter().map(|s| s.to_string()).collect()
}

fn default_toolkit_archive() -> String {
    "weka-stable-3.8.5.jar".to_string()
}

fn default_packages_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wekafiles")
        .join("packages")
}

fn default_filter() -> String {
    "pmi=info".to_string()
}

fn default_repository_url() -> String {
    "https://weka.sourceforge.io/packageMetaData".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
