//! Plugin lifecycle hooks
//!
//! The host calls [`LifecycleListener::on_init`] once when the plugin is
//! loaded and [`LifecycleListener::on_shutdown`] when it is unloaded.

use crate::config::{LogSinkKind, LoggingConfig, PluginConfig};
use crate::http::HttpRepository;
use crate::installer::{DependencyInstaller, InstallReport};
use crate::repository::{InstalledRegistry, PackageRepository};
use crate::store::LocalPackageStore;
use crate::version::Version;
use async_trait::async_trait;
use pmi_core::Result;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Hooks the host invokes around the plugin's lifetime
#[async_trait]
pub trait LifecycleListener: Send + Sync {
    /// Called once at start-up
    async fn on_init(&self) -> InstallReport;

    /// Called once at shutdown
    async fn on_shutdown(&self);
}

/// Toolkit facts other components read at start-up
#[derive(Debug, Clone, Serialize)]
pub struct ToolkitEnvironment {
    /// Version of the running base toolkit
    pub base_version: Version,

    /// Toolkit binary filename for the distributed execution engine
    pub toolkit_archive: String,

    /// Directory holding installed packages
    pub packages_dir: PathBuf,
}

/// Lifecycle listener that makes the plugin's required packages available
pub struct PmiLifecycle {
    config: PluginConfig,
    repository: Arc<dyn PackageRepository>,
    registry: Arc<dyn InstalledRegistry>,
}

impl PmiLifecycle {
    /// Build a listener backed by the HTTP repository and the local package store
    pub fn new(config: PluginConfig) -> Result<Self> {
        config.validate()?;

        let store = LocalPackageStore::new(&config.packages_dir, config.base_version.clone());
        let repository = HttpRepository::new(&config.repository, store.clone())?;

        Ok(Self {
            config,
            repository: Arc::new(repository),
            registry: Arc::new(store),
        })
    }

    /// Build a listener over caller-supplied repository and registry
    pub fn with_components(
        config: PluginConfig,
        repository: Arc<dyn PackageRepository>,
        registry: Arc<dyn InstalledRegistry>,
    ) -> Self {
        Self {
            config,
            repository,
            registry,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    /// Toolkit facts derived from the configuration
    pub fn environment(&self) -> ToolkitEnvironment {
        ToolkitEnvironment {
            base_version: self.config.base_version.clone(),
            toolkit_archive: self.config.toolkit_archive.clone(),
            packages_dir: self.config.packages_dir.clone(),
        }
    }

    /// Installer bound to this listener's repository and registry
    pub fn installer(&self) -> DependencyInstaller {
        DependencyInstaller::new(
            self.repository.clone(),
            self.registry.clone(),
            self.config.base_version.clone(),
        )
    }
}

#[async_trait]
impl LifecycleListener for PmiLifecycle {
    async fn on_init(&self) -> InstallReport {
        if self.config.logging.sink == LogSinkKind::Console {
            init_tracing(&self.config.logging);
        }

        let env = self.environment();
        info!(
            "[PMI] Starting with Weka {} ({}), packages in {}",
            env.base_version,
            env.toolkit_archive,
            env.packages_dir.display()
        );

        let report = self
            .installer()
            .ensure_installed(self.config.required_packages.as_slice())
            .await;

        let failed = report.failures().count();
        if failed == 0 {
            info!(
                "[PMI] {} required packages available",
                report.packages.len()
            );
        } else {
            warn!(
                "[PMI] {} of {} required packages are unavailable",
                failed,
                report.packages.len()
            );
        }

        report
    }

    async fn on_shutdown(&self) {
        debug!("[PMI] Shutting down");
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured filter. Returns `false` if
/// a subscriber was already installed, which leaves it in place.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("pmi=info"));

    let (plain, json) = if config.json {
        (None, Some(fmt::layer().json()))
    } else {
        (Some(fmt::layer()), None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(json)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_from_config() {
        let config = PluginConfig {
            packages_dir: PathBuf::from("/opt/weka/packages"),
            ..PluginConfig::default()
        };
        let lifecycle = PmiLifecycle::new(config).unwrap();

        let env = lifecycle.environment();
        assert_eq!(env.base_version.to_string(), "3.8.5");
        assert_eq!(env.toolkit_archive, "weka-stable-3.8.5.jar");
        assert_eq!(env.packages_dir, PathBuf::from("/opt/weka/packages"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = PluginConfig::default();
        config.repository.url = String::new();
        assert!(PmiLifecycle::new(config).is_err());
    }

    #[test]
    fn test_init_tracing_is_idempotent() {
        let config = LoggingConfig::default();
        init_tracing(&config);
        assert!(!init_tracing(&config));
    }
}
