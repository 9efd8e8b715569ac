//! Start-up dependency installation
//!
//! For each required package the installer checks the local registry, and if
//! the package is missing, walks the repository's version list (newest first)
//! until it finds a version compatible with the running base toolkit, then
//! installs it. Every package is handled independently: a failure is recorded
//! in the [`InstallReport`] and the next package is processed.

use crate::package::PackageDescriptor;
use crate::repository::{InstalledRegistry, PackageRepository};
use crate::version::Version;
use pmi_core::{Error, Result};
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What happened to one required package
#[derive(Debug)]
pub enum PackageOutcome {
    /// Already installed; the repository was not consulted
    AlreadyInstalled { version: Option<String> },

    /// Installed at the resolved version
    Installed { version: String },

    /// Resolution, lookup, or installation failed
    Failed(Error),
}

/// Outcome for one named package
#[derive(Debug)]
pub struct PackageReport {
    pub name: String,
    pub outcome: PackageOutcome,
}

/// Result of an [`ensure_installed`](DependencyInstaller::ensure_installed) run
#[derive(Debug)]
pub struct InstallReport {
    /// Per-package outcomes, in request order
    pub packages: Vec<PackageReport>,

    /// Outcome of the final load of all installed packages
    pub loaded: Result<Vec<PackageDescriptor>>,
}

impl InstallReport {
    /// Whether every package is available and loading succeeded
    pub fn is_success(&self) -> bool {
        self.loaded.is_ok() && self.failures().next().is_none()
    }

    /// Packages that could not be made available
    pub fn failures(&self) -> impl Iterator<Item = (&str, &Error)> {
        self.packages.iter().filter_map(|p| match &p.outcome {
            PackageOutcome::Failed(e) => Some((p.name.as_str(), e)),
            _ => None,
        })
    }

    /// Packages installed during this run, with their versions
    pub fn installed(&self) -> impl Iterator<Item = (&str, &str)> {
        self.packages.iter().filter_map(|p| match &p.outcome {
            PackageOutcome::Installed { version } => Some((p.name.as_str(), version.as_str())),
            _ => None,
        })
    }

    /// Outcome for a package by name
    pub fn outcome(&self, name: &str) -> Option<&PackageOutcome> {
        self.packages
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.outcome)
    }
}

/// Ensures required packages are installed at versions compatible with the
/// running base toolkit
pub struct DependencyInstaller {
    repository: Arc<dyn PackageRepository>,
    registry: Arc<dyn InstalledRegistry>,
    base_version: Version,
    output: Box<dyn Write + Send + Sync>,
}

impl DependencyInstaller {
    /// Create an installer writing install progress to stdout
    pub fn new(
        repository: Arc<dyn PackageRepository>,
        registry: Arc<dyn InstalledRegistry>,
        base_version: Version,
    ) -> Self {
        Self {
            repository,
            registry,
            base_version,
            output: Box::new(std::io::stdout()),
        }
    }

    /// Send install progress somewhere other than stdout
    pub fn with_output(mut self, output: Box<dyn Write + Send + Sync>) -> Self {
        self.output = output;
        self
    }

    /// Version of the running base toolkit
    pub fn base_version(&self) -> &Version {
        &self.base_version
    }

    /// Make every named package available, then load all installed packages.
    ///
    /// Never fails: per-package errors are logged and recorded in the report.
    pub async fn ensure_installed<S: AsRef<str>>(&mut self, package_names: &[S]) -> InstallReport {
        let mut packages = Vec::with_capacity(package_names.len());

        for name in package_names {
            let name = name.as_ref();
            let outcome = match self.ensure_one(name).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("[PMI] Unable to install package '{}': {}", name, e);
                    PackageOutcome::Failed(e)
                }
            };
            packages.push(PackageReport {
                name: name.to_string(),
                outcome,
            });
        }

        let loaded = self.registry.load_all(false).await;
        if let Err(e) = &loaded {
            warn!("[PMI] Failed to load installed packages: {}", e);
        }

        InstallReport { packages, loaded }
    }

    async fn ensure_one(&mut self, name: &str) -> Result<PackageOutcome> {
        if let Some(installed) = self.registry.installed_info(name).await? {
            info!(
                "[PMI] {} package is already installed ({})",
                name,
                installed.installed_version.as_deref().unwrap_or("unknown version")
            );
            return Ok(PackageOutcome::AlreadyInstalled {
                version: installed.installed_version,
            });
        }

        let version = self.resolve_latest_compatible_version(name).await?;
        info!(
            "[PMI] {} package is not installed - attempting to install version {}",
            name, version
        );
        self.repository
            .install(name, &version, self.output.as_mut())
            .await?;
        if let Err(e) = self.output.flush() {
            warn!("[PMI] Could not flush install output for {}: {}", name, e);
        }

        Ok(PackageOutcome::Installed { version })
    }

    /// Newest repository version of `package` compatible with the base toolkit.
    ///
    /// Versions are tried in the order the repository lists them, which is
    /// newest first; the list is not re-sorted. The returned string is the
    /// `Version` element of the matching metadata.
    pub async fn resolve_latest_compatible_version(&self, package: &str) -> Result<String> {
        let versions = self.repository.list_versions(package).await?;

        for version in &versions {
            let metadata = self.repository.metadata(package, version).await?;
            if metadata.is_compatible_base_system(&self.base_version) {
                debug!("{} {} is compatible with Weka {}", package, version, self.base_version);
                return Ok(metadata.version().to_string());
            }
            debug!("{} {} is not compatible with Weka {}", package, version, self.base_version);
        }

        Err(Error::no_compatible_version(package, &self.base_version))
    }

    /// Describe a package: installed version, repository versions, and whether
    /// any repository version is compatible with the base toolkit
    pub async fn describe(&self, package: &str) -> Result<PackageDescriptor> {
        let installed_version = self
            .registry
            .installed_info(package)
            .await?
            .and_then(|d| d.installed_version);

        let available_versions = self.repository.list_versions(package).await?;
        let compatible = match self.resolve_latest_compatible_version(package).await {
            Ok(_) => true,
            Err(Error::NoCompatibleVersion { .. }) => false,
            Err(e) => return Err(e),
        };

        Ok(PackageDescriptor {
            name: package.to_string(),
            installed_version,
            available_versions,
            compatible,
        })
    }
}
