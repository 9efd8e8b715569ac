//! Extension points for the package repository and the installed-package registry

use crate::package::{PackageDescriptor, PackageMetadata};
use async_trait::async_trait;
use pmi_core::Result;
use std::io::Write;

/// Remote listing of installable packages.
///
/// Implement this trait to point the installer at a different repository
/// layout or transport.
#[async_trait]
pub trait PackageRepository: Send + Sync {
    /// Versions available for a package, newest first
    async fn list_versions(&self, package: &str) -> Result<Vec<String>>;

    /// Metadata for one package version
    async fn metadata(&self, package: &str, version: &str) -> Result<PackageMetadata>;

    /// Download and install one package version, writing progress to `output`
    async fn install(
        &self,
        package: &str,
        version: &str,
        output: &mut (dyn Write + Send),
    ) -> Result<()>;
}

/// Local record of installed packages
#[async_trait]
pub trait InstalledRegistry: Send + Sync {
    /// Descriptor of the installed package, or `None` if not installed
    async fn installed_info(&self, package: &str) -> Result<Option<PackageDescriptor>>;

    /// Load every installed package, returning the ones that were loaded
    async fn load_all(&self, verbose: bool) -> Result<Vec<PackageDescriptor>>;
}
