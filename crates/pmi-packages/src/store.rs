//! Filesystem registry of installed packages
//!
//! Layout, one directory per package:
//!
//! ```text
//! <root>/
//!   LibSVM/
//!     Description.props
//!     LibSVM-1.0.10.zip
//! ```

use crate::package::{PackageDescriptor, PackageMetadata};
use crate::props;
use crate::repository::InstalledRegistry;
use crate::version::Version;
use async_trait::async_trait;
use pmi_core::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File holding an installed package's metadata
pub const DESCRIPTION_FILE: &str = "Description.props";

/// Installed packages kept under a root directory
#[derive(Debug, Clone)]
pub struct LocalPackageStore {
    root: PathBuf,
    base_version: Version,
}

impl LocalPackageStore {
    /// Create a store rooted at `root`, judging compatibility against `base_version`
    pub fn new(root: impl Into<PathBuf>, base_version: Version) -> Self {
        Self {
            root: root.into(),
            base_version,
        }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of one package
    pub fn package_dir(&self, package: &str) -> Result<PathBuf> {
        let valid = !package.is_empty()
            && package != "."
            && package != ".."
            && !package.contains(['/', '\\']);
        if !valid {
            return Err(Error::config(format!("invalid package name '{}'", package)));
        }
        Ok(self.root.join(package))
    }

    /// Read the metadata of an installed package
    pub async fn read_metadata(&self, package: &str) -> Result<Option<PackageMetadata>> {
        let path = self.package_dir(package)?.join(DESCRIPTION_FILE);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => PackageMetadata::parse(&text)
                .map(Some)
                .map_err(|e| Error::internal(format!("{}: {}", path.display(), e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Record a freshly downloaded package: its archive plus its metadata
    pub async fn record_install(&self, metadata: &PackageMetadata, archive: &[u8]) -> Result<PathBuf> {
        let dir = self.package_dir(metadata.name())?;
        tokio::fs::create_dir_all(&dir).await?;

        let archive_path = dir.join(format!("{}-{}.zip", metadata.name(), metadata.version()));
        tokio::fs::write(&archive_path, archive).await?;
        tokio::fs::write(dir.join(DESCRIPTION_FILE), props::render(metadata.properties())).await?;

        debug!(
            package = metadata.name(),
            version = %metadata.version(),
            path = %dir.display(),
            "Recorded package install"
        );
        Ok(dir)
    }
}

#[async_trait]
impl InstalledRegistry for LocalPackageStore {
    async fn installed_info(&self, package: &str) -> Result<Option<PackageDescriptor>> {
        Ok(self
            .read_metadata(package)
            .await?
            .map(|meta| PackageDescriptor::installed(&meta, &self.base_version)))
    }

    async fn load_all(&self, verbose: bool) -> Result<Vec<PackageDescriptor>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(root = %self.root.display(), "Package directory does not exist yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut loaded = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();

            let meta = match self.read_metadata(&name).await {
                Ok(Some(meta)) => meta,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Skipping package '{}': {}", name, e);
                    continue;
                }
            };

            let descriptor = PackageDescriptor::installed(&meta, &self.base_version);
            if !descriptor.compatible {
                warn!(
                    "Skipping package '{}' {}: not compatible with Weka {}",
                    name,
                    meta.version(),
                    self.base_version
                );
                continue;
            }

            if verbose {
                info!("Loading package {} {}", name, meta.version());
            }
            loaded.push(descriptor);
        }

        loaded.sort_by(|a, b| a.name.cmp(&b.name));
        info!("Loaded {} installed packages", loaded.len());
        Ok(loaded)
    }
}
