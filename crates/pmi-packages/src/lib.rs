//! PMI Packages
//!
//! Start-up support for the PMI plugin: makes sure the toolkit packages the
//! plugin depends on are installed, at the newest version compatible with the
//! running base toolkit.
//!
//! This crate provides:
//! - Version parsing and `Depends` constraint matching
//! - An HTTP client for the package metadata repository
//! - A filesystem registry of installed packages
//! - The [`DependencyInstaller`] and the lifecycle listener that drives it

pub mod config;
pub mod http;
pub mod installer;
pub mod lifecycle;
pub mod package;
pub mod props;
pub mod repository;
pub mod store;
pub mod version;

pub use config::{LogSinkKind, LoggingConfig, PluginConfig, RepositoryConfig};
pub use http::HttpRepository;
pub use installer::{DependencyInstaller, InstallReport, PackageOutcome, PackageReport};
pub use lifecycle::{init_tracing, LifecycleListener, PmiLifecycle, ToolkitEnvironment};
pub use package::{PackageDescriptor, PackageMetadata};
pub use repository::{InstalledRegistry, PackageRepository};
pub use store::LocalPackageStore;
pub use version::{Dependency, Version, VersionConstraint};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::installer::{DependencyInstaller, InstallReport, PackageOutcome};
    pub use crate::lifecycle::{LifecycleListener, PmiLifecycle};
    pub use crate::package::PackageDescriptor;
    pub use crate::repository::{InstalledRegistry, PackageRepository};
    pub use crate::version::Version;
    pub use pmi_core::prelude::*;
}
