//! Package metadata and descriptors

use crate::props::{self, Properties};
use crate::version::{parse_dependencies, Dependency, Version};
use pmi_core::{Error, Result};
use serde::Serialize;

/// Metadata key holding the package name
pub const NAME_KEY: &str = "PackageName";
/// Metadata key holding the package version
pub const VERSION_KEY: &str = "Version";
/// Metadata key holding the dependency list
pub const DEPENDS_KEY: &str = "Depends";
/// Metadata key holding the archive location
pub const URL_KEY: &str = "PackageURL";
/// Metadata key holding the one-line title
pub const TITLE_KEY: &str = "Title";

/// Metadata of one package version, as published by the repository
#[derive(Debug, Clone, PartialEq)]
pub struct PackageMetadata {
    name: String,
    version: Version,
    dependencies: Vec<Dependency>,
    properties: Properties,
}

impl PackageMetadata {
    /// Build metadata from parsed properties
    pub fn from_properties(properties: Properties) -> Result<Self> {
        let name = properties
            .get(NAME_KEY)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::repository(format!("package metadata has no {}", NAME_KEY)))?;

        let version = properties
            .get(VERSION_KEY)
            .ok_or_else(|| {
                Error::repository(format!("metadata for '{}' has no {}", name, VERSION_KEY))
            })?
            .parse::<Version>()
            .map_err(|e| Error::repository(format!("metadata for '{}': {}", name, e)))?;

        let dependencies = match properties.get(DEPENDS_KEY) {
            Some(depends) => parse_dependencies(depends)
                .map_err(|e| Error::repository(format!("metadata for '{}': {}", name, e)))?,
            None => Vec::new(),
        };

        Ok(Self {
            name,
            version,
            dependencies,
            properties,
        })
    }

    /// Parse metadata from properties text
    pub fn parse(text: &str) -> Result<Self> {
        Self::from_properties(props::parse(text))
    }

    /// Package name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Package version
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Declared dependencies, including the base system entry if present
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Archive location, if published
    pub fn package_url(&self) -> Option<&str> {
        self.get(URL_KEY)
    }

    /// One-line title, if published
    pub fn title(&self) -> Option<&str> {
        self.get(TITLE_KEY)
    }

    /// Any metadata element by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// All metadata elements
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Whether this version can run on the given base toolkit version.
    ///
    /// A package that declares no base system dependency is compatible with
    /// every base version.
    pub fn is_compatible_base_system(&self, base: &Version) -> bool {
        self.dependencies
            .iter()
            .filter(|dep| dep.is_base_system())
            .all(|dep| dep.constraint.as_ref().map_or(true, |c| c.matches(base)))
    }
}

/// What is known about a package at the time of a resolution query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageDescriptor {
    /// Package name
    pub name: String,

    /// Installed version, if the package is installed
    pub installed_version: Option<String>,

    /// Versions offered by the repository, newest first
    pub available_versions: Vec<String>,

    /// Whether the described version works with the running base toolkit
    pub compatible: bool,
}

impl PackageDescriptor {
    /// Descriptor of an installed package
    pub fn installed(metadata: &PackageMetadata, base: &Version) -> Self {
        Self {
            name: metadata.name().to_string(),
            installed_version: Some(metadata.version().to_string()),
            available_versions: Vec::new(),
            compatible: metadata.is_compatible_base_system(base),
        }
    }

    /// Whether the package is installed
    pub fn is_installed(&self) -> bool {
        self.installed_version.is_some()
    }
}
