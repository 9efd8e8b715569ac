//! HTTP client for the package metadata repository
//!
//! Repository layout:
//!
//! ```text
//! {url}/{package}/versionsListing.txt  one version per line, newest first
//! {url}/{package}/{version}.props      per-version metadata
//! ```

use crate::config::RepositoryConfig;
use crate::package::PackageMetadata;
use crate::repository::PackageRepository;
use crate::store::LocalPackageStore;
use async_trait::async_trait;
use pmi_core::{Error, Result};
use std::io::Write;
use std::time::Duration;
use tracing::debug;

/// Per-package file listing the published versions
pub const VERSIONS_LISTING: &str = "versionsListing.txt";

/// Package repository reached over HTTP(S)
pub struct HttpRepository {
    client: reqwest::Client,
    base_url: String,
    store: LocalPackageStore,
}

impl HttpRepository {
    /// Create a repository client; installs are recorded in `store`
    pub fn new(config: &RepositoryConfig, store: LocalPackageStore) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("pmi-packages/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            store,
        })
    }

    /// Repository base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn package_url(&self, package: &str, file: &str) -> String {
        format!("{}/{}/{}", self.base_url, package, file)
    }

    async fn fetch(&self, url: &str) -> Result<reqwest::Response> {
        debug!("GET {}", url);
        self.client
            .get(url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| Error::repository(format!("{}: {}", url, e)))
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.fetch(url)
            .await?
            .text()
            .await
            .map_err(|e| Error::repository(format!("{}: {}", url, e)))
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.fetch(url)
            .await?
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| Error::repository(format!("{}: {}", url, e)))
    }
}

#[async_trait]
impl PackageRepository for HttpRepository {
    async fn list_versions(&self, package: &str) -> Result<Vec<String>> {
        let text = self.fetch_text(&self.package_url(package, VERSIONS_LISTING)).await?;
        Ok(parse_version_list(&text))
    }

    async fn metadata(&self, package: &str, version: &str) -> Result<PackageMetadata> {
        let text = self
            .fetch_text(&self.package_url(package, &format!("{}.props", version)))
            .await?;
        PackageMetadata::parse(&text)
    }

    async fn install(
        &self,
        package: &str,
        version: &str,
        output: &mut (dyn Write + Send),
    ) -> Result<()> {
        let metadata = self.metadata(package, version).await?;
        let archive_url = metadata.package_url().ok_or_else(|| {
            Error::repository(format!("{} {} has no download location", package, version))
        })?;

        writeln!(output, "[PMI] Downloading {} {} from {}", package, version, archive_url)?;
        let archive = self.fetch_bytes(archive_url).await?;

        let dir = self.store.record_install(&metadata, &archive).await?;
        writeln!(output, "[PMI] Installed {} {} into {}", package, version, dir.display())?;
        Ok(())
    }
}

/// Parse a `versionsListing.txt` listing, keeping the repository's order
pub fn parse_version_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_layout() {
        let dir = std::env::temp_dir().join("pmi-layout");
        let store = LocalPackageStore::new(dir, "3.8.5".parse().unwrap());
        let config = RepositoryConfig {
            url: "https://weka.sourceforge.io/packageMetaData/".to_string(),
            timeout_secs: 5,
        };
        let repo = HttpRepository::new(&config, store).unwrap();

        assert_eq!(
            repo.package_url("LibSVM", VERSIONS_LISTING),
            "https://weka.sourceforge.io/packageMetaData/LibSVM/versionsListing.txt"
        );
        assert_eq!(
            repo.package_url("LibSVM", "1.0.10.props"),
            "https://weka.sourceforge.io/packageMetaData/LibSVM/1.0.10.props"
        );
    }

    #[test]
    fn test_version_list_keeps_order() {
        let listing = "# versions of RPlugin\n1.3.10\n\n1.2.3\n 1.3.0 \n";
        assert_eq!(parse_version_list(listing), vec!["1.3.10", "1.2.3", "1.3.0"]);
    }
}
