//! End-to-end tests against a local package repository served over HTTP

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use pmi_core::Error;
use pmi_packages::http::VERSIONS_LISTING;
use pmi_packages::{
    DependencyInstaller, HttpRepository, InstalledRegistry, LifecycleListener, LocalPackageStore,
    LogSinkKind, PackageMetadata, PackageOutcome, PackageRepository, PluginConfig, PmiLifecycle,
    RepositoryConfig, Version,
};
use std::collections::HashMap;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

/// Package name -> versions newest first, each with its `Depends` line
type Catalogue = HashMap<&'static str, Vec<(&'static str, &'static str)>>;

#[derive(Clone)]
struct RepoState {
    catalogue: Arc<Catalogue>,
    base_url: String,
}

async fn package_file(
    State(state): State<RepoState>,
    Path((package, file)): Path<(String, String)>,
) -> Result<String, StatusCode> {
    let versions = state
        .catalogue
        .get(package.as_str())
        .ok_or(StatusCode::NOT_FOUND)?;

    if file == VERSIONS_LISTING {
        let listing: Vec<_> = versions.iter().map(|(v, _)| *v).collect();
        return Ok(listing.join("\n"));
    }

    let version = file.strip_suffix(".props").ok_or(StatusCode::NOT_FOUND)?;
    let (_, depends) = versions
        .iter()
        .find(|(v, _)| *v == version)
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(format!(
        "# {package} {version}\nPackageName={package}\nVersion={version}\nDepends={depends}\n\
         PackageURL={base}/archives/{package}-{version}.zip\n",
        package = package,
        version = version,
        depends = depends,
        base = state.base_url,
    ))
}

async fn archive(Path(file): Path<String>) -> Vec<u8> {
    let mut bytes = b"PK\x03\x04".to_vec();
    bytes.extend_from_slice(file.as_bytes());
    bytes
}

async fn spawn_repository(catalogue: Catalogue) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let state = RepoState {
        catalogue: Arc::new(catalogue),
        base_url: format!("http://{}", addr),
    };
    let app = Router::new()
        .route("/meta/:package/:file", get(package_file))
        .route("/archives/:file", get(archive))
        .with_state(state);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn catalogue() -> Catalogue {
    HashMap::from([
        (
            "RPlugin",
            vec![
                ("1.4.0", "weka (>=3.9.0)"),
                ("1.3.10", "weka (>=3.8.0|<3.9.0)"),
                ("1.3.0", "weka (>=3.8.0)"),
            ],
        ),
        ("LibSVM", vec![("1.0.10", "weka (>=3.7.5)")]),
        ("kerasZoo", vec![("1.0.0", "weka (>=3.9.0), wekaDeeplearning4j")]),
    ])
}

fn repository_config(addr: SocketAddr) -> RepositoryConfig {
    RepositoryConfig {
        url: format!("http://{}/meta/", addr),
        timeout_secs: 5,
    }
}

fn base() -> Version {
    "3.8.5".parse().unwrap()
}

#[derive(Clone, Default)]
struct SharedOutput(Arc<Mutex<Vec<u8>>>);

impl SharedOutput {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_http_repository_lookups() {
    let addr = spawn_repository(catalogue()).await;
    let dir = tempfile::tempdir().unwrap();
    let store = LocalPackageStore::new(dir.path(), base());
    let repo = HttpRepository::new(&repository_config(addr), store).unwrap();

    assert!(!repo.base_url().ends_with('/'));
    assert_eq!(
        repo.list_versions("RPlugin").await.unwrap(),
        vec!["1.4.0", "1.3.10", "1.3.0"]
    );

    let meta: PackageMetadata = repo.metadata("RPlugin", "1.3.10").await.unwrap();
    assert_eq!(meta.name(), "RPlugin");
    assert!(meta.is_compatible_base_system(&base()));
    assert!(meta
        .package_url()
        .unwrap()
        .ends_with("/archives/RPlugin-1.3.10.zip"));

    let err = repo.list_versions("noSuchPackage").await.unwrap_err();
    assert!(err.is_repository());
}

#[tokio::test]
async fn test_unreachable_repository() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dir = tempfile::tempdir().unwrap();
    let store = LocalPackageStore::new(dir.path(), base());
    let repo = HttpRepository::new(&repository_config(addr), store).unwrap();

    let err = repo.list_versions("LibSVM").await.unwrap_err();
    assert!(err.is_repository());
}

#[tokio::test]
async fn test_installer_writes_progress_and_records_install() {
    let addr = spawn_repository(catalogue()).await;
    let dir = tempfile::tempdir().unwrap();
    let store = LocalPackageStore::new(dir.path(), base());
    let repo = HttpRepository::new(&repository_config(addr), store.clone()).unwrap();

    let output = SharedOutput::default();
    let mut installer = DependencyInstaller::new(Arc::new(repo), Arc::new(store.clone()), base())
        .with_output(Box::new(output.clone()));

    let report = installer.ensure_installed(&["RPlugin"]).await;
    assert!(report.is_success());

    let progress = output.text();
    assert!(progress.contains("Downloading RPlugin 1.3.10"));
    assert!(progress.contains("Installed RPlugin 1.3.10"));

    let archive = std::fs::read(dir.path().join("RPlugin").join("RPlugin-1.3.10.zip")).unwrap();
    assert!(archive.starts_with(b"PK\x03\x04"));

    let info = store.installed_info("RPlugin").await.unwrap().unwrap();
    assert_eq!(info.installed_version.as_deref(), Some("1.3.10"));
}

#[tokio::test]
async fn test_lifecycle_init_installs_required_packages() {
    let addr = spawn_repository(catalogue()).await;
    let dir = tempfile::tempdir().unwrap();

    let mut config = PluginConfig {
        required_packages: vec![
            "wekaPython".to_string(),
            "RPlugin".to_string(),
            "LibSVM".to_string(),
            "kerasZoo".to_string(),
        ],
        packages_dir: dir.path().to_path_buf(),
        repository: repository_config(addr),
        ..PluginConfig::default()
    };
    config.logging.sink = LogSinkKind::None;

    // LibSVM is already present locally
    let store = LocalPackageStore::new(dir.path(), base());
    let libsvm =
        PackageMetadata::parse("PackageName=LibSVM\nVersion=1.0.8\nDepends=weka (>=3.7.5)\n")
            .unwrap();
    store.record_install(&libsvm, b"PK\x03\x04").await.unwrap();

    let lifecycle = PmiLifecycle::new(config).unwrap();
    let report = lifecycle.on_init().await;

    assert!(matches!(
        report.outcome("wekaPython"),
        Some(PackageOutcome::Failed(e)) if e.is_repository()
    ));
    assert!(matches!(
        report.outcome("RPlugin"),
        Some(PackageOutcome::Installed { version }) if version == "1.3.10"
    ));
    assert!(matches!(
        report.outcome("LibSVM"),
        Some(PackageOutcome::AlreadyInstalled { version: Some(v) }) if v == "1.0.8"
    ));
    assert!(matches!(
        report.outcome("kerasZoo"),
        Some(PackageOutcome::Failed(Error::NoCompatibleVersion { .. }))
    ));

    let loaded: Vec<_> = report
        .loaded
        .as_ref()
        .unwrap()
        .iter()
        .map(|d| d.name.as_str())
        .collect();
    assert_eq!(loaded, vec!["LibSVM", "RPlugin"]);

    lifecycle.on_shutdown().await;
}
