//! Error types for the PMI plugin

/// Result type alias using the plugin's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for PMI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No repository version of a package works with the running toolkit
    #[error("was unable to find a version of '{package}' that is compatible with Weka {base_version}")]
    NoCompatibleVersion {
        package: String,
        base_version: String,
    },

    /// Package repository lookup or transfer failed
    #[error("package repository unavailable: {0}")]
    RepositoryUnavailable(String),

    /// The factory could not classify the wrapped model
    #[error("unsupported model type: {0}")]
    UnsupportedModelType(String),

    /// Failure while classifying or computing a distribution
    #[error("scoring error: {0}")]
    Scoring(String),

    /// `update` called on a model that cannot learn incrementally
    #[error("model '{0}' is not incremental")]
    NotIncremental(String),

    /// Batch scoring called on a model without batch support
    #[error("model '{0}' cannot score in batches")]
    NotBatchCapable(String),

    /// Scoring call issued after the run was finished with `done()`
    #[error("scoring run already finished for model '{0}'")]
    ScorerFinished(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new no-compatible-version error
    pub fn no_compatible_version(package: impl Into<String>, base_version: impl ToString) -> Self {
        Self::NoCompatibleVersion {
            package: package.into(),
            base_version: base_version.to_string(),
        }
    }

    /// Create a new repository error
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::RepositoryUnavailable(msg.into())
    }

    /// Create a new scoring error
    pub fn scoring(msg: impl Into<String>) -> Self {
        Self::Scoring(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error came from talking to the package repository
    pub fn is_repository(&self) -> bool {
        matches!(self, Self::RepositoryUnavailable(_))
    }
}
