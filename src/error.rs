/// Crate-level error types for docforge diagnostics.
use std::path::PathBuf;

/// Top-level failures only. Per-file problems during discovery are logged
/// and degrade the affected record instead of surfacing here.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The documentation root is missing or is not a directory.
    #[error("documentation directory not found: {}", path.display())]
    DocsDirNotFound {
        /// Directory that was expected to hold the documentation sources.
        path: PathBuf,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// `.docforge.toml` exists but is not valid.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// Output format name not recognised.
    #[error("unknown output format: `{format}`")]
    UnknownFormat {
        /// The format string as given on the command line.
        format: String,
    },

    /// The filesystem watcher could not be set up.
    #[error("watch failed: {reason}")]
    Watch {
        /// Description of the watcher failure.
        reason: String,
    },

    /// YAML serialization failed.
    #[error("yaml: {0}")]
    Yaml(
        /// The wrapped YAML error.
        #[from]
        serde_yaml::Error,
    ),
}
