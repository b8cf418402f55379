//! Error types for dir2json
//!
//! Uses `thiserror` for library errors. Fatal errors abort only the build of
//! the affected virtual module; session state for other modules is untouched.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for dir2json operations
pub type Dir2jsonResult<T> = Result<T, Dir2jsonError>;

/// Main error type for dir2json operations
#[derive(Error, Debug)]
pub enum Dir2jsonError {
    /// Requested root directory does not exist at build time
    #[error("directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    /// Name collision under the strict collision policy
    #[error("files and directories with the same name are not allowed in the same directory: {path}")]
    KeyCollision { path: String },

    /// IO error (mid-walk failures, watcher setup, artifact writes)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML config parsing error
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
}
