//! Shared error types for the application

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for couplemap operations
#[derive(Debug, Error)]
pub enum Error {
    /// No version-control root above the workspace; paths cannot be
    /// normalized, so the run is fatal before any report is written.
    #[error("repository root not found above '{0}' (no .git directory)")]
    RootNotFound(PathBuf),

    /// Workspace loading errors
    #[error("failed to load workspace '{path}': {message}")]
    Workspace { path: PathBuf, message: String },

    /// Manifest parsing or layout errors
    #[error("manifest error in '{path}': {message}")]
    Manifest { path: PathBuf, message: String },

    /// Source parsing errors
    #[error("parse error in {file}: {message}")]
    Parse { file: PathBuf, message: String },

    /// Per-type analysis errors (recovered at node granularity)
    #[error("analysis error: {0}")]
    Analysis(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML errors
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl Error {
    pub fn workspace(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Workspace {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn manifest(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Manifest {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn parse(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;
