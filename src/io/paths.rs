use std::path::{Path, PathBuf};

use crate::core::{Error, Result};

/// Directory name marking the repository root.
const VCS_MARKER: &str = ".git";

/// The resolved version-control root, discovered once per run and reused for
/// all path normalization. Paths in the report are relative to this root,
/// which keeps reports stable across machines and checkouts.
#[derive(Debug, Clone)]
pub struct RepoRoot {
    root: PathBuf,
}

impl RepoRoot {
    /// Wrap a known root directory (used by tests and in-memory pipelines).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Walk upward from `start` (a file or directory) until a directory
    /// containing a `.git` marker is found. Reaching the filesystem root
    /// without one is fatal: paths cannot be normalized.
    pub fn discover(start: &Path) -> Result<Self> {
        let start = start
            .canonicalize()
            .map_err(|_| Error::RootNotFound(start.to_path_buf()))?;
        let mut dir: &Path = if start.is_file() {
            start.parent().ok_or_else(|| Error::RootNotFound(start.clone()))?
        } else {
            &start
        };

        loop {
            if dir.join(VCS_MARKER).is_dir() {
                return Ok(Self {
                    root: dir.to_path_buf(),
                });
            }
            match dir.parent() {
                Some(parent) => dir = parent,
                None => return Err(Error::RootNotFound(start.clone())),
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Strip the root prefix, yielding a forward-slash repo-relative path.
    /// Paths outside the root pass through unchanged.
    pub fn normalize(&self, path: &Path) -> String {
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        match canonical.strip_prefix(&self.root) {
            Ok(rel) => rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/"),
            Err(_) => canonical.to_string_lossy().into_owned(),
        }
    }
}
