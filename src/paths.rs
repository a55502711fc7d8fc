//! Maps a repository identity onto its local mirror directory.

use std::path::{Path, PathBuf};

use path_clean::PathClean;
use tracing::debug;

use crate::error::{Error, Result};

/// Resolve the mirror directory for a repository: a plain join of base
/// path and repository name. Names carrying path separators or traversal
/// segments are rejected so the result cannot escape the base path.
pub fn repository_path(base_path: &Path, repository: &str) -> Result<PathBuf> {
    if repository.is_empty() {
        return Err(Error::Configuration(
            "repository name must not be empty".to_string(),
        ));
    }

    if repository.contains('/') || repository.contains('\\') || repository == ".." {
        return Err(Error::Configuration(format!(
            "repository name '{repository}' contains path segments"
        )));
    }

    let joined = base_path.join(repository).clean();
    if !joined.starts_with(base_path.clean()) {
        return Err(Error::Configuration(format!(
            "repository name '{repository}' escapes the base directory"
        )));
    }

    Ok(joined)
}

/// Create the directory with all missing parents. A directory that already
/// exists is not an error; creation is safe to call repeatedly.
pub async fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        debug!("Creating directory: {}", path.display());
    }

    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
}
