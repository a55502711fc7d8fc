//! Per-repository synchronizer: owns one local mirror and drives the
//! clone / pull / forced-reset lifecycle against it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::config::RepositoryDescriptor;
use crate::error::{Error, GitError, Result};
use crate::git::GitClient;
use crate::paths;
use crate::url::FetchUrl;

/// What a successful synchronization did to the mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// The repository was cloned fresh.
    Cloned,
    /// An existing working copy was pulled.
    Pulled,
}

/// Synchronizes one repository into its local mirror directory.
///
/// Construction ensures the mirror directory exists and binds the git
/// client to it; no git command runs before that. The descriptor is never
/// mutated; only the mirror directory contents are.
pub struct RepositoryMirror {
    descriptor: RepositoryDescriptor,
    fetch_url: FetchUrl,
    base_path: PathBuf,
    local_path: PathBuf,
    git: Arc<dyn GitClient>,
}

impl std::fmt::Debug for RepositoryMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // FetchUrl's Debug is masked; the git binding carries no state worth printing.
        f.debug_struct("RepositoryMirror")
            .field("repository", &self.descriptor.repository)
            .field("fetch_url", &self.fetch_url)
            .field("local_path", &self.local_path)
            .finish()
    }
}

impl RepositoryMirror {
    pub async fn new(
        descriptor: RepositoryDescriptor,
        fetch_url: FetchUrl,
        base_path: &Path,
        git: Arc<dyn GitClient>,
    ) -> Result<Self> {
        descriptor.validate()?;

        let local_path = paths::repository_path(base_path, &descriptor.repository)?;
        paths::ensure_directory(&local_path).await?;

        Ok(Self {
            descriptor,
            fetch_url,
            base_path: base_path.to_path_buf(),
            local_path,
            git,
        })
    }

    pub fn repository(&self) -> &str {
        &self.descriptor.repository
    }

    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    pub fn fetch_url(&self) -> &FetchUrl {
        &self.fetch_url
    }

    /// Probe whether the mirror directory is a valid working copy. Any
    /// status failure (absent, empty, corrupted) counts as "not a clone".
    pub async fn is_git_repository(&self) -> bool {
        self.git.status(&self.local_path).await.is_ok()
    }

    /// Synchronize: pull an existing working copy, clone otherwise.
    pub async fn sync(&self) -> Result<SyncAction> {
        let outcome = if self.is_git_repository().await {
            self.pull().await.map(|()| SyncAction::Pulled)
        } else {
            self.clone_fresh().await.map(|()| SyncAction::Cloned)
        };

        outcome.map_err(|source| {
            error!(
                "Error syncing repository {}: {}",
                self.descriptor.repository, source
            );
            Error::Sync {
                repository: self.descriptor.repository.clone(),
                source,
            }
        })
    }

    /// Destructive variant: an existing working copy is fetched, hard-reset
    /// to the remote branch, then pulled. A failure anywhere in that
    /// sequence aborts it and is reported as a gateway-class error, since
    /// it may mean the remote was unreachable mid-reset. The no-clone path
    /// is an ordinary clone with ordinary classification.
    pub async fn force_sync(&self) -> Result<SyncAction> {
        if self.is_git_repository().await {
            self.force_pull().await.map(|()| SyncAction::Pulled).map_err(
                |source| {
                    error!(
                        "Error force syncing repository {}: {}",
                        self.descriptor.repository, source
                    );
                    Error::ForceSync {
                        repository: self.descriptor.repository.clone(),
                        source,
                    }
                },
            )
        } else {
            self.clone_fresh()
                .await
                .map(|()| SyncAction::Cloned)
                .map_err(|source| {
                    error!(
                        "Error syncing repository {}: {}",
                        self.descriptor.repository, source
                    );
                    Error::Sync {
                        repository: self.descriptor.repository.clone(),
                        source,
                    }
                })
        }
    }

    async fn pull(&self) -> std::result::Result<(), GitError> {
        info!("Pulling repository: {}", self.descriptor.repository);
        self.git
            .pull(&self.local_path, "origin", &self.descriptor.branch)
            .await
    }

    async fn clone_fresh(&self) -> std::result::Result<(), GitError> {
        info!("Cloning repository: {}", self.descriptor.repository);
        // Display on FetchUrl masks embedded credentials.
        debug!("Cloning from URL: {}", self.fetch_url);

        self.git
            .clone_repository(
                &self.fetch_url,
                &self.base_path,
                &self.descriptor.repository,
                &self.descriptor.branch,
            )
            .await
    }

    async fn force_pull(&self) -> std::result::Result<(), GitError> {
        info!("Force syncing repository: {}", self.descriptor.repository);

        self.git
            .fetch(
                &self.local_path,
                vec!["--all".to_string(), "--prune".to_string()],
            )
            .await?;
        self.git
            .reset(
                &self.local_path,
                vec!["--hard".to_string()],
                &format!("origin/{}", self.descriptor.branch),
            )
            .await?;
        self.git
            .pull(&self.local_path, "origin", &self.descriptor.branch)
            .await
    }
}
