/// Common test utilities and helpers for repomirror integration tests
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;

use repomirror::{
    AuthConfig, Config, FetchUrl, GitClient, GitError, RepositoryDescriptor,
};

/// One recorded invocation against the scripted git capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCall {
    Status(PathBuf),
    Clone {
        url: String,
        target: String,
        branch: String,
    },
    Pull {
        dir: PathBuf,
        remote: String,
        branch: String,
    },
    Fetch {
        dir: PathBuf,
        flags: Vec<String>,
    },
    Reset {
        dir: PathBuf,
        flags: Vec<String>,
        target: String,
    },
}

/// Scripted [`GitClient`] for integration tests: records every call and
/// answers the status probe from a configured set of valid mirrors.
#[derive(Default)]
pub struct ScriptedGit {
    calls: Mutex<Vec<GitCall>>,
    valid_mirrors: HashSet<String>,
    failing_pulls: HashSet<String>,
    failing_fetches: HashSet<String>,
}

impl ScriptedGit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a repository directory as a valid working copy.
    pub fn with_valid_mirror(mut self, repository: &str) -> Self {
        self.valid_mirrors.insert(repository.to_string());
        self
    }

    /// Make pulls inside the given repository directory fail.
    pub fn with_failing_pull(mut self, repository: &str) -> Self {
        self.failing_pulls.insert(repository.to_string());
        self
    }

    /// Make fetches inside the given repository directory fail.
    pub fn with_failing_fetch(mut self, repository: &str) -> Self {
        self.failing_fetches.insert(repository.to_string());
        self
    }

    pub fn calls(&self) -> Vec<GitCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: GitCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn mirror_name(dir: &Path) -> String {
        dir.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn failure(command: &str) -> GitError {
        GitError::Command {
            command: command.to_string(),
            stderr: format!("scripted {command} failure"),
        }
    }
}

#[async_trait]
impl GitClient for ScriptedGit {
    async fn status(&self, dir: &Path) -> Result<(), GitError> {
        self.record(GitCall::Status(dir.to_path_buf()));

        if self.valid_mirrors.contains(&Self::mirror_name(dir)) {
            Ok(())
        } else {
            Err(Self::failure("status"))
        }
    }

    async fn clone_repository(
        &self,
        url: &FetchUrl,
        _base_dir: &Path,
        target_dir: &str,
        branch: &str,
    ) -> Result<(), GitError> {
        self.record(GitCall::Clone {
            url: url.as_str().to_string(),
            target: target_dir.to_string(),
            branch: branch.to_string(),
        });
        Ok(())
    }

    async fn pull(&self, dir: &Path, remote: &str, branch: &str) -> Result<(), GitError> {
        self.record(GitCall::Pull {
            dir: dir.to_path_buf(),
            remote: remote.to_string(),
            branch: branch.to_string(),
        });

        if self.failing_pulls.contains(&Self::mirror_name(dir)) {
            Err(Self::failure("pull"))
        } else {
            Ok(())
        }
    }

    async fn fetch(&self, dir: &Path, flags: Vec<String>) -> Result<(), GitError> {
        self.record(GitCall::Fetch {
            dir: dir.to_path_buf(),
            flags,
        });

        if self.failing_fetches.contains(&Self::mirror_name(dir)) {
            Err(Self::failure("fetch"))
        } else {
            Ok(())
        }
    }

    async fn reset(&self, dir: &Path, flags: Vec<String>, target: &str) -> Result<(), GitError> {
        self.record(GitCall::Reset {
            dir: dir.to_path_buf(),
            flags,
            target: target.to_string(),
        });
        Ok(())
    }
}

/// Builder-style descriptor fixture.
pub fn descriptor(repository: &str) -> RepositoryDescriptor {
    RepositoryDescriptor {
        name: "github".to_string(),
        host: "git.acme.io".to_string(),
        organization: "acme".to_string(),
        repository: repository.to_string(),
        branch: "main".to_string(),
        protocol: "https".to_string(),
        auth: None,
    }
}

pub fn descriptor_with_auth(repository: &str, username: &str, token: &str) -> RepositoryDescriptor {
    let mut d = descriptor(repository);
    d.auth = Some(AuthConfig {
        username: username.to_string(),
        token: token.to_string(),
    });
    d
}

/// Temp base directory plus a config pointing at it.
pub struct TestEnvironment {
    pub base_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self {
            base_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn config(&self, repositories: Vec<RepositoryDescriptor>) -> Config {
        Config {
            base_directory: self.base_dir.path().to_string_lossy().into_owned(),
            repositories,
            ..Config::default()
        }
    }

    pub fn mirror_path(&self, repository: &str) -> PathBuf {
        self.base_dir.path().join(repository)
    }
}
