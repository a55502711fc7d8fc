use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Error raised by the raw git transport. Carries the invoked subcommand
/// and whatever the process wrote to stderr.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("failed to spawn git {command}: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("git {command} failed: {stderr}")]
    Command { command: String, stderr: String },
}

/// Descriptor validation failure. Exactly one reason is reported, checked
/// in the order repository, organization, host.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("repository name is required")]
    MissingRepository,

    #[error("organization name is required")]
    MissingOrganization,

    #[error("host is required")]
    MissingHost,

    #[error("duplicate repository identity {host}/{organization}/{repository}")]
    DuplicateIdentity {
        host: String,
        organization: String,
        repository: String,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    /// Unknown provider key, or a URL built without its required fields.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid repository descriptor: {0}")]
    Validation(#[from] ValidationError),

    #[error("filesystem operation failed for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Pull or clone failed for one repository. Not retried.
    #[error("failed to sync repository {repository}: {source}")]
    Sync {
        repository: String,
        source: GitError,
    },

    /// A forced fetch/reset/pull sequence failed after it had begun.
    /// Kept distinct from [`Error::Sync`] so an unreachable remote during a
    /// hard reset can be told apart from an ordinary pull failure.
    #[error("failed to force-sync repository {repository}: {source}")]
    ForceSync {
        repository: String,
        source: GitError,
    },
}

impl Error {
    /// Repository name the error originated from, when it has one.
    pub fn repository(&self) -> Option<&str> {
        match self {
            Error::Sync { repository, .. } | Error::ForceSync { repository, .. } => {
                Some(repository)
            }
            _ => None,
        }
    }
}
