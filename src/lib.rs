//! repomirror - keeps a configured set of git repositories mirrored onto
//! local disk.
//!
//! Each configured repository descriptor is validated, turned into a
//! provider-specific fetch URL, mapped onto a mirror directory under the
//! base path, and synchronized: cloned when absent, pulled when present,
//! optionally force-reset to the remote branch. Repositories synchronize
//! concurrently and every one reports its own outcome.
//!
//! ## Modules
//!
//! - [`config`]: configuration, repository descriptors, validation
//! - [`url`]: provider-specific fetch URL construction and masking
//! - [`paths`]: mirror directory resolution and creation
//! - [`git`]: the version-control capability (status/clone/pull/fetch/reset)
//! - [`mirror`]: per-repository synchronizer
//! - [`sync`]: concurrent fan-out and outcome aggregation

pub mod config;
pub mod error;
pub mod git;
pub mod mirror;
pub mod paths;
pub mod sync;
pub mod url;

pub use config::{AuthConfig, Config, RepositoryDescriptor};
pub use error::{Error, GitError, ValidationError};
pub use git::{GitCli, GitClient};
pub use mirror::{RepositoryMirror, SyncAction};
pub use sync::{PlannedAction, SyncEngine, SyncOutcome, SyncPlan, SyncSummary};
pub use url::{FetchUrl, Provider, UrlBuilder};
