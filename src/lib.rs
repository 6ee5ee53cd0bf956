//! Check GitHub for a newer release of an application.
//!
//! A [`ReleaseChecker`] fetches `/repos/{account}/{repository}/releases/latest`
//! at most once per successful check and compares the release tag against the
//! version the embedding application reports for itself.

pub mod checker;
pub mod config;
pub mod env;
pub mod error;
pub mod http;
pub mod release;
pub mod source;

pub use checker::{ReleaseChecker, ReleaseFuture};
pub use config::{CheckerConfig, DEFAULT_API_URL};
pub use error::{CheckError, CheckResult};
pub use release::ReleaseInfo;
pub use source::{GitHubSource, ReleaseSource, RepoId};
