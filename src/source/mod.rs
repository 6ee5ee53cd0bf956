//! Where release metadata comes from.
//!
//! The checker talks to a [`ReleaseSource`] rather than to HTTP directly, so the
//! single-flight logic can be exercised without a network.

mod github;

use async_trait::async_trait;
use reqwest::Url;
use std::fmt;
use std::str::FromStr;

use crate::error::CheckError;

pub use github::GitHubSource;

/// Repository identifier (owner/repo format).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoId {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            Err(CheckError::invalid_target(
                s,
                "invalid repository format, expected 'owner/repo'",
            ))
        } else {
            Ok(RepoId {
                owner: parts[0].to_string(),
                repo: parts[1].to_string(),
            })
        }
    }
}

/// Supplies the raw latest-release document for a repository.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Builds the request target for the latest release.
    ///
    /// Fails with a configuration error, before any I/O, when the identifiers
    /// cannot form a usable URL.
    fn latest_release_url(&self, account: &str, repository: &str) -> Result<Url, CheckError>;

    /// Fetches the response body for a target built by [`Self::latest_release_url`].
    async fn fetch(&self, url: &Url) -> Result<String, CheckError>;
}

/// Rejects identifiers that would change the shape of the request path.
pub(crate) fn validate_identifier(kind: &str, value: &str) -> Result<(), CheckError> {
    if value.is_empty() {
        return Err(CheckError::invalid_target(
            value,
            format!("{} is empty", kind),
        ));
    }
    if let Some(c) = value
        .chars()
        .find(|c| matches!(c, '/' | '?' | '#' | '\\') || c.is_whitespace() || c.is_control())
    {
        return Err(CheckError::invalid_target(
            value,
            format!("{} contains invalid character {:?}", kind, c),
        ));
    }
    Ok(())
}
