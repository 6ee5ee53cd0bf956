//! Error taxonomy for release checks.

use std::fmt;
use std::sync::Arc;

/// Result of a single release check.
///
/// `Ok(None)` means no release information is available (checking is disabled).
pub type CheckResult = Result<Option<crate::ReleaseInfo>, CheckError>;

/// Errors raised while checking for a release.
///
/// Errors are cloneable because every waiter of a shared fetch observes the same
/// outcome. Underlying library errors are kept behind `Arc` and exposed through
/// [`std::error::Error::source`].
#[derive(Debug, Clone)]
pub enum CheckError {
    /// The account, repository or API URL produce an unusable request target.
    InvalidTarget { target: String, reason: String },
    /// The HTTP client could not be constructed.
    Client(Arc<reqwest::Error>),
    /// No runtime is available to run the fetch, or a blocking call was made
    /// from inside a runtime.
    Runtime(String),
    /// Sending the request, a non-success status, or reading the body failed.
    Transport {
        context: &'static str,
        source: Arc<reqwest::Error>,
    },
    /// The response body is not valid JSON.
    Parse(Arc<serde_json::Error>),
    /// The response body is valid JSON but not an object.
    NotAnObject,
    /// A required field is absent or null.
    MissingField(&'static str),
    /// The fetch task panicked or was aborted.
    Worker(String),
}

impl CheckError {
    /// Returns true for errors that no amount of re-checking will fix.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CheckError::InvalidTarget { .. } | CheckError::Client(_) | CheckError::Runtime(_)
        )
    }

    pub(crate) fn invalid_target(target: impl Into<String>, reason: impl Into<String>) -> Self {
        CheckError::InvalidTarget {
            target: target.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn transport(context: &'static str, source: reqwest::Error) -> Self {
        CheckError::Transport {
            context,
            source: Arc::new(source),
        }
    }
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::InvalidTarget { target, reason } => {
                write!(f, "Invalid GitHub repository target '{}': {}", target, reason)
            }
            CheckError::Client(_) => write!(f, "Failed to build HTTP client"),
            CheckError::Runtime(msg) => write!(f, "Cannot run release check: {}", msg),
            CheckError::Transport { context, .. } => {
                write!(f, "Failed to fetch the latest release: {}", context)
            }
            CheckError::Parse(_) => {
                write!(f, "Failed to fetch the latest release: response is not valid JSON")
            }
            CheckError::NotAnObject => write!(
                f,
                "Failed to fetch the latest release: response is not a JSON object"
            ),
            CheckError::MissingField(field) => write!(
                f,
                "Failed to fetch the latest release: field '{}' is missing",
                field
            ),
            CheckError::Worker(msg) => {
                write!(f, "Failed to fetch the latest release: worker failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for CheckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CheckError::Client(e) => Some(e.as_ref()),
            CheckError::Transport { source, .. } => Some(source.as_ref()),
            CheckError::Parse(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CheckError {
    fn from(e: serde_json::Error) -> Self {
        CheckError::Parse(Arc::new(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_configuration_errors() {
        assert!(CheckError::invalid_target("a/b", "empty").is_configuration());
        assert!(CheckError::Runtime("no runtime".into()).is_configuration());
        assert!(!CheckError::MissingField("id").is_configuration());
        assert!(!CheckError::NotAnObject.is_configuration());
        assert!(!CheckError::Worker("panic".into()).is_configuration());
    }

    #[test]
    fn test_display_missing_field() {
        let err = CheckError::MissingField("tag_name");
        assert_eq!(
            err.to_string(),
            "Failed to fetch the latest release: field 'tag_name' is missing"
        );
    }

    #[test]
    fn test_display_invalid_target() {
        let err = CheckError::invalid_target("owner/", "repository is empty");
        assert_eq!(
            err.to_string(),
            "Invalid GitHub repository target 'owner/': repository is empty"
        );
    }

    #[test]
    fn test_parse_error_has_source() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = CheckError::from(json_err);
        assert!(matches!(err, CheckError::Parse(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_clone_shares_source() {
        let json_err = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        let err = CheckError::from(json_err);
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }
}
