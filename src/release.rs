//! The release value returned by a check.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::CheckError;

/// One published release, as reported by the latest-release endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseInfo {
    id: String,
    name: String,
    version: String,
    download_page: String,
}

impl ReleaseInfo {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        download_page: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            download_page: download_page.into(),
        }
    }

    /// Parses a latest-release response body.
    ///
    /// The body is decoded into a generic JSON tree first so that `id` may be a
    /// number or a string. Every field is rendered to its string form; a missing
    /// or null field fails the whole parse.
    pub fn from_json(body: &str) -> Result<Self, CheckError> {
        let value: Value = serde_json::from_str(body)?;
        let Value::Object(data) = value else {
            return Err(CheckError::NotAnObject);
        };

        Ok(Self {
            id: field(&data, "id")?,
            name: field(&data, "name")?,
            version: field(&data, "tag_name")?,
            download_page: field(&data, "html_url")?,
        })
    }

    /// Provider-assigned release identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The release tag, compared verbatim against the current version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// URL of the release page on GitHub.
    pub fn download_page(&self) -> &str {
        &self.download_page
    }
}

fn field(data: &Map<String, Value>, key: &'static str) -> Result<String, CheckError> {
    match data.get(key) {
        None | Some(Value::Null) => Err(CheckError::MissingField(key)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Ok(other.to_string()),
    }
}
