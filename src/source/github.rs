//! GitHub source implementation.

use async_trait::async_trait;
use log::debug;
use reqwest::Url;

use crate::error::CheckError;
use crate::http::HttpClient;

use super::{ReleaseSource, validate_identifier};

/// Reads `GET {api_url}/repos/{account}/{repository}/releases/latest`.
pub struct GitHubSource {
    http_client: HttpClient,
    api_url: String,
}

impl GitHubSource {
    /// Create from an existing HttpClient.
    pub fn from_http_client(http_client: HttpClient, api_url: &str) -> Self {
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl ReleaseSource for GitHubSource {
    fn latest_release_url(&self, account: &str, repository: &str) -> Result<Url, CheckError> {
        validate_identifier("account", account)?;
        validate_identifier("repository", repository)?;

        let target = format!(
            "{}/repos/{}/{}/releases/latest",
            self.api_url, account, repository
        );
        let url = Url::parse(&target)
            .map_err(|e| CheckError::invalid_target(target.as_str(), e.to_string()))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(CheckError::invalid_target(
                target,
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        Ok(url)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch(&self, url: &Url) -> Result<String, CheckError> {
        debug!("Fetching latest release from {}...", url);
        self.http_client.get_text(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_API_URL;
    use reqwest::Client;

    fn source_at(api_url: &str) -> GitHubSource {
        GitHubSource::from_http_client(HttpClient::new(Client::new()), api_url)
    }

    #[test]
    fn test_github_source_api_url() {
        let source = source_at(DEFAULT_API_URL);
        assert_eq!(source.api_url(), "https://api.github.com");

        let custom = source_at("https://custom.api/");
        assert_eq!(custom.api_url(), "https://custom.api");
    }

    #[test]
    fn test_latest_release_url() {
        let source = source_at(DEFAULT_API_URL);
        let url = source
            .latest_release_url("theprogmatheus", "JGRUChecker")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/theprogmatheus/JGRUChecker/releases/latest"
        );
    }

    #[test]
    fn test_latest_release_url_rejects_bad_identifiers() {
        let source = source_at(DEFAULT_API_URL);
        assert!(source.latest_release_url("", "repo").is_err());
        assert!(source.latest_release_url("owner", "").is_err());
        assert!(source.latest_release_url("owner", "a/b").is_err());
    }

    #[test]
    fn test_latest_release_url_rejects_bad_api_url() {
        let source = source_at("not a url");
        let err = source.latest_release_url("owner", "repo").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_latest_release_url_rejects_unsupported_scheme() {
        let source = source_at("ftp://example.com");
        let err = source.latest_release_url("owner", "repo").unwrap_err();
        assert!(matches!(err, CheckError::InvalidTarget { .. }));
    }

    #[tokio::test]
    async fn test_fetch_latest_release() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/owner/repo/releases/latest")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": 1, "name": "One", "tag_name": "v1", "html_url": "u"}"#)
            .create_async()
            .await;

        let source = source_at(&server.url());
        let url = source.latest_release_url("owner", "repo").unwrap();
        let body = source.fetch(&url).await.unwrap();

        mock.assert_async().await;
        assert!(body.contains(r#""tag_name": "v1""#));
    }

    #[tokio::test]
    async fn test_fetch_latest_release_not_found() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/owner/repo/releases/latest")
            .with_status(404)
            .with_body(r#"{"message": "Not Found"}"#)
            .create_async()
            .await;

        let source = source_at(&server.url());
        let url = source.latest_release_url("owner", "repo").unwrap();
        let result = source.fetch(&url).await;

        mock.assert_async().await;
        assert!(matches!(result, Err(CheckError::Transport { .. })));
    }
}
