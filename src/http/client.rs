//! HTTP client that fetches a response body as text.

use log::debug;
use reqwest::{Client, Url};

use crate::error::CheckError;

/// User agent sent with every request. The GitHub API rejects requests without one.
pub const USER_AGENT: &str = concat!("relcheck/", env!("CARGO_PKG_VERSION"));

/// Thin wrapper over a reqwest [`Client`].
///
/// No retries, no authentication, no custom timeouts: a failed request is
/// reported to the caller as-is.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client with the crate's user agent and transport defaults.
    pub fn with_defaults() -> Result<Self, CheckError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CheckError::Client(e.into()))?;
        Ok(Self::new(client))
    }

    /// Performs a GET request and reads the whole body as text.
    ///
    /// Non-success statuses are errors, as reqwest's `error_for_status` defines them.
    #[tracing::instrument(skip(self))]
    pub async fn get_text(&self, url: &Url) -> Result<String, CheckError> {
        debug!("GET {}...", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| CheckError::transport("failed to send request", e))?;

        let response = response
            .error_for_status()
            .map_err(|e| CheckError::transport("unexpected response status", e))?;

        let body = response
            .text()
            .await
            .map_err(|e| CheckError::transport("failed to read response body", e))?;

        debug!("Read {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn url(server: &mockito::Server, path: &str) -> Url {
        Url::parse(&format!("{}{}", server.url(), path)).unwrap()
    }

    #[tokio::test]
    async fn test_get_text_success() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name": "test"}"#)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let body = client.get_text(&url(&server, "/test")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(body, r#"{"name": "test"}"#);
    }

    #[tokio::test]
    async fn test_get_text_not_found() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/test")
            .with_status(404)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result = client.get_text(&url(&server, "/test")).await;

        mock.assert_async().await;
        match result {
            Err(CheckError::Transport { context, source }) => {
                assert_eq!(context, "unexpected response status");
                assert_eq!(source.status(), Some(reqwest::StatusCode::NOT_FOUND));
            }
            other => panic!("Expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_text_server_error_is_not_retried() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/test")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result = client.get_text(&url(&server, "/test")).await;

        mock.assert_async().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_get_text_connection_refused() {
        // Port 9 (discard) on localhost is not expected to accept HTTP connections.
        let client = HttpClient::new(Client::new());
        let result = client
            .get_text(&Url::parse("http://127.0.0.1:9/nothing").unwrap())
            .await;

        assert!(matches!(
            result,
            Err(CheckError::Transport {
                context: "failed to send request",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_with_defaults_sends_user_agent() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/")
            .match_header("user-agent", Matcher::Exact(USER_AGENT.to_string()))
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;

        let client = HttpClient::with_defaults().unwrap();
        let body = client.get_text(&url(&server, "/")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(body, "ok");
    }
}
