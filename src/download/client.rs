//! HTTP client wrapper for fetching page and cover images.
//!
//! Images are read fully into memory: format sniffing needs the complete
//! header, and transcoding needs the complete body.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::DownloadError;
use super::fetch::ImageSource;
use crate::user_agent;

/// HTTP client for downloading images.
///
/// This client is designed to be created once and reused for every page,
/// taking advantage of connection pooling.
///
/// # Example
///
/// ```no_run
/// use poketo_core::download::HttpClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new()?;
/// let bytes = client.fetch_bytes("https://example.com/page-1.png").await?;
/// println!("Fetched {} bytes", bytes.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 30 seconds
    /// - Read timeout: 5 minutes
    /// - Gzip decompression: enabled
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Network`] if the client cannot be built
    /// (for example when the TLS backend fails to initialize).
    pub fn new() -> Result<Self, DownloadError> {
        Self::new_with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn new_with_timeouts(
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, DownloadError> {
        let client = build_client(connect_timeout_secs, read_timeout_secs)
            .map_err(|e| DownloadError::network("client builder", e))?;
        Ok(Self { client })
    }

    /// Downloads the complete response body for `url`.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The request fails (network error, timeout)
    /// - The server returns an error status (4xx, 5xx)
    /// - The body cannot be read to the end
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DownloadError::network(url, e))?;
        debug!(bytes = body.len(), "fetched image body");
        Ok(body.to_vec())
    }

    /// Returns a reference to the underlying reqwest client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl ImageSource for HttpClient {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        self.fetch_bytes(url).await
    }
}

/// Builds the shared reqwest client configuration used for images and metadata.
pub(crate) fn build_client(
    connect_timeout_secs: u64,
    read_timeout_secs: u64,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .timeout(Duration::from_secs(read_timeout_secs))
        .gzip(true)
        .user_agent(user_agent::default_user_agent())
        .build()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds_with_defaults() {
        let client = HttpClient::new();
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_builds_with_custom_timeouts() {
        let client = HttpClient::new_with_timeouts(5, 10);
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_bytes_invalid_url_is_network_error() {
        let client = HttpClient::new().unwrap();
        let result = client.fetch_bytes("not a url").await;
        assert!(matches!(result, Err(DownloadError::Network { .. })));
    }
}
