//! [`MetadataSource`] backed by a JSON metadata service.
//!
//! The service does the site scraping. This client only expands short
//! identifiers into URLs, asks `GET {api}/series?url=...` or
//! `GET {api}/chapter?url=...`, and maps failures onto [`MetadataError`].

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::site::{SiteRegistry, is_url};
use super::{Chapter, InputKind, MetadataError, MetadataSource, Series};
use crate::download::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS, build_client};

/// Error body returned by the metadata service on failure.
#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    #[serde(default)]
    code: Option<String>,
}

/// Metadata source talking to a remote JSON service.
#[derive(Debug, Clone)]
pub struct HttpMetadataSource {
    client: Client,
    api_base: Url,
    sites: SiteRegistry,
}

impl HttpMetadataSource {
    /// Creates a source for the service at `api_base` with default timeouts
    /// and the built-in site table.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::InvalidUrl`] if `api_base` is not an
    /// http(s) URL, or [`MetadataError::Network`] if the HTTP client cannot
    /// be built.
    pub fn new(api_base: &str) -> Result<Self, MetadataError> {
        Self::with_timeouts(api_base, CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a source with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn with_timeouts(
        api_base: &str,
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, MetadataError> {
        let api_base = Url::parse(api_base)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"))
            .ok_or_else(|| MetadataError::invalid_url(api_base))?;
        let client = build_client(connect_timeout_secs, read_timeout_secs)
            .map_err(|e| MetadataError::from_reqwest(api_base.as_str(), e))?;
        Ok(Self {
            client,
            api_base,
            sites: SiteRegistry::builtin(),
        })
    }

    /// Replaces the site table used for classification and URL expansion.
    #[must_use]
    pub fn with_sites(mut self, sites: SiteRegistry) -> Self {
        self.sites = sites;
        self
    }

    /// The service base URL.
    #[must_use]
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    fn endpoint(&self, resource: &str, target: &str) -> Url {
        let mut url = self.api_base.clone();
        let path = format!("{}/{resource}", url.path().trim_end_matches('/'));
        url.set_path(&path);
        url.query_pairs_mut().clear().append_pair("url", target);
        url
    }

    fn target_url(&self, input: &str) -> Result<String, MetadataError> {
        if is_url(input) {
            Ok(input.trim().to_string())
        } else {
            self.sites.construct_url(input)
        }
    }

    #[instrument(skip(self), fields(api = %self.api_base))]
    async fn fetch<T: DeserializeOwned>(
        &self,
        resource: &str,
        input: &str,
    ) -> Result<T, MetadataError> {
        let target = self.target_url(input)?;
        let request_url = self.endpoint(resource, &target);
        debug!(%request_url, "requesting metadata");

        let response = self
            .client
            .get(request_url.clone())
            .send()
            .await
            .map_err(|e| MetadataError::from_reqwest(request_url.as_str(), e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| MetadataError::from_reqwest(request_url.as_str(), e))?;

        if !status.is_success() {
            let code = serde_json::from_slice::<ServiceErrorBody>(&body)
                .ok()
                .and_then(|b| b.code);
            debug!(status = status.as_u16(), code = ?code, "metadata service error");
            return Err(match code.as_deref() {
                Some("UNSUPPORTED_SITE") => MetadataError::unsupported_site(input),
                Some("INVALID_URL") => MetadataError::invalid_url(input),
                _ => MetadataError::http_status(target, status.as_u16()),
            });
        }

        serde_json::from_slice(&body).map_err(|source| MetadataError::Decode {
            url: request_url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl MetadataSource for HttpMetadataSource {
    async fn get_series(&self, input: &str) -> Result<Series, MetadataError> {
        self.fetch("series", input).await
    }

    async fn get_chapter(&self, input: &str) -> Result<Chapter, MetadataError> {
        self.fetch("chapter", input).await
    }

    fn get_type(&self, input: &str) -> Result<InputKind, MetadataError> {
        self.sites.get_type(input)
    }

    fn construct_url(&self, short_id: &str) -> Result<String, MetadataError> {
        self.sites.construct_url(short_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_non_http_base() {
        assert!(matches!(
            HttpMetadataSource::new("ftp://example.com/api"),
            Err(MetadataError::InvalidUrl { .. })
        ));
        assert!(matches!(
            HttpMetadataSource::new("not a url"),
            Err(MetadataError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_endpoint_appends_resource_and_encodes_target() {
        let source = HttpMetadataSource::new("https://api.example.com/v1/").unwrap();
        let url = source.endpoint("series", "http://merakiscans.com/senryu-girl/");
        assert_eq!(url.path(), "/v1/series");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![(
                "url".to_string(),
                "http://merakiscans.com/senryu-girl/".to_string()
            )]
        );
    }

    #[test]
    fn test_target_url_expands_identifiers() {
        let source = HttpMetadataSource::new("https://api.example.com").unwrap();
        assert_eq!(
            source.target_url("merakiscans:senryu-girl:5").unwrap(),
            "http://merakiscans.com/senryu-girl/5/"
        );
        assert_eq!(
            source.target_url("https://mangadex.org/manga/1").unwrap(),
            "https://mangadex.org/manga/1"
        );
    }
}
