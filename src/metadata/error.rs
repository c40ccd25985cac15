//! Error types for metadata lookups.

use thiserror::Error;

/// Errors raised while classifying input or fetching series/chapter metadata.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The input points at a site no registered source understands.
    #[error("{input} is not a supported site")]
    UnsupportedSite {
        /// The URL or identifier as given.
        input: String,
    },

    /// The input is neither a parseable URL nor a short identifier.
    #[error("{input} is not a supported URL")]
    InvalidUrl {
        /// The URL or identifier as given.
        input: String,
    },

    /// An identifier does not have the `site:series[:chapter]` shape.
    #[error("invalid identifier {id:?}: expected at least `site:series`")]
    InvalidIdentifier {
        /// The malformed identifier.
        id: String,
    },

    /// The metadata service answered with a non-success status.
    #[error("HTTP {status} fetching metadata from {url}")]
    HttpStatus {
        /// The request URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Network-level failure talking to the metadata service.
    #[error("network error fetching metadata from {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("timeout fetching metadata from {url}")]
    Timeout { url: String },

    /// The service responded but the body was not the expected JSON.
    #[error("malformed metadata from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A chapter identifier is not listed by its own series.
    #[error("chapter {chapter_id} is not listed in series {series_id}")]
    ChapterNotInSeries {
        chapter_id: String,
        series_id: String,
    },
}

impl MetadataError {
    /// Creates an unsupported-site error.
    pub fn unsupported_site(input: impl Into<String>) -> Self {
        Self::UnsupportedSite {
            input: input.into(),
        }
    }

    /// Creates an invalid-URL error.
    pub fn invalid_url(input: impl Into<String>) -> Self {
        Self::InvalidUrl {
            input: input.into(),
        }
    }

    /// Creates an invalid-identifier error.
    pub fn invalid_identifier(id: impl Into<String>) -> Self {
        Self::InvalidIdentifier { id: id.into() }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Maps a reqwest failure, separating timeouts from other transport errors.
    pub fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    /// Returns true when the underlying lookup returned HTTP 404.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::HttpStatus { status: 404, .. })
    }
}
