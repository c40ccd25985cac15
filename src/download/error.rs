//! Error types for the download module.
//!
//! Every variant carries the URL or path it concerns so a failed page can be
//! traced back without extra logging.

use std::path::PathBuf;

use thiserror::Error;

use crate::metadata::MetadataError;

/// Errors that can occur while downloading chapters, series or single images.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Series or chapter metadata could not be resolved.
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The downloaded bytes are not an image format we keep.
    #[error("Invalid mime type \"{mime}\" found for {url}. Aborting.")]
    InvalidImageFormat {
        /// The image URL.
        url: String,
        /// The sniffed MIME type after any conversion.
        mime: String,
    },

    /// Converting the image to JPEG failed.
    #[error("failed to convert image from {url} to JPEG: {source}")]
    Transcode {
        url: String,
        #[source]
        source: image::ImageError,
    },

    /// File system error (create directory, write file, etc.)
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Writing `metadata.json` failed to serialize.
    #[error("failed to serialize metadata for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Page concurrency outside the accepted range.
    #[error("invalid concurrency value {value}: must be between 1 and 100")]
    InvalidConcurrency {
        /// The rejected value.
        value: usize,
    },

    /// A worker task panicked or was cancelled.
    #[error("download task failed: {message}")]
    TaskFailed {
        /// Description from the join error.
        message: String,
    },
}

impl DownloadError {
    /// Creates a network error from a reqwest error, separating timeouts.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an invalid image format error.
    pub fn invalid_image_format(url: impl Into<String>, mime: impl Into<String>) -> Self {
        Self::InvalidImageFormat {
            url: url.into(),
            mime: mime.into(),
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true when the failure was an HTTP 404, either from the
    /// metadata service or from an image host.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Metadata(e) => e.is_not_found(),
            Self::HttpStatus { status, .. } => *status == 404,
            _ => false,
        }
    }
}
