//! Image download, validation and chapter/series orchestration.
//!
//! # Architecture
//!
//! - [`ImageSource`] - Async trait for fetching raw image bytes; implemented
//!   by [`HttpClient`]
//! - [`fetch_image`] - Downloads one image, sniffs its real format, converts
//!   WebP to JPEG, rejects anything outside [`MIME_WHITELIST`] and writes it
//! - [`Downloader`] - Builds the directory layout and runs one
//!   [`fetch_image`] per page under a bounded pool, reporting
//!   [`DownloadStats`] through [`DownloadOptions`] callbacks
//!
//! # On-disk layout
//!
//! ```text
//! {path}/{series title}/
//!   cover.{ext}
//!   metadata.json
//!   chapter-{n}/            (or volume-{v}-chapter-{n}/)
//!     1.{ext}
//!     2.{ext}
//! ```
//!
//! [`Downloader::download_chapter`] writes only the `chapter-{n}/` level,
//! directly under its `path`.

mod client;
mod constants;
mod engine;
mod error;
pub mod filename;
mod fetch;

pub(crate) use client::build_client;
pub use client::HttpClient;
pub use constants::{CONNECT_TIMEOUT_SECS, JPEG_QUALITY, PAGE_CONCURRENCY, READ_TIMEOUT_SECS};
pub use engine::{
    COVER_FILE_STEM, DownloadOptions, DownloadStats, Downloader, METADATA_FILE_NAME,
    ProgressCallback,
};
pub use error::DownloadError;
pub use fetch::{
    ImageSource, MIME_CONVERT_TO_JPEG, MIME_WHITELIST, SniffedFormat, UNKNOWN_MIME, fetch_image,
    normalize_image, sniff, transcode_to_jpeg,
};

