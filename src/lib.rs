//! Poketo Core Library
//!
//! Downloads manga series and chapters from a URL or short identifier
//! (`site:series[:chapter]`) into a plain directory of images.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`metadata`] - Metadata fetch capability, supported sites, identifier
//!   utilities and the per-run metadata cache
//! - [`download`] - Image fetch/validate/transcode and the chapter/series
//!   download orchestrator

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
pub mod metadata;
mod user_agent;

// Re-export commonly used types
pub use download::{
    DownloadError, DownloadOptions, DownloadStats, Downloader, HttpClient, ImageSource,
    fetch_image,
};
pub use metadata::{
    Chapter, ChapterNumber, ChapterSummary, HttpMetadataSource, InputKind, MetadataCache,
    MetadataError, MetadataSource, Page, Series, SiteRegistry, series_id_from_chapter_id,
};
