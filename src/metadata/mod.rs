//! Series and chapter metadata: the fetch capability, its site table, and
//! the per-run cache in front of it.
//!
//! # Architecture
//!
//! - [`MetadataSource`] - Async trait for anything that can turn a URL or
//!   short identifier into a [`Series`] or [`Chapter`]
//! - [`HttpMetadataSource`] - Source backed by a JSON metadata service
//! - [`SiteRegistry`] - Supported sites, input classification and
//!   identifier-to-URL expansion
//! - [`MetadataCache`] - Memoizes lookups by identifier for one process run
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use poketo_core::metadata::{HttpMetadataSource, MetadataCache};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = HttpMetadataSource::new("https://poketo.site/api")?;
//! let cache = MetadataCache::new(Arc::new(source));
//! let series = cache.series("mangadex:13127").await?;
//! println!("{} has {} chapters", series.title, series.chapters.len());
//! # Ok(())
//! # }
//! ```

mod cache;
mod error;
mod http;
pub mod identifier;
mod model;
mod site;

pub use cache::MetadataCache;
pub use error::MetadataError;
pub use http::HttpMetadataSource;
pub use identifier::series_id_from_chapter_id;
pub use model::{Chapter, ChapterNumber, ChapterSummary, Page, Series};
pub use site::{Site, SiteRegistry, canonical_host, is_url};

use std::fmt;

use async_trait::async_trait;

/// Whether an input names a whole series or a single chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Series,
    Chapter,
}

impl InputKind {
    /// Plural noun for the unit that gets downloaded for this kind of input.
    #[must_use]
    pub fn download_noun(self) -> &'static str {
        match self {
            Self::Series => "chapters",
            Self::Chapter => "pages",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Series => write!(f, "series"),
            Self::Chapter => write!(f, "chapter"),
        }
    }
}

/// Capability that resolves series and chapters from a URL or short identifier.
///
/// Site scraping lives behind this trait; the rest of the crate only sees
/// structured [`Series`] and [`Chapter`] values.
///
/// # Object Safety
///
/// Uses `async_trait` so the cache can hold an `Arc<dyn MetadataSource>`.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetches a series by URL or `site:series` identifier.
    async fn get_series(&self, input: &str) -> Result<Series, MetadataError>;

    /// Fetches a chapter (with its pages) by URL or `site:series:chapter` identifier.
    async fn get_chapter(&self, input: &str) -> Result<Chapter, MetadataError>;

    /// Classifies the input as a series or a chapter.
    fn get_type(&self, input: &str) -> Result<InputKind, MetadataError>;

    /// Expands a short identifier into its canonical URL.
    fn construct_url(&self, short_id: &str) -> Result<String, MetadataError>;
}
