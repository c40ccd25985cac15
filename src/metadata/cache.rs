//! Per-run memoization of series and chapter lookups.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

use super::identifier::series_id_from_chapter_id;
use super::{Chapter, ChapterSummary, MetadataError, MetadataSource, Series};

type Slot<T> = Arc<OnceCell<Arc<T>>>;

/// Caches [`Series`] and [`Chapter`] values by identifier for the lifetime
/// of one process run.
///
/// There is no eviction or expiry. Each identifier owns a `OnceCell`, so
/// overlapping requests for the same identifier share a single fetch. A
/// failed fetch leaves the cell empty and the next caller tries again.
pub struct MetadataCache {
    source: Arc<dyn MetadataSource>,
    series: DashMap<String, Slot<Series>>,
    chapters: DashMap<String, Slot<Chapter>>,
}

impl std::fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataCache")
            .field("series", &self.series.len())
            .field("chapters", &self.chapters.len())
            .finish_non_exhaustive()
    }
}

fn slot<T>(map: &DashMap<String, Slot<T>>, key: &str) -> Slot<T> {
    Arc::clone(&map.entry(key.to_string()).or_default())
}

fn count_filled<T>(map: &DashMap<String, Slot<T>>) -> usize {
    map.iter().filter(|entry| entry.value().initialized()).count()
}

impl MetadataCache {
    /// Creates an empty cache in front of `source`.
    #[must_use]
    pub fn new(source: Arc<dyn MetadataSource>) -> Self {
        Self {
            source,
            series: DashMap::new(),
            chapters: DashMap::new(),
        }
    }

    /// The wrapped metadata source.
    #[must_use]
    pub fn source(&self) -> &Arc<dyn MetadataSource> {
        &self.source
    }

    /// Returns the series for `id`, fetching it on first use.
    ///
    /// # Errors
    ///
    /// Propagates the source's error unchanged.
    #[instrument(skip(self))]
    pub async fn series(&self, id: &str) -> Result<Arc<Series>, MetadataError> {
        let cell = slot(&self.series, id);
        let series = cell
            .get_or_try_init(|| async {
                debug!("series cache miss");
                self.source.get_series(id).await.map(Arc::new)
            })
            .await?;
        Ok(Arc::clone(series))
    }

    /// Fetches a series by URL and stores it under the identifier it reports.
    ///
    /// # Errors
    ///
    /// Propagates the source's error unchanged.
    #[instrument(skip(self))]
    pub async fn series_by_url(&self, url: &str) -> Result<Arc<Series>, MetadataError> {
        let series = Arc::new(self.source.get_series(url).await?);
        debug!(id = %series.id, "caching series fetched by URL");
        self.series.insert(
            series.id.clone(),
            Arc::new(OnceCell::new_with(Some(Arc::clone(&series)))),
        );
        Ok(series)
    }

    /// Returns the chapter (with pages) for `id`, fetching it on first use.
    ///
    /// # Errors
    ///
    /// Propagates the source's error unchanged.
    #[instrument(skip(self))]
    pub async fn chapter(&self, id: &str) -> Result<Arc<Chapter>, MetadataError> {
        let cell = slot(&self.chapters, id);
        let chapter = cell
            .get_or_try_init(|| async {
                debug!("chapter cache miss");
                self.source.get_chapter(id).await.map(Arc::new)
            })
            .await?;
        Ok(Arc::clone(chapter))
    }

    /// Fetches a chapter by URL and stores it under the identifier it reports.
    ///
    /// # Errors
    ///
    /// Propagates the source's error unchanged.
    #[instrument(skip(self))]
    pub async fn chapter_by_url(&self, url: &str) -> Result<Arc<Chapter>, MetadataError> {
        let chapter = Arc::new(self.source.get_chapter(url).await?);
        debug!(id = %chapter.id, "caching chapter fetched by URL");
        self.chapters.insert(
            chapter.id.clone(),
            Arc::new(OnceCell::new_with(Some(Arc::clone(&chapter)))),
        );
        Ok(chapter)
    }

    /// Returns the series listing entry for a chapter (number, volume, title).
    ///
    /// # Errors
    ///
    /// - [`MetadataError::InvalidIdentifier`] if the series cannot be derived
    ///   from `chapter_id`.
    /// - [`MetadataError::ChapterNotInSeries`] if the series does not list it.
    /// - Any error from fetching the series.
    pub async fn chapter_metadata(&self, chapter_id: &str) -> Result<ChapterSummary, MetadataError> {
        let series_id = series_id_from_chapter_id(chapter_id)?;
        let series = self.series(&series_id).await?;
        series
            .find_chapter(chapter_id)
            .cloned()
            .ok_or_else(|| MetadataError::ChapterNotInSeries {
                chapter_id: chapter_id.to_string(),
                series_id,
            })
    }

    /// Returns the chapter with its listing metadata merged in.
    ///
    /// # Errors
    ///
    /// Same as [`chapter_metadata`](Self::chapter_metadata) and
    /// [`chapter`](Self::chapter).
    pub async fn full_chapter(&self, chapter_id: &str) -> Result<Chapter, MetadataError> {
        let summary = self.chapter_metadata(chapter_id).await?;
        let chapter = self.chapter(chapter_id).await?;
        Ok(Chapter::clone(&chapter).merged_with(&summary))
    }

    /// Number of cached series and chapters.
    #[must_use]
    pub fn len(&self) -> usize {
        count_filled(&self.series) + count_filled(&self.chapters)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
