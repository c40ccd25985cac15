//! Chapter and series download orchestration.
//!
//! The [`Downloader`] turns a chapter or series identifier into files on
//! disk. Metadata comes from a shared [`MetadataCache`]; each page goes
//! through [`fetch_image`] inside a bounded pool of tasks.
//!
//! # Concurrency Model
//!
//! - Each page runs in its own Tokio task inside a `JoinSet`
//! - Tasks wait on a semaphore that starts with zero permits, so every page
//!   is known before the first one starts and `total` never changes
//! - Permits are released once all tasks exist; a permit is held for the
//!   whole fetch-validate-write of a page (RAII)
//! - Completions are collected by the calling task, which is the only place
//!   progress callbacks fire
//! - After the first failure queued pages are skipped, in-flight pages
//!   settle, and the first error is returned
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use poketo_core::download::{DownloadOptions, Downloader, HttpClient};
//! use poketo_core::metadata::{HttpMetadataSource, MetadataCache};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = HttpMetadataSource::new("https://poketo.site/api")?;
//! let cache = Arc::new(MetadataCache::new(Arc::new(source)));
//! let downloader = Downloader::new(cache, Arc::new(HttpClient::new()?));
//!
//! let options = DownloadOptions::new("./downloads").on_page_complete(|stats| {
//!     println!("{}/{}", stats.downloaded, stats.total);
//! });
//! let dir = downloader.download_chapter("mangadex:13127:269022", &options).await?;
//! println!("Saved to {}", dir.display());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use super::constants::{MAX_CONCURRENCY, MIN_CONCURRENCY, PAGE_CONCURRENCY};
use super::error::DownloadError;
use super::filename::{chapter_directory_name, page_file_stem, series_directory_name};
use super::fetch::{ImageSource, fetch_image};
use crate::metadata::{MetadataCache, Page, Series};

/// File name of the series snapshot written next to the chapters.
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// File stem of the series cover image.
pub const COVER_FILE_STEM: &str = "cover";

/// Progress snapshot handed to callbacks after each completed unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadStats {
    /// Units finished so far.
    pub downloaded: usize,
    /// Units in this batch; fixed before the first event.
    pub total: usize,
}

impl DownloadStats {
    #[must_use]
    pub fn new(downloaded: usize, total: usize) -> Self {
        Self { downloaded, total }
    }

    /// True once every unit has been reported.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.downloaded == self.total
    }
}

/// Observer for [`DownloadStats`] events.
pub type ProgressCallback = Arc<dyn Fn(DownloadStats) + Send + Sync>;

/// Where to download to and who to tell about progress.
#[derive(Clone)]
pub struct DownloadOptions {
    path: PathBuf,
    on_page_complete: Option<ProgressCallback>,
    on_chapter_complete: Option<ProgressCallback>,
}

impl fmt::Debug for DownloadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadOptions")
            .field("path", &self.path)
            .field("on_page_complete", &self.on_page_complete.is_some())
            .field("on_chapter_complete", &self.on_chapter_complete.is_some())
            .finish()
    }
}

impl DownloadOptions {
    /// Options that download under `path` with no callbacks.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            on_page_complete: None,
            on_chapter_complete: None,
        }
    }

    /// Called after each page of the current chapter is written.
    #[must_use]
    pub fn on_page_complete(
        mut self,
        callback: impl Fn(DownloadStats) + Send + Sync + 'static,
    ) -> Self {
        self.on_page_complete = Some(Arc::new(callback));
        self
    }

    /// Called after each chapter of a series is written. Ignored by
    /// [`Downloader::download_chapter`].
    #[must_use]
    pub fn on_chapter_complete(
        mut self,
        callback: impl Fn(DownloadStats) + Send + Sync + 'static,
    ) -> Self {
        self.on_chapter_complete = Some(Arc::new(callback));
        self
    }

    /// Base directory for this download.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn with_path(&self, path: PathBuf) -> Self {
        Self {
            path,
            on_page_complete: self.on_page_complete.clone(),
            on_chapter_complete: None,
        }
    }
}

fn notify(callback: Option<&ProgressCallback>, stats: DownloadStats) {
    if let Some(callback) = callback {
        callback(stats);
    }
}

/// Downloads chapters and series to disk.
///
/// Cheap to share: the cache and image source are reference counted.
pub struct Downloader {
    cache: Arc<MetadataCache>,
    images: Arc<dyn ImageSource>,
    concurrency: usize,
}

impl fmt::Debug for Downloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Downloader")
            .field("cache", &self.cache)
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

impl Downloader {
    /// Creates a downloader with the default page concurrency of 3.
    #[must_use]
    pub fn new(cache: Arc<MetadataCache>, images: Arc<dyn ImageSource>) -> Self {
        Self {
            cache,
            images,
            concurrency: PAGE_CONCURRENCY,
        }
    }

    /// Overrides how many pages may be in flight at once.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::InvalidConcurrency`] outside 1..=100.
    pub fn with_concurrency(mut self, concurrency: usize) -> Result<Self, DownloadError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(DownloadError::InvalidConcurrency { value: concurrency });
        }
        self.concurrency = concurrency;
        Ok(self)
    }

    /// Maximum number of pages downloaded at the same time.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// The metadata cache this downloader reads from.
    #[must_use]
    pub fn cache(&self) -> &Arc<MetadataCache> {
        &self.cache
    }

    /// Downloads every page of a chapter into
    /// `{options.path}/{volume-N-chapter-M | chapter-M}/`.
    ///
    /// Returns the chapter directory.
    ///
    /// # Errors
    ///
    /// Metadata errors, the first page failure, or [`DownloadError::Io`] if
    /// the directory cannot be created. Pages written before a failure are
    /// left on disk; the chapter is still reported as failed.
    #[instrument(skip(self, options), fields(path = %options.path.display()))]
    pub async fn download_chapter(
        &self,
        chapter_id: &str,
        options: &DownloadOptions,
    ) -> Result<PathBuf, DownloadError> {
        let chapter = self.cache.full_chapter(chapter_id).await?;
        let dir = options.path.join(chapter_directory_name(
            &chapter.chapter_number,
            chapter.volume_number.as_ref(),
        ));
        ensure_dir(&dir).await?;

        info!(
            pages = chapter.pages.len(),
            dir = %dir.display(),
            "downloading chapter"
        );
        self.download_pages(&chapter.pages, &dir, options.on_page_complete.as_ref())
            .await?;
        Ok(dir)
    }

    /// Downloads a whole series into `{options.path}/{sanitized title}/`.
    ///
    /// Writes the cover (when the series has one) and `metadata.json`, then
    /// downloads chapters one after another in the order the series lists
    /// them. Returns the series directory.
    ///
    /// # Errors
    ///
    /// The first error from the cover, the snapshot or any chapter. Later
    /// chapters are not attempted.
    #[instrument(skip(self, options), fields(path = %options.path.display()))]
    pub async fn download_series(
        &self,
        series_id: &str,
        options: &DownloadOptions,
    ) -> Result<PathBuf, DownloadError> {
        let series = self.cache.series(series_id).await?;
        let dir = options.path.join(series_directory_name(&series.title));
        ensure_dir(&dir).await?;

        match series.cover_image_url.as_deref().filter(|url| !url.is_empty()) {
            Some(cover) => {
                fetch_image(self.images.as_ref(), cover, &dir.join(COVER_FILE_STEM)).await?;
            }
            None => debug!("series has no cover image"),
        }
        write_metadata(&dir, &series).await?;

        let total = series.chapters.len();
        info!(chapters = total, dir = %dir.display(), "downloading series");

        let chapter_options = options.with_path(dir.clone());
        for (index, chapter) in series.chapters.iter().enumerate() {
            self.download_chapter(&chapter.id, &chapter_options).await?;
            notify(
                options.on_chapter_complete.as_ref(),
                DownloadStats::new(index + 1, total),
            );
        }
        Ok(dir)
    }

    async fn download_pages(
        &self,
        pages: &[Page],
        dir: &Path,
        on_page_complete: Option<&ProgressCallback>,
    ) -> Result<(), DownloadError> {
        let total = pages.len();
        let gate = Arc::new(Semaphore::new(0));
        let aborted = Arc::new(AtomicBool::new(false));
        let mut tasks = JoinSet::new();

        for (index, page) in pages.iter().enumerate() {
            let gate = Arc::clone(&gate);
            let aborted = Arc::clone(&aborted);
            let images = Arc::clone(&self.images);
            let url = page.url.clone();
            let destination = page_file_stem(dir, index);

            tasks.spawn(async move {
                let Ok(_permit) = gate.acquire_owned().await else {
                    return Ok(None);
                };
                if aborted.load(Ordering::SeqCst) {
                    return Ok(None);
                }
                let result = fetch_image(images.as_ref(), &url, &destination).await;
                if result.is_err() {
                    aborted.store(true, Ordering::SeqCst);
                }
                result.map(Some)
            });
        }

        debug!(task_count = total, concurrency = self.concurrency, "starting page queue");
        gate.add_permits(self.concurrency);

        let mut downloaded = 0;
        let mut first_error = None;
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined.unwrap_or_else(|e| {
                Err(DownloadError::TaskFailed {
                    message: e.to_string(),
                })
            });
            match outcome {
                Ok(Some(path)) => {
                    downloaded += 1;
                    debug!(path = %path.display(), downloaded, total, "page complete");
                    notify(on_page_complete, DownloadStats::new(downloaded, total));
                }
                Ok(None) => {}
                Err(e) => {
                    aborted.store(true, Ordering::SeqCst);
                    if first_error.is_none() {
                        warn!(error = %e, "page failed, skipping remaining pages");
                        first_error = Some(e);
                    } else {
                        debug!(error = %e, "additional page failure");
                    }
                }
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}

async fn ensure_dir(dir: &Path) -> Result<(), DownloadError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| DownloadError::io(dir, e))
}

async fn write_metadata(dir: &Path, series: &Series) -> Result<(), DownloadError> {
    let path = dir.join(METADATA_FILE_NAME);
    let json = serde_json::to_string_pretty(series).map_err(|source| DownloadError::Serialize {
        path: path.clone(),
        source,
    })?;
    tokio::fs::write(&path, json)
        .await
        .map_err(|e| DownloadError::io(path, e))
}
