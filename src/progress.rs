//! Spinner-backed progress tasks and the status text shown in them.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use poketo_core::DownloadStats;
use poketo_core::metadata::{Chapter, InputKind, Series};

const SUCCESS_SYMBOL: &str = "✓";

/// One spinner line for a phase of work.
///
/// The spinner draws to stderr and is hidden when stderr is not a
/// terminal; in that case only the final success line is printed.
pub(crate) struct ProgressTask {
    bar: ProgressBar,
}

impl ProgressTask {
    /// Starts spinning with `text`.
    pub(crate) fn start(text: impl Into<String>) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.yellow} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(text.into());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Replaces the status text.
    pub(crate) fn set_text(&self, text: impl Into<String>) {
        self.bar.set_message(text.into());
    }

    /// Handle for updating the text from download callbacks.
    pub(crate) fn bar(&self) -> ProgressBar {
        self.bar.clone()
    }

    /// Stops the spinner and leaves the last text behind, marked with a check.
    pub(crate) fn succeed(self) {
        if self.bar.is_hidden() {
            eprintln!("{SUCCESS_SYMBOL} {}", self.bar.message());
            return;
        }
        self.bar.set_style(
            ProgressStyle::with_template("{prefix:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        self.bar.set_prefix(SUCCESS_SYMBOL);
        self.bar.finish();
    }

    /// Stops the spinner and removes its line.
    pub(crate) fn fail(self) {
        self.bar.finish_and_clear();
    }
}

pub(crate) fn reading_message(kind: InputKind, domain: &str) -> String {
    format!("Reading {kind} from {domain}")
}

pub(crate) fn found_series_message(series: &Series) -> String {
    format!("Found series: {} {}", series.title, series.id)
}

pub(crate) fn found_chapter_message(chapter: &Chapter) -> String {
    format!("Found chapter: {} {}", chapter.display_title(), chapter.id)
}

pub(crate) fn downloading_message(count: usize, noun: &str) -> String {
    format!("Downloading {count} {noun}")
}

pub(crate) fn page_progress_message(stats: DownloadStats) -> String {
    format!("Downloading page {}/{}", stats.downloaded, stats.total)
}

pub(crate) fn chapter_progress_message(stats: DownloadStats) -> String {
    format!("Downloaded chapter {}/{}", stats.downloaded, stats.total)
}

pub(crate) fn downloaded_message(count: usize, noun: &str, path: &std::path::Path) -> String {
    format!("Downloaded {count} {noun} to {}", path.display())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::Path;

    use poketo_core::metadata::{ChapterNumber, Page};

    use super::*;

    fn chapter(title: Option<&str>) -> Chapter {
        Chapter {
            id: "mangadex:13127:269022".to_string(),
            chapter_number: ChapterNumber::from(12),
            volume_number: None,
            title: title.map(str::to_string),
            pages: vec![Page::new("https://img.example/1.png")],
        }
    }

    #[test]
    fn test_reading_message() {
        assert_eq!(
            reading_message(InputKind::Series, "mangadex.org"),
            "Reading series from mangadex.org"
        );
        assert_eq!(
            reading_message(InputKind::Chapter, "merakiscans.com"),
            "Reading chapter from merakiscans.com"
        );
    }

    #[test]
    fn test_found_chapter_message_with_and_without_title() {
        assert_eq!(
            found_chapter_message(&chapter(Some("Finale"))),
            "Found chapter: Chapter 12: Finale mangadex:13127:269022"
        );
        assert_eq!(
            found_chapter_message(&chapter(None)),
            "Found chapter: Chapter 12 mangadex:13127:269022"
        );
    }

    #[test]
    fn test_found_series_message() {
        let series = Series {
            id: "merakiscans:senryu-girl".to_string(),
            title: "Senryu Girl".to_string(),
            cover_image_url: None,
            url: None,
            description: None,
            author: None,
            chapters: Vec::new(),
            extra: serde_json::Map::new(),
        };
        assert_eq!(
            found_series_message(&series),
            "Found series: Senryu Girl merakiscans:senryu-girl"
        );
    }

    #[test]
    fn test_progress_messages() {
        assert_eq!(downloading_message(14, "pages"), "Downloading 14 pages");
        assert_eq!(
            page_progress_message(DownloadStats::new(3, 14)),
            "Downloading page 3/14"
        );
        assert_eq!(
            chapter_progress_message(DownloadStats::new(1, 2)),
            "Downloaded chapter 1/2"
        );
        assert_eq!(
            downloaded_message(2, "chapters", Path::new("./Senryu Girl")),
            "Downloaded 2 chapters to ./Senryu Girl"
        );
    }

    #[test]
    fn test_task_lifecycle_does_not_panic_when_hidden() {
        let task = ProgressTask::start("Reading series from example.com");
        task.set_text("Found series");
        assert_eq!(task.bar().message(), "Found series");
        task.fail();
    }
}
