//! CLI entry point for poketo.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use clap::Parser;
use poketo_core::metadata::{
    Chapter, HttpMetadataSource, InputKind, MetadataCache, MetadataError, MetadataSource, Series,
    is_url,
};
use poketo_core::{DownloadOptions, Downloader, HttpClient};
use tracing::{debug, info};
use url::Url;

mod cli;
mod config;
mod output;
mod progress;

use cli::Args;
use config::Config;
use progress::ProgressTask;

/// What the first phase resolved the input to.
enum Resolved {
    Series(Arc<Series>),
    Chapter(Chapter),
}

impl Resolved {
    fn download_count(&self) -> usize {
        match self {
            Self::Series(series) => series.chapters.len(),
            Self::Chapter(chapter) => chapter.pages.len(),
        }
    }

    fn found_message(&self) -> String {
        match self {
            Self::Series(series) => progress::found_series_message(series),
            Self::Chapter(chapter) => progress::found_chapter_message(chapter),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // RUST_LOG wins; otherwise stay quiet so logs do not fight the spinner
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", output::error_line(&format!("{err:#}")));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::from_env()?;
    let input = args.input.trim();

    let source = HttpMetadataSource::with_timeouts(
        &config.api_url,
        config.connect_timeout_secs,
        config.read_timeout_secs,
    )?;

    let kind = source
        .get_type(input)
        .map_err(|e| anyhow!(output::metadata_error_message(&e, InputKind::Series, input)))?;
    let url = if is_url(input) {
        input.to_string()
    } else {
        source
            .construct_url(input)
            .map_err(|e| anyhow!(output::metadata_error_message(&e, kind, input)))?
    };
    let domain = Url::parse(&url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.clone());
    info!(%kind, %url, "resolved input");

    let cache = Arc::new(MetadataCache::new(Arc::new(source)));

    let task = ProgressTask::start(progress::reading_message(kind, &domain));
    let resolved = match resolve(&cache, kind, &url).await {
        Ok(resolved) => resolved,
        Err(e) => {
            task.fail();
            return Err(anyhow!(output::metadata_error_message(&e, kind, &url)));
        }
    };
    task.set_text(resolved.found_message());
    task.succeed();

    let images =
        HttpClient::new_with_timeouts(config.connect_timeout_secs, config.read_timeout_secs)?;
    let downloader = Downloader::new(Arc::clone(&cache), Arc::new(images));

    let count = resolved.download_count();
    let noun = kind.download_noun();
    let task = ProgressTask::start(progress::downloading_message(count, noun));
    let bar = task.bar();

    let result = match &resolved {
        Resolved::Series(series) => {
            let options = DownloadOptions::new(&config.download_dir).on_chapter_complete(
                move |stats| bar.set_message(progress::chapter_progress_message(stats)),
            );
            downloader.download_series(&series.id, &options).await
        }
        Resolved::Chapter(chapter) => {
            let options = DownloadOptions::new(&config.download_dir).on_page_complete(
                move |stats| bar.set_message(progress::page_progress_message(stats)),
            );
            downloader.download_chapter(&chapter.id, &options).await
        }
    };

    match result {
        Ok(dir) => {
            task.set_text(progress::downloaded_message(count, noun, &dir));
            task.succeed();
            Ok(())
        }
        Err(e) => {
            task.fail();
            Err(e.into())
        }
    }
}

/// Fetches the series, or the chapter with its page list, behind `url`.
async fn resolve(
    cache: &MetadataCache,
    kind: InputKind,
    url: &str,
) -> Result<Resolved, MetadataError> {
    match kind {
        InputKind::Series => cache.series_by_url(url).await.map(Resolved::Series),
        InputKind::Chapter => {
            let fetched = cache.chapter_by_url(url).await?;
            cache.full_chapter(&fetched.id).await.map(Resolved::Chapter)
        }
    }
}
