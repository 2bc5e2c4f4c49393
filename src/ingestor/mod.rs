//! Concurrent subscription ingestion
//!
//! [`SubscribeIngestor`] drives every source through its
//! fetch → parse → build → accumulate pipeline under a fixed-size worker
//! cap, then folds the per-source catalogs into one global catalog in
//! submission order. One source's failure never aborts the run; it
//! contributes an empty catalog and still counts toward progress.

pub mod builder;
pub mod fetch;
pub mod progress;

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use url::Url;

use crate::catalog::SubscribeCatalog;
use crate::config::{Config, RequestConfig};
use crate::errors::SourceError;
use crate::models::{SubscribeMode, SubscribeSource};
use crate::playlist::{PlaylistFormat, PlaylistParser};
use crate::utils::retry::{with_retry, RetryConfig};

use builder::EntryBuilder;
use fetch::{HttpFetcher, TextFetcher};
use progress::{ProgressCallback, ProgressReporter};

/// Per-run options for one ingestion call
#[derive(Clone)]
pub struct SubscribeOptions {
    /// Catalog shape for the whole run
    pub mode: SubscribeMode,
    /// When set, only channels whose normalized name is a member survive
    pub filter_names: Option<HashSet<String>>,
    /// Retry transient fetch failures with backoff
    pub retry_enabled: bool,
    /// Log per-source fetch failures
    pub error_print: bool,
    /// Source URLs processed (and merged) ahead of everything else
    pub whitelist: Vec<String>,
    /// Invoked at start and after every source completion
    pub progress: Option<ProgressCallback>,
}

impl Default for SubscribeOptions {
    fn default() -> Self {
        Self {
            mode: SubscribeMode::Plain,
            filter_names: None,
            retry_enabled: true,
            error_print: true,
            whitelist: Vec::new(),
            progress: None,
        }
    }
}

/// Reorder sources so whitelisted ones come first, in whitelist rank
/// order; everything else keeps its original relative order
pub fn order_sources(mut sources: Vec<SubscribeSource>, whitelist: &[String]) -> Vec<SubscribeSource> {
    if whitelist.is_empty() {
        return sources;
    }
    sources.sort_by_key(|source| {
        whitelist
            .iter()
            .position(|white| white == &source.url)
            .unwrap_or(whitelist.len())
    });
    sources
}

/// Check that a source URL is syntactically usable before submission
fn validate_source_url(url: &str) -> Result<(), SourceError> {
    match Url::parse(url) {
        Ok(_) => Ok(()),
        Err(e) => Err(SourceError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        }),
    }
}

/// Orchestrator for concurrent subscription crawls
pub struct SubscribeIngestor {
    config: Config,
}

impl SubscribeIngestor {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Fetch, parse and merge every source into one catalog
    ///
    /// The returned catalog is the union of all reachable sources;
    /// unreachable or malformed ones contribute nothing. This call never
    /// fails as a whole.
    pub async fn ingest(
        &self,
        sources: Vec<SubscribeSource>,
        options: SubscribeOptions,
    ) -> SubscribeCatalog {
        let mode = options.mode;

        let sources: Vec<SubscribeSource> = sources
            .into_iter()
            .filter(|source| match validate_source_url(&source.url) {
                Ok(()) => true,
                Err(e) => {
                    warn!("skipping source: {}", e);
                    false
                }
            })
            .collect();
        let sources = order_sources(sources, &options.whitelist);
        let total = sources.len();

        info!("Fetching {} {} sources", total, mode.label());

        let reporter = ProgressReporter::spawn(total, mode, options.progress.clone());
        let semaphore = Arc::new(Semaphore::new(
            self.config.ingestion.max_concurrent_sources.max(1),
        ));
        let context = Arc::new(PipelineContext {
            request: self.config.request.clone(),
            retry: self.config.ingestion.retry.clone(),
            mode,
            retry_enabled: options.retry_enabled,
            error_print: options.error_print,
            whitelist: options.whitelist,
            filter_names: options.filter_names,
            parser: PlaylistParser::new(),
        });

        // Submit everything up front; the semaphore caps how many
        // pipelines run at once
        let mut pipelines = Vec::with_capacity(total);
        for source in sources {
            let semaphore = semaphore.clone();
            let context = context.clone();
            let progress = reporter.handle();
            pipelines.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let catalog = context.process_source(&source).await;
                progress.source_completed();
                catalog
            }));
        }

        // Buffer all results, then fold in submission order: merge
        // precedence must follow source ordering, not completion order
        let mut catalog = SubscribeCatalog::empty(mode);
        for result in join_all(pipelines).await {
            match result {
                Ok(contribution) => catalog.merge(contribution),
                Err(e) => warn!("source pipeline task failed: {}", e),
            }
        }

        reporter.finish().await;

        info!(
            "Merged {} channels ({} entries) from {} {} sources",
            catalog.channel_count(),
            catalog.entry_count(),
            total,
            mode.label()
        );
        catalog
    }
}

/// Shared, read-only context for every source pipeline
struct PipelineContext {
    request: RequestConfig,
    retry: RetryConfig,
    mode: SubscribeMode,
    retry_enabled: bool,
    error_print: bool,
    whitelist: Vec<String>,
    filter_names: Option<HashSet<String>>,
    parser: PlaylistParser,
}

impl PipelineContext {
    /// One source's fetch → parse → build → accumulate pipeline
    async fn process_source(&self, source: &SubscribeSource) -> SubscribeCatalog {
        let whitelisted = self.whitelist.iter().any(|white| white == &source.url);

        let Some(content) = self.fetch_source_text(&source.url).await else {
            return SubscribeCatalog::empty(self.mode);
        };

        let format = PlaylistFormat::detect(&content);
        let headers_enabled = self.request.open_headers && format == PlaylistFormat::M3u;
        let raw_entries = self.parser.extract(&content, format, headers_enabled);
        debug!(
            "{}: extracted {} raw entries ({:?})",
            source.url,
            raw_entries.len(),
            format
        );

        EntryBuilder::new(self.mode, self.filter_names.as_ref(), source, whitelisted)
            .accumulate(raw_entries)
    }

    /// Fetch one source's text, degrading any failure to `None`
    async fn fetch_source_text(&self, url: &str) -> Option<String> {
        let fetcher = match HttpFetcher::new(&self.request) {
            Ok(fetcher) => fetcher,
            Err(e) => {
                if self.error_print {
                    warn!("failed to build HTTP client for {}: {}", url, e);
                }
                return None;
            }
        };

        debug!("fetching {}", url);
        let result = if self.retry_enabled {
            with_retry(&self.retry, || fetcher.fetch_text(url), url).await
        } else {
            fetcher.fetch_text(url).await
        };

        match result {
            Ok(text) => Some(text),
            Err(SourceError::Timeout { .. }) => {
                if self.error_print {
                    warn!("Timeout on subscribe source: {}", url);
                }
                None
            }
            Err(e) => {
                if self.error_print {
                    warn!("Error on subscribe source {}: {}", url, e);
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(sources: &[SubscribeSource]) -> Vec<&str> {
        sources.iter().map(|s| s.url.as_str()).collect()
    }

    #[test]
    fn empty_whitelist_keeps_original_order() {
        let sources = vec![
            SubscribeSource::new("http://a"),
            SubscribeSource::new("http://b"),
        ];
        let ordered = order_sources(sources.clone(), &[]);
        assert_eq!(ordered, sources);
    }

    #[test]
    fn whitelisted_sources_move_to_front_in_rank_order() {
        let sources = vec![
            SubscribeSource::new("http://a"),
            SubscribeSource::new("http://b"),
            SubscribeSource::new("http://c"),
            SubscribeSource::new("http://d"),
        ];
        let whitelist = vec!["http://d".to_string(), "http://b".to_string()];
        let ordered = order_sources(sources, &whitelist);
        assert_eq!(urls(&ordered), vec!["http://d", "http://b", "http://a", "http://c"]);
    }

    #[test]
    fn non_whitelisted_sources_keep_relative_order() {
        let sources = vec![
            SubscribeSource::new("http://a"),
            SubscribeSource::new("http://b"),
            SubscribeSource::new("http://c"),
        ];
        let whitelist = vec!["http://c".to_string()];
        let ordered = order_sources(sources, &whitelist);
        assert_eq!(urls(&ordered), vec!["http://c", "http://a", "http://b"]);
    }
}
