//! Crawl engine - main harvest orchestration logic
//!
//! The engine drives an iterative, breadth-first traversal from a seed URL:
//! - Pending tasks come off the frontier in FIFO order
//! - Each task is checked against the depth bound and the visited set, then
//!   dispatched to a bounded pool of fetch workers
//! - Workers fetch the page and run the extractors for the harvest mode
//! - The coordinating loop hands records to the sink and enqueues
//!   same-origin links one level deeper
//!
//! Only the coordinating loop touches the sink and the frontier, so sink
//! writes are serialized. The visited set is shared with the workers and its
//! `mark` is the single check-and-insert point for a URL.

use crate::config::Config;
use crate::crawler::extract::{
    extract_api_endpoints, extract_emails, extract_links, extract_script_urls, FileLinkMatcher,
};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::{Frontier, Rejection};
use crate::crawler::HarvestMode;
use crate::output::{ArtifactKind, ArtifactSink, CrawlReport, ExtractedRecord};
use crate::state::{CrawlTask, TaskState, VisitedSet};
use crate::url::{site_key, Origin};
use crate::{FetchError, HarvestError, UrlError};
use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Main crawl engine structure
pub struct Engine {
    mode: HarvestMode,
    fetcher: Fetcher,
    file_matcher: Arc<FileLinkMatcher>,
    sink: Box<dyn ArtifactSink>,
    visited: Arc<VisitedSet>,
    scripts: Arc<VisitedSet>,
    max_depth: u32,
    max_concurrent: usize,
    cancel: CancellationToken,
}

/// Everything a fetch worker needs, cloned per task
#[derive(Clone)]
struct WorkerContext {
    mode: HarvestMode,
    fetcher: Fetcher,
    file_matcher: Arc<FileLinkMatcher>,
    visited: Arc<VisitedSet>,
    scripts: Arc<VisitedSet>,
}

/// Result of visiting one page
enum PageOutcome {
    Extracted {
        task: CrawlTask,
        links: BTreeSet<String>,
        records: Vec<ExtractedRecord>,
        scripts_fetched: u64,
        scripts_failed: u64,
    },
    /// Redirected onto a page another task already owns
    Duplicate {
        task: CrawlTask,
        final_url: Url,
    },
    Failed {
        task: CrawlTask,
        error: FetchError,
    },
}

/// Applies a state transition, rejecting illegal ones
fn advance(task: &CrawlTask, from: TaskState, to: TaskState) -> Result<TaskState, HarvestError> {
    if !from.can_transition_to(to) {
        return Err(HarvestError::InvalidTransition { from, to });
    }
    tracing::trace!("{}: {} -> {}", task.url, from, to);
    Ok(to)
}

impl Engine {
    /// Creates a new engine
    ///
    /// # Arguments
    ///
    /// * `config` - The harvester configuration
    /// * `mode` - Which artifacts to extract
    /// * `sink` - Where extracted records are persisted
    ///
    /// # Returns
    ///
    /// * `Ok(Engine)` - Successfully created engine
    /// * `Err(HarvestError)` - The HTTP client or extraction patterns could not be built
    pub fn new(
        config: &Config,
        mode: HarvestMode,
        sink: Box<dyn ArtifactSink>,
    ) -> Result<Self, HarvestError> {
        let fetcher = Fetcher::new(config)?;
        let file_matcher = FileLinkMatcher::new(&config.extraction.file_extensions)?;

        Ok(Self {
            mode,
            fetcher,
            file_matcher: Arc::new(file_matcher),
            sink,
            visited: Arc::new(VisitedSet::new()),
            scripts: Arc::new(VisitedSet::new()),
            max_depth: config.crawler.max_depth,
            max_concurrent: config.crawler.max_concurrent_fetches.max(1) as usize,
            cancel: CancellationToken::new(),
        })
    }

    /// Overrides the configured maximum depth
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Token that aborts the run when cancelled
    ///
    /// Cancellation is checked before every new fetch; fetches already in
    /// flight finish and their records are still persisted.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// URLs dispatched so far
    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    pub fn mode(&self) -> HarvestMode {
        self.mode
    }

    /// Runs the crawl loop until the frontier drains or the run is cancelled
    ///
    /// Per-URL fetch failures are reported and skipped. A sink failure stops
    /// the run and is returned.
    pub async fn run(&mut self, seed: &Url) -> Result<CrawlReport, HarvestError> {
        let origin = Origin::of(seed).ok_or(UrlError::MissingDomain)?;
        let site = site_key(seed);
        let mut frontier = Frontier::new(CrawlTask::new(seed.clone(), 0), origin, self.max_depth);
        let mut workers: JoinSet<PageOutcome> = JoinSet::new();
        let mut report = CrawlReport::new(seed.as_str());

        self.sink.begin(&site)?;

        tracing::info!(
            "Harvesting {} from {} (max depth {}, {} workers)",
            self.mode.artifact_name(),
            frontier.origin(),
            self.max_depth,
            self.max_concurrent
        );

        loop {
            while workers.len() < self.max_concurrent {
                if self.cancel.is_cancelled() {
                    if !report.cancelled {
                        tracing::warn!(
                            "Crawl cancelled with {} URLs left in frontier",
                            frontier.len()
                        );
                    }
                    report.cancelled = true;
                    break;
                }

                let Some(task) = frontier.pop() else {
                    break;
                };

                let state = TaskState::Pending;
                if !frontier.within_depth(&task) {
                    report.skipped_depth += 1;
                    advance(&task, state, TaskState::Done)?;
                    continue;
                }
                if !self.visited.mark(&task.url) {
                    report.skipped_visited += 1;
                    advance(&task, state, TaskState::Done)?;
                    continue;
                }

                advance(&task, state, TaskState::Fetching)?;
                workers.spawn(visit_page(self.worker_context(), task));
            }

            let Some(joined) = workers.join_next().await else {
                break;
            };
            let outcome = joined.map_err(|e| HarvestError::Worker(e.to_string()))?;
            self.handle_outcome(outcome, &site, &mut frontier, &mut report)?;
        }

        self.sink.finalize()?;

        if report.records_emitted == 0 {
            tracing::info!("No {} found", self.mode.artifact_name());
        }

        report.records_persisted = self.sink.persisted() as u64;
        report.visited = self.visited.snapshot();
        report.finished_at = Some(Utc::now());

        tracing::info!(
            "Crawl completed: {} pages fetched, {} failed, {} records",
            report.pages_fetched,
            report.pages_failed,
            report.records_emitted
        );

        Ok(report)
    }

    fn worker_context(&self) -> WorkerContext {
        WorkerContext {
            mode: self.mode,
            fetcher: self.fetcher.clone(),
            file_matcher: Arc::clone(&self.file_matcher),
            visited: Arc::clone(&self.visited),
            scripts: Arc::clone(&self.scripts),
        }
    }

    /// Persists a page's records and enqueues its in-scope links
    fn handle_outcome(
        &mut self,
        outcome: PageOutcome,
        site: &str,
        frontier: &mut Frontier,
        report: &mut CrawlReport,
    ) -> Result<(), HarvestError> {
        match outcome {
            PageOutcome::Failed { task, error } => {
                let state = advance(&task, TaskState::Fetching, TaskState::Failed)?;
                tracing::warn!("Failed to fetch {}: {}", task.url, error);
                report.pages_failed += 1;
                advance(&task, state, TaskState::Done)?;
            }

            PageOutcome::Duplicate { task, final_url } => {
                let state = advance(&task, TaskState::Fetching, TaskState::Extracting)?;
                tracing::debug!("{} redirected to already visited {}", task.url, final_url);
                report.pages_fetched += 1;
                report.skipped_visited += 1;
                advance(&task, state, TaskState::Done)?;
            }

            PageOutcome::Extracted {
                task,
                links,
                records,
                scripts_fetched,
                scripts_failed,
            } => {
                let state = advance(&task, TaskState::Fetching, TaskState::Extracting)?;
                report.pages_fetched += 1;
                report.scripts_fetched += scripts_fetched;
                report.scripts_failed += scripts_failed;
                let harvested = self.mode.artifact_kind();
                report.records_emitted +=
                    records.iter().filter(|r| r.kind == harvested).count() as u64;

                self.sink.accept(site, &records)?;

                for link in links {
                    let Ok(url) = Url::parse(&link) else {
                        continue;
                    };
                    if self.visited.contains(&url) {
                        report.skipped_visited += 1;
                        continue;
                    }
                    match frontier.offer(&task, url) {
                        Ok(()) => {}
                        Err(Rejection::External) => report.skipped_external += 1,
                        Err(Rejection::TooDeep) => report.skipped_depth += 1,
                    }
                }

                advance(&task, state, TaskState::Done)?;
            }
        }

        Ok(())
    }
}

/// Fetches one page and runs the extractors for the harvest mode
async fn visit_page(ctx: WorkerContext, task: CrawlTask) -> PageOutcome {
    tracing::info!("Crawling: {} (depth: {})", task.url, task.depth);

    let page = match ctx.fetcher.fetch(&task.url).await {
        Ok(page) => page,
        Err(error) => return PageOutcome::Failed { task, error },
    };

    // A redirect target is claimed like any other URL
    if page.url != task.url && !ctx.visited.mark(&page.url) {
        return PageOutcome::Duplicate {
            task,
            final_url: page.url,
        };
    }

    let body = page.body;
    let base = page.url;
    let links = extract_links(&body, &base);
    let mut records = Vec::new();
    let mut scripts_fetched = 0;
    let mut scripts_failed = 0;

    match ctx.mode {
        HarvestMode::DataFiles => {
            records.extend(
                ctx.file_matcher
                    .extract(&body, &base)
                    .into_iter()
                    .map(|url| ExtractedRecord::new(ArtifactKind::DataFileUrl, url)),
            );
        }

        HarvestMode::Emails => {
            records.extend(
                extract_emails(&body)
                    .into_iter()
                    .map(|email| ExtractedRecord::new(ArtifactKind::Email, email)),
            );
        }

        HarvestMode::Apis => {
            for script in extract_script_urls(&body, &base) {
                let Ok(script_url) = Url::parse(&script) else {
                    continue;
                };
                records.push(ExtractedRecord::new(ArtifactKind::ScriptUrl, script));

                // Scripts shared between pages are fetched once per run
                if !ctx.scripts.mark(&script_url) {
                    continue;
                }

                tracing::info!("Checking {}", script_url);
                match ctx.fetcher.fetch(&script_url).await {
                    Ok(script) => {
                        scripts_fetched += 1;
                        records.extend(
                            extract_api_endpoints(&script.body)
                                .into_iter()
                                .map(ExtractedRecord::api_endpoint),
                        );
                    }
                    Err(error) => {
                        scripts_failed += 1;
                        tracing::warn!("Failed to fetch script {}: {}", script_url, error);
                    }
                }
            }
        }
    }

    tracing::debug!(
        "{}: {} links, {} records",
        task.url,
        links.len(),
        records.len()
    );

    PageOutcome::Extracted {
        task,
        links,
        records,
        scripts_fetched,
        scripts_failed,
    }
}
