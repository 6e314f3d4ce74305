//! # Crawl Orchestrator
//!
//! Drives one run: fetch the listing page, resolve its detail links, fan the
//! detail units out under a semaphore, and write the dated artifact.
//!
//! Units are independent. A unit that fails to fetch or extract is logged and
//! abandoned while the others continue. Only a failed listing fetch halts the
//! run, and only a failure to write the failure log escapes [`CrawlOrchestrator::run`].

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tokio::sync::{Mutex, RwLock, Semaphore};
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::crawling::state::{RunOutcome, RunState, RunSummary};
use crate::domain::{RunAccumulator, RunClock, SystemClock};
use crate::infrastructure::config::{AppConfig, ExportPolicy};
use crate::infrastructure::csv_export::ExportWriter;
use crate::infrastructure::failure_log::FailureLogger;
use crate::infrastructure::http_client::{HttpClient, PageFetcher};
use crate::infrastructure::parsing::{DetailParseContext, DetailParser, ListingParseContext, ListingParser};
use crate::infrastructure::scrape_error::{CrawlFailure, ExportError, LogError};

/// Run-level settings resolved from [`AppConfig`]
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Origin every href and image path is resolved against
    pub base_url: Url,
    pub listing_url: Url,
    pub max_concurrent_details: usize,
    pub dedupe_links: bool,
    pub export_policy: ExportPolicy,
}

impl OrchestratorConfig {
    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            base_url: config.site.base_url()?,
            listing_url: config.site.listing_url()?,
            max_concurrent_details: config.crawling.max_concurrent_details.max(1),
            dedupe_links: config.crawling.dedupe_links,
            export_policy: config.crawling.export_policy,
        })
    }
}

/// Collaborators shared by the orchestrator and every detail unit
struct Pipeline {
    fetcher: Arc<dyn PageFetcher>,
    listing_parser: ListingParser,
    detail_parser: DetailParser,
    exporter: ExportWriter,
    failure_log: FailureLogger,
    clock: Arc<dyn RunClock>,
    // Held from snapshot through rename so exports never overlap.
    export_lock: Mutex<()>,
}

/// Per-run mutable state
struct RunContext {
    /// Taken once at run start. Every export of the run, including one that
    /// happens after midnight, targets this date's artifact rather than the
    /// date current at write time.
    run_date: NaiveDate,
    accumulator: RunAccumulator,
    failures: AtomicUsize,
}

pub struct CrawlOrchestrator {
    pipeline: Arc<Pipeline>,
    config: OrchestratorConfig,
    state: Arc<RwLock<RunState>>,
}

impl CrawlOrchestrator {
    /// Orchestrator over the live network
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let fetcher = HttpClient::new(&config.http)?;
        Self::new(Arc::new(fetcher), config)
    }

    /// Orchestrator over any page source
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: &AppConfig) -> Result<Self> {
        let listing_parser =
            ListingParser::with_config(&config.selectors.listing).context("Invalid listing selectors")?;
        let detail_parser = DetailParser::with_config(&config.selectors.detail).context("Invalid detail selectors")?;

        Ok(Self {
            pipeline: Arc::new(Pipeline {
                fetcher,
                listing_parser,
                detail_parser,
                exporter: ExportWriter::new(&config.output.data_dir),
                failure_log: FailureLogger::new(&config.output.error_log_path),
                clock: Arc::new(SystemClock),
                export_lock: Mutex::new(()),
            }),
            config: OrchestratorConfig::from_app_config(config)?,
            state: Arc::new(RwLock::new(RunState::Init)),
        })
    }

    /// Replace the clock used for run dates and extraction stamps
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn RunClock>) -> Self {
        if let Some(pipeline) = Arc::get_mut(&mut self.pipeline) {
            pipeline.clock = clock;
        }
        self
    }

    pub const fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Current lifecycle state
    pub async fn state(&self) -> RunState {
        *self.state.read().await
    }

    /// Where the artifact for a given run date is written
    pub fn artifact_path(&self, run_date: NaiveDate) -> PathBuf {
        self.pipeline.exporter.artifact_path(run_date)
    }

    /// Execute one complete run
    pub async fn run(&self) -> Result<RunOutcome, LogError> {
        let run_id = Uuid::new_v4();
        let run = Arc::new(RunContext {
            run_date: self.pipeline.clock.now().date(),
            accumulator: RunAccumulator::new(),
            failures: AtomicUsize::new(0),
        });
        info!("Starting crawl run {} against {}", run_id, self.config.listing_url);

        transition(&self.state, RunState::Init).await;
        if let Err(e) = self.pipeline.exporter.ensure_output_dir().await {
            self.pipeline.record_failure(&run, e.into()).await?;
        }

        transition(&self.state, RunState::FetchingIndex).await;
        let index_page = match self.pipeline.fetcher.fetch(&self.config.listing_url).await {
            Ok(page) => page,
            Err(e) => {
                let reason = e.to_string();
                self.pipeline.record_failure(&run, e.into()).await?;
                transition(&self.state, RunState::Halted).await;
                warn!("Run {} halted: {}", run_id, reason);
                return Ok(RunOutcome::Halted { run_id, reason });
            }
        };

        transition(&self.state, RunState::ExtractingLinks).await;
        let hrefs = self
            .pipeline
            .listing_parser
            .extract_links(&index_page.body, &ListingParseContext::new(self.config.listing_url.as_str()));
        let links = self.resolve_links(hrefs, &run).await?;
        let links_found = links.len();
        info!("Found {} product link(s)", links_found);

        transition(&self.state, RunState::FetchingDetails { outstanding: links_found }).await;
        self.fetch_details(links, &run).await?;

        transition(&self.state, RunState::Done).await;
        let snapshot_len = run.accumulator.len().await;
        let artifact = match self.pipeline.export_snapshot(&run).await {
            Ok(path) => Some(path),
            Err(e) => {
                self.pipeline.record_failure(&run, e.into()).await?;
                None
            }
        };

        let summary = RunSummary {
            run_id,
            links_found,
            records_exported: if artifact.is_some() { snapshot_len } else { 0 },
            failures: run.failures.load(Ordering::SeqCst),
            artifact,
        };
        info!(
            "Run {} completed: {} link(s), {} record(s) exported, {} failure(s)",
            summary.run_id, summary.links_found, summary.records_exported, summary.failures
        );
        Ok(RunOutcome::Completed(summary))
    }

    /// Resolve hrefs against the base origin, dropping invalid ones and
    /// (when enabled) repeats after the first occurrence
    async fn resolve_links(&self, hrefs: Vec<String>, run: &RunContext) -> Result<Vec<Url>, LogError> {
        let mut seen = HashSet::new();
        let mut links = Vec::with_capacity(hrefs.len());

        for href in hrefs {
            let url = match self.config.base_url.join(&href) {
                Ok(url) => url,
                Err(e) => {
                    let failure = CrawlFailure::InvalidLink {
                        href,
                        reason: e.to_string(),
                    };
                    self.pipeline.record_failure(run, failure).await?;
                    continue;
                }
            };

            if self.config.dedupe_links && !seen.insert(url.as_str().to_owned()) {
                debug!("Skipping duplicate link: {}", url);
                continue;
            }
            links.push(url);
        }

        Ok(links)
    }

    /// Run one unit per link, at most `max_concurrent_details` at a time
    async fn fetch_details(&self, links: Vec<Url>, run: &Arc<RunContext>) -> Result<(), LogError> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_details));
        let mut tasks = Vec::with_capacity(links.len());

        debug!(
            "Spawning {} detail unit(s), max {} concurrent",
            links.len(),
            self.config.max_concurrent_details
        );

        for url in &links {
            let pipeline = Arc::clone(&self.pipeline);
            let run = Arc::clone(run);
            let state = Arc::clone(&self.state);
            let semaphore = Arc::clone(&semaphore);
            let base_url = self.config.base_url.clone();
            let policy = self.config.export_policy;
            let url = url.clone();

            tasks.push(tokio::spawn(async move {
                // The semaphore is never closed.
                let _permit = semaphore.acquire_owned().await.ok();
                let result = pipeline.process_detail(&run, base_url, url, policy).await;
                unit_resolved(&state).await;
                result
            }));
        }

        let results = futures::future::join_all(tasks).await;

        let mut log_error = None;
        for (url, result) in links.iter().zip(results) {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    log_error.get_or_insert(e);
                }
                Err(join_error) => {
                    unit_resolved(&self.state).await;
                    let failure = CrawlFailure::TaskAborted {
                        url: url.to_string(),
                        reason: join_error.to_string(),
                    };
                    if let Err(e) = self.pipeline.record_failure(run, failure).await {
                        log_error.get_or_insert(e);
                    }
                }
            }
        }

        log_error.map_or(Ok(()), Err)
    }
}

impl Pipeline {
    /// Fetch and extract one detail page
    async fn process_detail(
        &self,
        run: &RunContext,
        base_url: Url,
        url: Url,
        policy: ExportPolicy,
    ) -> Result<(), LogError> {
        let page = match self.fetcher.fetch(&url).await {
            Ok(page) => page,
            Err(e) => return self.record_failure(run, e.into()).await,
        };

        let context = DetailParseContext::new(url, base_url).with_extracted_at(self.clock.now().time());
        let record = match self.detail_parser.extract_record(&page.body, &context) {
            Ok(record) => record,
            Err(e) => return self.record_failure(run, e.into()).await,
        };

        debug!("Extracted '{}' from {}", record.title(), record.source_url());
        run.accumulator.append(record).await;

        if policy == ExportPolicy::AfterEachRecord {
            if let Err(e) = self.export_snapshot(run).await {
                self.record_failure(run, e.into()).await?;
            }
        }
        Ok(())
    }

    /// Export everything accumulated so far
    async fn export_snapshot(&self, run: &RunContext) -> Result<PathBuf, ExportError> {
        let _guard = self.export_lock.lock().await;
        let snapshot = run.accumulator.snapshot().await;
        self.exporter.export(&snapshot, run.run_date).await
    }

    async fn record_failure(&self, run: &RunContext, failure: CrawlFailure) -> Result<(), LogError> {
        run.failures.fetch_add(1, Ordering::SeqCst);
        self.failure_log.log(&failure).await
    }
}

async fn transition(state: &RwLock<RunState>, next: RunState) {
    let mut current = state.write().await;
    debug!("Run state: {} -> {}", *current, next);
    *current = next;
}

async fn unit_resolved(state: &RwLock<RunState>) {
    if let RunState::FetchingDetails { outstanding } = &mut *state.write().await {
        *outstanding = outstanding.saturating_sub(1);
    }
}
