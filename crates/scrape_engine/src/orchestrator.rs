//! Wires the queues, pool and writer together for one scrape run.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use scrape_core::{extract_tree_urls, sanitize_base_name, website_name};
use scrape_logging::{scrape_error, scrape_info, scrape_warn};
use thiserror::Error;

use crate::convert::{Converter, Html2MdConverter};
use crate::extract::first_heading;
use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::ledger::{ChecklistLedger, LedgerError, LedgerSummary};
use crate::persist::{ensure_output_dir, PersistError};
use crate::pool::{PoolContext, PoolReport, WorkQueue, WorkerPool};
use crate::transform::PageTransformer;
use crate::writer::{spawn_writer, WriterReport};
use crate::FetchError;

pub const DEFAULT_OUTPUT_ROOT: &str = "output_docs";
pub const DEFAULT_WORKERS: usize = 5;

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub tree_url: String,
    pub output_root: PathBuf,
    pub workers: usize,
    pub fetch: FetchSettings,
    pub show_progress: bool,
}

impl ScrapeConfig {
    pub fn new(tree_url: impl Into<String>) -> Self {
        Self {
            tree_url: tree_url.into(),
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            workers: DEFAULT_WORKERS,
            fetch: FetchSettings::default(),
            show_progress: true,
        }
    }
}

/// Injected collaborators, so the pipeline can run against fakes.
#[derive(Clone)]
pub struct Collaborators {
    pub fetcher: Arc<dyn Fetcher>,
    pub converter: Arc<dyn Converter>,
}

impl Collaborators {
    pub fn from_settings(settings: &FetchSettings) -> Result<Self, FetchError> {
        Ok(Self {
            fetcher: Arc::new(ReqwestFetcher::new(settings.clone())?),
            converter: Arc::new(Html2MdConverter),
        })
    }
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to fetch tree index {url}: {source}")]
    TreeFetch { url: String, source: FetchError },
    #[error("no URLs extracted from the tree index")]
    NoUrlsExtracted,
    #[error("no valid URLs found after validation")]
    NoValidUrls,
    #[error("cannot prepare output directory: {0}")]
    OutputDir(#[from] PersistError),
    #[error("cannot write checklist: {0}")]
    Checklist(#[from] LedgerError),
    #[error("failed to start {what}: {source}")]
    Startup {
        what: &'static str,
        source: io::Error,
    },
}

impl RunError {
    /// Numeric classification carried in the `error_code` log field.
    pub fn code(&self) -> u16 {
        match self {
            RunError::TreeFetch { .. } => 6001,
            RunError::NoUrlsExtracted | RunError::NoValidUrls => 6003,
            RunError::OutputDir(_) | RunError::Checklist(_) => 5002,
            RunError::Startup { .. } => 9001,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub base_name: String,
    pub checklist_path: PathBuf,
    pub docs_dir: PathBuf,
    /// Lines whose last token looked like a URL.
    pub candidates: usize,
    /// Candidates that failed validation.
    pub rejected: usize,
    pub pool: PoolReport,
    pub writer: WriterReport,
    /// `None` when the checklist could not be re-read at the end of the run.
    pub ledger: Option<LedgerSummary>,
}

/// Run a complete scrape.
///
/// Blocks until every URL was processed and every document written. Must be
/// called from a plain thread, not from inside an async runtime.
pub fn run_scrape(config: &ScrapeConfig, collaborators: Collaborators) -> Result<RunSummary, RunError> {
    let runtime = tokio::runtime::Runtime::new().map_err(|source| RunError::Startup {
        what: "async runtime",
        source,
    })?;
    let fetcher = collaborators.fetcher;

    scrape_info!(url = config.tree_url.as_str(); "Starting scrape process for URL tree: {}", config.tree_url);
    let tree = runtime
        .block_on(fetcher.fetch(&config.tree_url))
        .map_err(|source| RunError::TreeFetch {
            url: config.tree_url.clone(),
            source,
        })
        .inspect_err(fatal)?;

    let extracted = extract_tree_urls(&tree.text);
    for line in &extracted.rejected_lines {
        scrape_warn!("Ignoring invalid URL format found in line: {}", line.trim());
    }
    let candidates = extracted.urls.len() + extracted.rejected_lines.len();
    if candidates == 0 {
        let err = RunError::NoUrlsExtracted;
        fatal(&err);
        return Err(err);
    }
    if extracted.urls.is_empty() {
        let err = RunError::NoValidUrls;
        fatal(&err);
        return Err(err);
    }
    let urls = extracted.urls;
    scrape_info!("Extracted {} URLs from the tree structure", urls.len());

    let base_name = derive_base_name(&runtime, fetcher.as_ref(), &urls[0]);
    scrape_info!("Derived base name: {}", base_name);

    let docs_dir = config.output_root.join(format!("{base_name}_docs"));
    ensure_output_dir(&config.output_root)
        .and_then(|()| ensure_output_dir(&docs_dir))
        .map_err(RunError::from)
        .inspect_err(fatal)?;
    scrape_info!("Ensured output directory exists: {}", docs_dir.display());

    let ledger = Arc::new(ChecklistLedger::new(
        config
            .output_root
            .join(format!("{base_name}_scrape_checklist.md")),
    ));
    ledger
        .initialize(&base_name, &urls)
        .map_err(RunError::from)
        .inspect_err(fatal)?;

    let (write_queue, writer) = spawn_writer()
        .map_err(|source| RunError::Startup {
            what: "writer thread",
            source,
        })
        .inspect_err(fatal)?;

    let queue = Arc::new(WorkQueue::new());
    for url in &urls {
        queue.enqueue(url.as_str());
    }
    scrape_info!("Populated URL queue with {} URLs", urls.len());

    let progress = progress_bar(config.show_progress, urls.len() as u64);
    let ctx = Arc::new(PoolContext {
        fetcher: fetcher.clone(),
        transformer: PageTransformer::new(collaborators.converter),
        ledger: ledger.clone(),
        docs_dir: docs_dir.clone(),
        write_queue: write_queue.clone(),
        progress: progress.clone(),
        runtime: runtime.handle().clone(),
    });

    scrape_info!("Setup complete. Starting concurrent URL processing with {} workers", config.workers.max(1));
    let pool = match WorkerPool::start(config.workers, queue.clone(), ctx) {
        Ok(pool) => pool,
        Err(source) => {
            // Let the writer finish what it has before giving up.
            write_queue.stop();
            write_queue.wait_drained();
            writer.join();
            let err = RunError::Startup {
                what: "worker pool",
                source,
            };
            fatal(&err);
            return Err(err);
        }
    };

    scrape_info!("Waiting for all URLs to be processed...");
    queue.join();
    let pool_report = pool.join();
    progress.finish_and_clear();
    scrape_info!(
        "All URLs processed: {} succeeded, {} failed",
        pool_report.succeeded,
        pool_report.failed
    );

    write_queue.stop();
    write_queue.wait_drained();
    let writer_report = writer.join();
    scrape_info!(
        "Write queue drained: {} written, {} failed",
        writer_report.written,
        writer_report.failed
    );

    let ledger_summary = match ledger.summary() {
        Ok(summary) => {
            scrape_info!(
                "Checklist reports {} done, {} pending",
                summary.done,
                summary.pending
            );
            Some(summary)
        }
        Err(err) => {
            scrape_error!(error_code = err.code(); "Could not re-read checklist: {}", err);
            None
        }
    };

    scrape_info!("Scraping process finished.");
    Ok(RunSummary {
        base_name,
        checklist_path: ledger.path().to_path_buf(),
        docs_dir,
        candidates,
        rejected: candidates - urls.len(),
        pool: pool_report,
        writer: writer_report,
        ledger: ledger_summary,
    })
}

/// Base name from the first page's main heading, else from its host.
fn derive_base_name(runtime: &tokio::runtime::Runtime, fetcher: &dyn Fetcher, first_url: &str) -> String {
    match runtime.block_on(fetcher.fetch(first_url)) {
        Ok(page) => {
            if let Some(name) = first_heading(&page.text).and_then(|h| sanitize_base_name(&h)) {
                return name;
            }
            scrape_info!(url = first_url; "No usable heading on {}; using host name", first_url);
        }
        Err(err) => {
            scrape_warn!(
                url = first_url, error_code = err.kind.code();
                "Could not fetch {} to derive a base name; using host name", first_url
            );
        }
    }
    website_name(first_url)
}

fn progress_bar(visible: bool, total: u64) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len} urls ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.set_message("Processing URLs");
    bar
}

fn fatal(err: &RunError) {
    scrape_error!(error_code = err.code(); "{}. Exiting.", err);
}
