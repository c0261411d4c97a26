//! Work queue and the fixed-size worker pool draining it.

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use indicatif::ProgressBar;
use scrape_core::output_filename;
use scrape_logging::{scrape_debug, scrape_error, scrape_info, scrape_warn};

use crate::drain::DrainTracker;
use crate::fetch::Fetcher;
use crate::ledger::ChecklistLedger;
use crate::transform::PageTransformer;
use crate::writer::WriteQueue;
use crate::TransformedDocument;

/// Shared pending set of URLs. Each URL is taken by exactly one worker.
#[derive(Debug)]
pub struct WorkQueue {
    tx: Sender<String>,
    rx: Receiver<String>,
    tracker: DrainTracker,
}

impl WorkQueue {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            tx,
            rx,
            tracker: DrainTracker::new(),
        }
    }

    pub fn enqueue(&self, url: impl Into<String>) {
        self.tracker.add(1);
        // The queue owns its receiver, so the channel cannot be disconnected.
        if self.tx.send(url.into()).is_err() {
            self.tracker.done();
        }
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Block until every enqueued URL has been acknowledged by a worker.
    pub fn join(&self) {
        self.tracker.wait();
    }

    fn try_take(&self) -> Option<String> {
        self.rx.try_recv().ok()
    }

    fn task_done(&self) {
        self.tracker.done();
    }
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a worker needs to turn a URL into a written document.
pub struct PoolContext {
    pub fetcher: Arc<dyn Fetcher>,
    pub transformer: PageTransformer,
    pub ledger: Arc<ChecklistLedger>,
    pub docs_dir: PathBuf,
    pub write_queue: WriteQueue,
    pub progress: ProgressBar,
    /// Runtime the async fetcher is driven on.
    pub runtime: tokio::runtime::Handle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolReport {
    /// URLs taken off the queue, whatever their outcome.
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Debug, Default)]
struct PoolCounters {
    processed: AtomicUsize,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
}

pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    counters: Arc<PoolCounters>,
}

impl WorkerPool {
    /// Start `workers` threads (at least one). Each exits as soon as it finds
    /// the queue empty, so fill the queue first.
    pub fn start(
        workers: usize,
        queue: Arc<WorkQueue>,
        ctx: Arc<PoolContext>,
    ) -> io::Result<Self> {
        let counters = Arc::new(PoolCounters::default());
        let mut handles = Vec::with_capacity(workers.max(1));
        for id in 1..=workers.max(1) {
            let queue = queue.clone();
            let ctx = ctx.clone();
            let counters = counters.clone();
            let name = format!("worker-{id}");
            let handle = thread::Builder::new()
                .name(name.clone())
                .spawn(move || worker_loop(&name, &queue, &ctx, &counters))?;
            scrape_debug!("Started thread: worker-{}", id);
            handles.push(handle);
        }
        Ok(Self { handles, counters })
    }

    pub fn join(self) -> PoolReport {
        for handle in self.handles {
            if handle.join().is_err() {
                scrape_error!("Worker thread terminated abnormally");
            }
        }
        PoolReport {
            processed: self.counters.processed.load(Ordering::SeqCst),
            succeeded: self.counters.succeeded.load(Ordering::SeqCst),
            failed: self.counters.failed.load(Ordering::SeqCst),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UrlOutcome {
    Succeeded,
    Failed,
}

fn worker_loop(name: &str, queue: &WorkQueue, ctx: &PoolContext, counters: &PoolCounters) {
    while let Some(url) = queue.try_take() {
        scrape_debug!(url = url.as_str(), worker = name; "Worker {} processing {}", name, url);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| process_url(ctx, &url)))
            .unwrap_or_else(|payload| {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                scrape_error!(
                    url = url.as_str(), worker = name, error_code = 9001u16;
                    "Error processing {} within {}: {}", url, name, reason
                );
                UrlOutcome::Failed
            });

        let counter = match outcome {
            UrlOutcome::Succeeded => &counters.succeeded,
            UrlOutcome::Failed => &counters.failed,
        };
        counter.fetch_add(1, Ordering::SeqCst);
        counters.processed.fetch_add(1, Ordering::SeqCst);
        queue.task_done();
        ctx.progress.inc(1);
    }
    scrape_debug!(worker = name; "Worker {} found queue empty", name);
}

fn process_url(ctx: &PoolContext, url: &str) -> UrlOutcome {
    scrape_info!(url = url; "Processing URL: {}", url);

    let page = match ctx.runtime.block_on(ctx.fetcher.fetch(url)) {
        Ok(page) => page,
        Err(err) => {
            scrape_warn!(
                url = url, error_code = err.kind.code();
                "Skipping URL due to fetch error: {}", url
            );
            return UrlOutcome::Failed;
        }
    };

    let markdown = ctx.transformer.transform(url, &page.text);
    let path = ctx.docs_dir.join(output_filename(url));

    if let Err(err) = ctx.ledger.mark_done(url) {
        let filepath = ctx.ledger.path().display().to_string();
        scrape_error!(
            url = url, filepath = filepath.as_str(), error_code = err.code();
            "Failed to update checklist for {}: {}", url, err
        );
    }

    let filepath = path.display().to_string();
    scrape_debug!(url = url, filepath = filepath.as_str(); "Queueing {} for write", filepath);
    if !ctx.write_queue.submit(TransformedDocument { path, markdown }) {
        return UrlOutcome::Failed;
    }
    UrlOutcome::Succeeded
}
