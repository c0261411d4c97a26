//! Scrape engine: fetch, transform, checklist and write pipeline.
mod convert;
mod decode;
mod drain;
mod extract;
mod fetch;
mod ledger;
mod normalize;
mod orchestrator;
mod persist;
mod pool;
mod retry;
mod transform;
mod types;
mod writer;

pub use convert::{ConvertError, Converter, Html2MdConverter};
pub use decode::{decode_utf8_lossy, DecodedText};
pub use drain::DrainTracker;
pub use extract::first_heading;
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use ledger::{ChecklistLedger, LedgerError, LedgerSummary, MarkOutcome};
pub use normalize::{image_markdown, normalize_document, ImagePlaceholder, NormalizedHtml};
pub use orchestrator::{
    run_scrape, Collaborators, RunError, RunSummary, ScrapeConfig, DEFAULT_OUTPUT_ROOT,
    DEFAULT_WORKERS,
};
pub use persist::{ensure_output_dir, write_atomic, PersistError};
pub use pool::{PoolContext, PoolReport, WorkQueue, WorkerPool};
pub use retry::{RetryPolicy, DEFAULT_MAX_RETRIES};
pub use transform::{PageTransformer, CONVERSION_FAILED_MARKER};
pub use types::{FailureKind, FetchError, FetchMetadata, FetchOutput, TransformedDocument};
pub use writer::{spawn_writer, WriteQueue, WriterHandle, WriterReport};
