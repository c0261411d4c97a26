use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use scrape_engine::{FetchSettings, RetryPolicy, ScrapeConfig, DEFAULT_OUTPUT_ROOT, DEFAULT_WORKERS};

/// Scrape every page listed in a documentation tree index into Markdown files.
#[derive(Debug, Parser)]
#[command(name = "scrape_docs", author, version, about)]
pub struct Cli {
    /// URL of the text tree index listing the pages to scrape.
    pub tree_url: String,

    /// Root directory for the checklist and the generated docs.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_ROOT)]
    pub output_dir: PathBuf,

    /// Minimum level written to the JSON log stream.
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Number of concurrent workers.
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Retries after the first failed request (timeouts, connection errors, 5xx).
    #[arg(long, default_value_t = 3)]
    pub max_retries: u32,

    /// Hide the progress bar.
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl Cli {
    pub fn scrape_config(&self) -> ScrapeConfig {
        let timeout = Duration::from_secs(self.timeout_secs);
        let mut config = ScrapeConfig::new(self.tree_url.clone());
        config.output_root = self.output_dir.clone();
        config.workers = self.workers.max(1);
        config.show_progress = !self.no_progress;
        config.fetch = FetchSettings {
            connect_timeout: timeout,
            request_timeout: timeout,
            retry: RetryPolicy {
                max_retries: self.max_retries,
                ..RetryPolicy::default()
            },
            ..FetchSettings::default()
        };
        config
    }
}
