use std::time::Duration;

use reqwest::Method;
use scrape_logging::{scrape_debug, scrape_error, scrape_info, scrape_warn};

use crate::decode::decode_utf8_lossy;
use crate::retry::RetryPolicy;
use crate::{FailureKind, FetchError, FetchMetadata, FetchOutput};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub user_agent: String,
    pub retry: RetryPolicy,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(10),
            redirect_limit: 10,
            user_agent: concat!("scrape_docs/", env!("CARGO_PKG_VERSION")).to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Network retrieval of a single page as text.
///
/// Implementations never panic on network trouble: every failure comes back
/// as a classified [`FetchError`].
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|err| FetchError::new(FailureKind::Other, err.to_string()))?;
        Ok(Self { settings, client })
    }

    async fn attempt(&self, url: &reqwest::Url) -> Result<(String, Vec<u8>), FetchError> {
        let response = self
            .client
            .request(Method::GET, url.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let final_url = response.url().to_string();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        Ok((final_url, bytes.to_vec()))
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::Other, err.to_string()))?;
        let policy = &self.settings.retry;
        let may_retry = policy.allows_method(&Method::GET);

        scrape_info!(url = url; "Fetching content from: {}", url);
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match self.attempt(&parsed).await {
                Ok((final_url, bytes)) => {
                    let decoded = decode_utf8_lossy(&bytes);
                    if decoded.lossy {
                        scrape_debug!(url = url; "Replaced invalid UTF-8 sequences in {}", url);
                    }
                    scrape_info!(url = url; "Successfully fetched content from: {}", url);
                    return Ok(FetchOutput {
                        text: decoded.text,
                        metadata: FetchMetadata {
                            original_url: url.to_string(),
                            final_url,
                            attempts,
                            byte_len: bytes.len() as u64,
                            lossy: decoded.lossy,
                        },
                    });
                }
                Err(err) => {
                    let delay = if may_retry && policy.is_retryable(err.kind) {
                        policy.delay_before(attempts)
                    } else {
                        None
                    };
                    match delay {
                        Some(delay) => {
                            scrape_debug!(
                                url = url, error_code = err.kind.code();
                                "Retrying {} in {:?} after {}", url, delay, err
                            );
                            tokio::time::sleep(delay).await;
                        }
                        None => {
                            log_failure(url, &err);
                            return Err(err);
                        }
                    }
                }
            }
        }
    }
}

fn log_failure(url: &str, err: &FetchError) {
    let code = err.kind.code();
    match err.kind {
        FailureKind::HttpStatus(status) => {
            scrape_warn!(
                url = url, error_code = code, status_code = status;
                "HTTP error fetching {}: {}", url, status
            );
        }
        FailureKind::Timeout => {
            scrape_error!(url = url, error_code = code; "Timeout fetching {}: {}", url, err.message);
        }
        FailureKind::ConnectionError => {
            scrape_error!(
                url = url, error_code = code;
                "Connection error fetching {}: {}", url, err.message
            );
        }
        FailureKind::Other => {
            scrape_error!(
                url = url, error_code = code;
                "General request error fetching {}: {}", url, err.message
            );
        }
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_connect() || err.is_request() {
        return FetchError::new(FailureKind::ConnectionError, err.to_string());
    }
    FetchError::new(FailureKind::Other, err.to_string())
}
