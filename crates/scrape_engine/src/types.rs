use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub text: String,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    /// Requests issued, including the first one.
    pub attempts: u32,
    pub byte_len: u64,
    /// Invalid UTF-8 sequences were replaced with U+FFFD.
    pub lossy: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    ConnectionError,
    HttpStatus(u16),
    Other,
}

impl FailureKind {
    /// Numeric classification carried in the `error_code` log field.
    pub fn code(&self) -> u16 {
        match self {
            FailureKind::Other => 1000,
            FailureKind::Timeout => 1001,
            FailureKind::ConnectionError => 1002,
            FailureKind::HttpStatus(_) => 1003,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::ConnectionError => write!(f, "connection error"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Other => write!(f, "request error"),
        }
    }
}

/// A page ready for disk: where it goes and what it says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedDocument {
    pub path: PathBuf,
    pub markdown: String,
}
