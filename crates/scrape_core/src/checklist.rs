//! Text format of the scrape checklist.
//!
//! ```text
//! # Scrape Checklist for example_com
//!
//! URLs to process:
//!
//! - [ ] https://example.com/a
//! - [x] https://example.com/b  # Processed: 2024-01-01 12:00:00.123
//! ```

use std::fmt;

const PENDING_PREFIX: &str = "- [ ] ";
const DONE_PREFIX: &str = "- [x] ";
const PROCESSED_MARKER: &str = "  # Processed: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecklistEntry {
    Pending { url: String },
    Done { url: String, processed_at: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryParseError {
    pub line: String,
}

impl fmt::Display for EntryParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed checklist entry: {:?}", self.line)
    }
}

impl std::error::Error for EntryParseError {}

/// Full initial checklist: header plus one pending line per URL, in order.
pub fn render_checklist(base_name: &str, urls: &[String]) -> String {
    let mut out = format!("# Scrape Checklist for {base_name}\n\nURLs to process:\n\n");
    for url in urls {
        out.push_str(&pending_line(url));
        out.push('\n');
    }
    out
}

pub fn pending_line(url: &str) -> String {
    format!("{PENDING_PREFIX}{url}")
}

pub fn done_line(url: &str, processed_at: &str) -> String {
    format!("{DONE_PREFIX}{url}{PROCESSED_MARKER}{processed_at}")
}

/// Rewrite the first line that is exactly `- [ ] <url>` (ignoring surrounding
/// whitespace) into its done form.
///
/// Returns `None` when no pending line matches, so the caller can leave the
/// file untouched.
pub fn mark_first_pending(content: &str, url: &str, processed_at: &str) -> Option<String> {
    let wanted = pending_line(url);
    let mut out = String::with_capacity(content.len() + PROCESSED_MARKER.len() + 32);
    let mut found = false;
    for line in content.split_inclusive('\n') {
        if !found && line.trim() == wanted {
            out.push_str(&done_line(url, processed_at));
            out.push('\n');
            found = true;
        } else {
            out.push_str(line);
        }
    }
    found.then_some(out)
}

/// Parse one checklist line.
///
/// Header, blank and prose lines yield `Ok(None)`. Lines that start like an
/// entry but do not follow the entry format are errors.
pub fn parse_entry(line: &str) -> Result<Option<ChecklistEntry>, EntryParseError> {
    let trimmed = line.trim();
    if !trimmed.starts_with("- [") {
        return Ok(None);
    }
    let malformed = || EntryParseError {
        line: line.to_string(),
    };

    if let Some(url) = trimmed.strip_prefix(PENDING_PREFIX.trim_end()) {
        let url = url.trim();
        if url.is_empty() || url.contains(char::is_whitespace) {
            return Err(malformed());
        }
        return Ok(Some(ChecklistEntry::Pending {
            url: url.to_string(),
        }));
    }

    if let Some(rest) = trimmed.strip_prefix(DONE_PREFIX) {
        let (url, processed_at) = rest.split_once(PROCESSED_MARKER).ok_or_else(malformed)?;
        let url = url.trim();
        let processed_at = processed_at.trim();
        if url.is_empty() || url.contains(char::is_whitespace) || processed_at.is_empty() {
            return Err(malformed());
        }
        return Ok(Some(ChecklistEntry::Done {
            url: url.to_string(),
            processed_at: processed_at.to_string(),
        }));
    }

    Err(malformed())
}
