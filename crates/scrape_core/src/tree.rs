use url::Url;

/// URLs pulled out of a tree-index document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TreeUrls {
    /// Valid absolute URLs, in input order. Duplicates are kept.
    pub urls: Vec<String>,
    /// Lines whose last token looked like a URL but failed validation.
    pub rejected_lines: Vec<String>,
}

/// Extract target URLs from a tree-index text such as:
///
/// ```text
/// docs
/// ├── https://example.com/docs/intro
/// └── https://example.com/docs/setup
/// ```
///
/// The last whitespace-delimited token of each non-blank line is a candidate
/// when it starts with `http://` or `https://`.
pub fn extract_tree_urls(text: &str) -> TreeUrls {
    let mut out = TreeUrls::default();
    for line in text.lines() {
        let Some(candidate) = line.split_whitespace().last() else {
            continue;
        };
        if !(candidate.starts_with("http://") || candidate.starts_with("https://")) {
            continue;
        }
        if validate_url(candidate).is_some() {
            out.urls.push(candidate.to_string());
        } else {
            out.rejected_lines.push(line.to_string());
        }
    }
    out
}

/// A URL is valid when it parses with both a scheme and a host.
pub fn validate_url(candidate: &str) -> Option<Url> {
    let url = Url::parse(candidate).ok()?;
    if url.scheme().is_empty() || url.host_str().map_or(true, str::is_empty) {
        return None;
    }
    Some(url)
}
