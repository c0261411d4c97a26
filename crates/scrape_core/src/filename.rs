use url::Url;

/// Base name used when nothing better can be derived from the first URL.
pub const DEFAULT_WEBSITE_NAME: &str = "default_website";

const MAX_BASE_NAME_LEN: usize = 80;

/// Filesystem-safe Markdown filename for a page URL.
///
/// `https://example.com/docs/guide/intro/` becomes `docs_guide_intro.md`.
/// Characters outside `[A-Za-z0-9_.-]` (Unicode letters and digits included)
/// are replaced with `_`. An empty path yields `index.md`.
pub fn output_filename(url: &str) -> String {
    let path = Url::parse(url)
        .map(|parsed| parsed.path().to_string())
        .unwrap_or_default();

    let mut name: String = path
        .trim_matches('/')
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if name.is_empty() {
        return "index.md".to_string();
    }
    if !name.ends_with(".md") {
        name.push_str(".md");
    }
    name
}

/// Host-derived base name: `docs.example.com` becomes `docs_example_com`.
pub fn website_name(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|host| host.replace('.', "_")))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_WEBSITE_NAME.to_string())
}

/// Turn a page heading into a base name usable in file and directory names.
///
/// Returns `None` when nothing usable is left after cleaning.
pub fn sanitize_base_name(heading: &str) -> Option<String> {
    let replaced: String = heading
        .chars()
        .map(|c| if is_forbidden(c) || c.is_whitespace() { '_' } else { c })
        .collect();
    // Splitting on `_` and dropping empty pieces collapses runs of separators.
    let compacted = replaced
        .split('_')
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    let mut name = compacted.trim_matches(&['_', '.'][..]).to_string();
    if name.is_empty() {
        return None;
    }
    if name.chars().count() > MAX_BASE_NAME_LEN {
        name = name.chars().take(MAX_BASE_NAME_LEN).collect();
        name = name.trim_end_matches(&['_', '.'][..]).to_string();
    }
    if is_reserved_windows_name(&name) {
        name.push('_');
    }
    Some(name)
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
