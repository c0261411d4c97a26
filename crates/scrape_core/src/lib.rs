//! Scrape core: pure text and URL rules shared by the pipeline.
mod checklist;
mod filename;
mod tree;

pub use checklist::{
    done_line, mark_first_pending, parse_entry, pending_line, render_checklist, ChecklistEntry,
    EntryParseError,
};
pub use filename::{output_filename, sanitize_base_name, website_name, DEFAULT_WEBSITE_NAME};
pub use tree::{extract_tree_urls, validate_url, TreeUrls};
