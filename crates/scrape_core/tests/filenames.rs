use pretty_assertions::assert_eq;
use scrape_core::{output_filename, sanitize_base_name, website_name, DEFAULT_WEBSITE_NAME};

#[test]
fn path_segments_become_underscored_filename() {
    assert_eq!(
        output_filename("https://example.com/docs/guide/intro/"),
        "docs_guide_intro.md"
    );
}

#[test]
fn existing_md_extension_is_not_doubled() {
    assert_eq!(output_filename("https://example.com/notes/readme.md"), "notes_readme.md");
    assert_eq!(output_filename("http://example.com/docs/page1.html"), "docs_page1.html.md");
}

#[test]
fn disallowed_characters_are_replaced() {
    assert_eq!(
        output_filename("https://example.com/api/v1:items/a%20b"),
        "api_v1_items_a_20b.md"
    );
}

#[test]
fn root_url_falls_back_to_index() {
    assert_eq!(output_filename("https://example.com"), "index.md");
    assert_eq!(output_filename("https://example.com/"), "index.md");
    assert_eq!(output_filename("https://example.com///"), "index.md");
}

#[test]
fn query_and_fragment_do_not_leak_into_filename() {
    assert_eq!(output_filename("https://example.com/a/b?x=1#top"), "a_b.md");
}

#[test]
fn website_name_replaces_dots() {
    assert_eq!(website_name("https://docs.example.com/a"), "docs_example_com");
    assert_eq!(website_name("::nope::"), DEFAULT_WEBSITE_NAME);
}

#[test]
fn heading_is_sanitized_for_filesystem_use() {
    assert_eq!(
        sanitize_base_name("  Rust: The  Book / Intro? ").as_deref(),
        Some("Rust_The_Book_Intro")
    );
    assert_eq!(sanitize_base_name("CON").as_deref(), Some("CON_"));
    assert_eq!(sanitize_base_name(" /// "), None);
}

#[test]
fn long_headings_are_truncated() {
    let heading = "a".repeat(200);
    let name = sanitize_base_name(&heading).unwrap();
    assert_eq!(name.len(), 80);
}
