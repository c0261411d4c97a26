use pretty_assertions::assert_eq;
use scrape_core::{mark_first_pending, parse_entry, render_checklist, ChecklistEntry};

fn urls(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn rendered_checklist_has_header_and_pending_lines_in_order() {
    let text = render_checklist("example_com", &urls(&["https://e.com/a", "https://e.com/b"]));
    assert_eq!(
        text,
        "# Scrape Checklist for example_com\n\nURLs to process:\n\n- [ ] https://e.com/a\n- [ ] https://e.com/b\n"
    );
}

#[test]
fn only_first_pending_duplicate_is_marked() {
    let text = render_checklist("x", &urls(&["https://e.com/a", "https://e.com/a"]));
    let once = mark_first_pending(&text, "https://e.com/a", "T1").unwrap();
    let entries: Vec<_> = once
        .lines()
        .filter_map(|line| parse_entry(line).unwrap())
        .collect();
    assert_eq!(
        entries,
        vec![
            ChecklistEntry::Done {
                url: "https://e.com/a".into(),
                processed_at: "T1".into()
            },
            ChecklistEntry::Pending {
                url: "https://e.com/a".into()
            },
        ]
    );

    let twice = mark_first_pending(&once, "https://e.com/a", "T2").unwrap();
    assert!(mark_first_pending(&twice, "https://e.com/a", "T3").is_none());
}

#[test]
fn prefix_urls_do_not_match() {
    let text = render_checklist("x", &urls(&["https://e.com/a/b"]));
    assert!(mark_first_pending(&text, "https://e.com/a", "T").is_none());
}

#[test]
fn untouched_lines_are_preserved_byte_for_byte() {
    let text = "# Scrape Checklist for x\r\n\r\n- [ ] https://e.com/a\r\n- [ ] https://e.com/b";
    let marked = mark_first_pending(text, "https://e.com/b", "T").unwrap();
    assert_eq!(
        marked,
        "# Scrape Checklist for x\r\n\r\n- [ ] https://e.com/a\r\n- [x] https://e.com/b  # Processed: T\n"
    );
}
