mod support;

use std::fs;
use std::sync::Arc;
use std::thread;

use chrono::NaiveDateTime;
use pretty_assertions::assert_eq;
use scrape_engine::{ChecklistLedger, LedgerError, LedgerSummary, MarkOutcome};
use tempfile::TempDir;

fn urls(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn ledger_in(temp: &TempDir) -> ChecklistLedger {
    ChecklistLedger::new(temp.path().join("site_scrape_checklist.md"))
}

#[test]
fn initialize_writes_header_and_pending_lines_in_order() {
    let temp = TempDir::new().unwrap();
    let ledger = ledger_in(&temp);
    ledger
        .initialize("site", &urls(&["https://e.com/a", "https://e.com/b", "https://e.com/c"]))
        .unwrap();

    assert_eq!(
        fs::read_to_string(ledger.path()).unwrap(),
        "# Scrape Checklist for site\n\nURLs to process:\n\n\
         - [ ] https://e.com/a\n- [ ] https://e.com/b\n- [ ] https://e.com/c\n"
    );
}

#[test]
fn initialize_replaces_a_previous_run() {
    let temp = TempDir::new().unwrap();
    let ledger = ledger_in(&temp);
    fs::write(ledger.path(), "stale content\n").unwrap();
    ledger.initialize("site", &urls(&["https://e.com/a"])).unwrap();
    let content = fs::read_to_string(ledger.path()).unwrap();
    assert!(!content.contains("stale"));
    assert!(content.contains("- [ ] https://e.com/a\n"));
}

#[test]
fn mark_done_touches_only_the_matching_line() {
    let temp = TempDir::new().unwrap();
    let ledger = ledger_in(&temp);
    ledger
        .initialize("site", &urls(&["https://e.com/a", "https://e.com/b", "https://e.com/c"]))
        .unwrap();

    assert_eq!(ledger.mark_done("https://e.com/b").unwrap(), MarkOutcome::Marked);

    let content = fs::read_to_string(ledger.path()).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[4], "- [ ] https://e.com/a");
    assert_eq!(lines[6], "- [ ] https://e.com/c");

    let stamp = lines[5]
        .strip_prefix("- [x] https://e.com/b  # Processed: ")
        .expect("done line format");
    NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S%.3f").expect("timestamp format");
    assert_eq!(stamp.len(), "2024-01-01 00:00:00.000".len());
}

#[test]
fn marking_twice_leaves_the_file_unchanged() {
    support::capture_logs();
    let temp = TempDir::new().unwrap();
    let ledger = ledger_in(&temp);
    ledger.initialize("site", &urls(&["https://e.com/twice"])).unwrap();
    ledger.mark_done("https://e.com/twice").unwrap();
    let before = fs::read(ledger.path()).unwrap();
    assert_eq!(support::warnings_containing("https://e.com/twice"), 0);

    assert_eq!(ledger.mark_done("https://e.com/twice").unwrap(), MarkOutcome::NotPending);
    assert_eq!(fs::read(ledger.path()).unwrap(), before);
    assert_eq!(support::warnings_containing("https://e.com/twice"), 1);
}

#[test]
fn unknown_url_is_not_pending() {
    let temp = TempDir::new().unwrap();
    let ledger = ledger_in(&temp);
    ledger.initialize("site", &urls(&["https://e.com/a"])).unwrap();
    assert_eq!(
        ledger.mark_done("https://e.com/other").unwrap(),
        MarkOutcome::NotPending
    );
    assert_eq!(
        ledger.summary().unwrap(),
        LedgerSummary { pending: 1, done: 0 }
    );
}

#[test]
fn concurrent_marks_are_never_lost() {
    let temp = TempDir::new().unwrap();
    let ledger = Arc::new(ledger_in(&temp));
    let all: Vec<String> = (0..40).map(|i| format!("https://e.com/page{i}")).collect();
    ledger.initialize("site", &all).unwrap();

    let handles: Vec<_> = all
        .iter()
        .cloned()
        .map(|url| {
            let ledger = ledger.clone();
            thread::spawn(move || ledger.mark_done(&url).unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), MarkOutcome::Marked);
    }

    assert_eq!(
        ledger.summary().unwrap(),
        LedgerSummary { pending: 0, done: 40 }
    );
}

#[test]
fn missing_file_is_reported() {
    let temp = TempDir::new().unwrap();
    let ledger = ledger_in(&temp);
    let err = ledger.mark_done("https://e.com/a").unwrap_err();
    assert!(matches!(err, LedgerError::Missing(_)));
    assert_eq!(err.code(), 5004);
}

#[test]
fn malformed_entry_fails_the_summary() {
    let temp = TempDir::new().unwrap();
    let ledger = ledger_in(&temp);
    fs::write(
        ledger.path(),
        "# Scrape Checklist for site\n\nURLs to process:\n\n- [x] https://e.com/a\n",
    )
    .unwrap();
    match ledger.summary().unwrap_err() {
        LedgerError::Malformed { line_no, .. } => assert_eq!(line_no, 5),
        other => panic!("unexpected error: {other}"),
    }
}
