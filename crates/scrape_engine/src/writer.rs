//! Write queue and its single dedicated writer thread.

use std::io;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use scrape_logging::{scrape_debug, scrape_error, scrape_info};

use crate::drain::DrainTracker;
use crate::persist::write_atomic;
use crate::TransformedDocument;

#[derive(Debug)]
enum WriteItem {
    Document(TransformedDocument),
    /// Nothing more will be enqueued; the writer exits after acknowledging it.
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriterReport {
    pub written: usize,
    pub failed: usize,
}

/// Producer side of the write queue. Cheap to clone; one per worker.
#[derive(Debug, Clone)]
pub struct WriteQueue {
    tx: Sender<WriteItem>,
    tracker: DrainTracker,
}

impl WriteQueue {
    /// Hand a document over to the writer. Returns `false` if the writer is
    /// gone and the document was dropped.
    pub fn submit(&self, document: TransformedDocument) -> bool {
        self.send(WriteItem::Document(document))
    }

    /// Enqueue the stop sentinel behind everything already submitted.
    pub fn stop(&self) -> bool {
        self.send(WriteItem::Stop)
    }

    /// Block until every submitted item, sentinel included, was handled.
    pub fn wait_drained(&self) {
        self.tracker.wait();
    }

    fn send(&self, item: WriteItem) -> bool {
        self.tracker.add(1);
        if self.tx.send(item).is_err() {
            self.tracker.done();
            scrape_error!("Write queue closed; item dropped");
            return false;
        }
        true
    }
}

pub struct WriterHandle {
    handle: JoinHandle<WriterReport>,
}

impl WriterHandle {
    pub fn join(self) -> WriterReport {
        self.handle.join().unwrap_or_else(|_| {
            scrape_error!("Writer thread panicked");
            WriterReport::default()
        })
    }
}

/// Start the writer thread and return the queue feeding it.
pub fn spawn_writer() -> io::Result<(WriteQueue, WriterHandle)> {
    let (tx, rx) = crossbeam_channel::unbounded();
    let tracker = DrainTracker::new();
    let worker_tracker = tracker.clone();
    let handle = thread::Builder::new()
        .name("writer".to_string())
        .spawn(move || writer_loop(rx, worker_tracker))?;
    Ok((WriteQueue { tx, tracker }, WriterHandle { handle }))
}

fn writer_loop(rx: Receiver<WriteItem>, tracker: DrainTracker) -> WriterReport {
    let mut report = WriterReport::default();
    scrape_debug!("Writer started");
    while let Ok(item) = rx.recv() {
        match item {
            WriteItem::Document(document) => {
                let filepath = document.path.display().to_string();
                match write_atomic(&document.path, &document.markdown) {
                    Ok(()) => {
                        report.written += 1;
                        scrape_info!(filepath = filepath.as_str(); "Successfully saved: {}", filepath);
                    }
                    Err(err) => {
                        report.failed += 1;
                        scrape_error!(
                            filepath = filepath.as_str(), error_code = 5002u16;
                            "Error writing file {}: {}", filepath, err
                        );
                    }
                }
                tracker.done();
            }
            WriteItem::Stop => {
                tracker.done();
                break;
            }
        }
    }
    scrape_debug!("Writer stopped");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn writes_everything_submitted_before_stop() {
        let temp = tempfile::TempDir::new().unwrap();
        let (queue, handle) = spawn_writer().unwrap();
        for i in 0..5 {
            assert!(queue.submit(TransformedDocument {
                path: temp.path().join(format!("doc{i}.md")),
                markdown: format!("# Doc {i}\n"),
            }));
        }
        assert!(queue.stop());
        queue.wait_drained();

        let report = handle.join();
        assert_eq!(report, WriterReport { written: 5, failed: 0 });
        assert_eq!(
            fs::read_to_string(temp.path().join("doc3.md")).unwrap(),
            "# Doc 3\n"
        );
    }

    #[test]
    fn failed_write_does_not_stop_the_writer() {
        let temp = tempfile::TempDir::new().unwrap();
        let (queue, handle) = spawn_writer().unwrap();
        queue.submit(TransformedDocument {
            path: temp.path().join("missing_dir").join("a.md"),
            markdown: "lost".into(),
        });
        queue.submit(TransformedDocument {
            path: temp.path().join("b.md"),
            markdown: "kept".into(),
        });
        queue.stop();
        queue.wait_drained();

        let report = handle.join();
        assert_eq!(report, WriterReport { written: 1, failed: 1 });
        assert_eq!(fs::read_to_string(temp.path().join("b.md")).unwrap(), "kept");
    }

    #[test]
    fn existing_files_are_overwritten() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("page.md");
        fs::write(&path, "old").unwrap();
        let (queue, handle) = spawn_writer().unwrap();
        queue.submit(TransformedDocument {
            path: path.clone(),
            markdown: "new".into(),
        });
        queue.stop();
        queue.wait_drained();
        handle.join();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }
}
