//! Result types produced by a batch run.
//!
//! [`crate::batch::run`] returns a [`BatchOutput`]: one [`ConversionTask`]
//! per discovered document plus a [`BatchSummary`] of counts. Keeping the
//! full task list (not just the counts) lets callers build reports, retry
//! only the failed subset, or assert exact behaviour in tests.

use crate::error::DocumentError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A source PDF discovered under the scan root.
///
/// Immutable once discovered. `relative` is the path under the scan root and
/// drives both glob matching and destination-path computation; `path` is the
/// full path used to read the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Full path to the source file.
    pub path: PathBuf,
    /// Path relative to the scan root.
    pub relative: PathBuf,
}

impl Document {
    /// File name of the source document, for API upload metadata and logs.
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document.pdf")
    }
}

/// Lifecycle state of a [`ConversionTask`].
///
/// `Pending → Skipped | Succeeded | Failed`; the three right-hand states are
/// terminal. A dry run leaves would-be-processed tasks `Pending` (nothing
/// actually happened to them) while counting them as processed in the
/// summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Discovered but not yet gated or converted.
    Pending,
    /// Destination already exists and `force` was not set.
    Skipped,
    /// Markdown written to the destination path.
    Succeeded,
    /// Retries exhausted, permanent API error, or write failure.
    Failed,
}

/// One document's trip through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionTask {
    /// The source document.
    pub document: Document,
    /// Computed destination path (under the destination root, `.md`).
    pub destination: PathBuf,
    /// Current lifecycle state.
    pub status: TaskStatus,
    /// Failure reason when `status == Failed`.
    pub error: Option<DocumentError>,
}

impl ConversionTask {
    /// Create a task in the `Pending` state.
    pub fn new(document: Document, destination: PathBuf) -> Self {
        Self {
            document,
            destination,
            status: TaskStatus::Pending,
            error: None,
        }
    }
}

/// Aggregated counts for a completed batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Documents converted (or, in dry-run, that would have been).
    pub processed: usize,
    /// Documents skipped because their destination already existed.
    pub skipped: usize,
    /// Documents that failed after retries or permanently.
    pub failed: usize,
}

impl BatchSummary {
    /// True when no document failed. Drives the process exit code.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of documents considered.
    pub fn total(&self) -> usize {
        self.processed + self.skipped + self.failed
    }
}

/// Everything a batch run produced: per-document tasks plus the summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutput {
    /// One entry per discovered document, in scan order.
    pub tasks: Vec<ConversionTask>,
    /// Aggregated counts.
    pub summary: BatchSummary,
}

impl BatchOutput {
    /// The tasks that ended in [`TaskStatus::Failed`].
    pub fn failures(&self) -> impl Iterator<Item = &ConversionTask> {
        self.tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Failed)
    }
}

/// Build a `Document` from a full path and the root it was found under.
///
/// Callers must pass a `path` under `root`; the scanner guarantees this by
/// construction.
pub(crate) fn document_under(root: &Path, path: &Path) -> Document {
    let relative = path
        .strip_prefix(root)
        .expect("scanned path must live under the scan root")
        .to_path_buf();
    Document {
        path: path.to_path_buf(),
        relative,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_starts_pending() {
        let doc = document_under(Path::new("pdf"), Path::new("pdf/sub/a.pdf"));
        let task = ConversionTask::new(doc, PathBuf::from("markdown/sub/a.md"));
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.error.is_none());
        assert_eq!(task.document.relative, Path::new("sub/a.pdf"));
    }

    #[test]
    fn summary_success_iff_no_failures() {
        let ok = BatchSummary {
            processed: 2,
            skipped: 1,
            failed: 0,
        };
        assert!(ok.is_success());
        assert_eq!(ok.total(), 3);

        let bad = BatchSummary {
            failed: 1,
            ..BatchSummary::default()
        };
        assert!(!bad.is_success());
    }

    #[test]
    fn document_file_name() {
        let doc = document_under(Path::new("pdf"), Path::new("pdf/report.pdf"));
        assert_eq!(doc.file_name(), "report.pdf");
    }

    #[test]
    fn failures_filters_failed_tasks() {
        let doc = document_under(Path::new("pdf"), Path::new("pdf/a.pdf"));
        let mut failed = ConversionTask::new(doc.clone(), PathBuf::from("markdown/a.md"));
        failed.status = TaskStatus::Failed;
        let skipped = ConversionTask {
            status: TaskStatus::Skipped,
            ..ConversionTask::new(doc, PathBuf::from("markdown/a.md"))
        };
        let output = BatchOutput {
            tasks: vec![failed, skipped],
            summary: BatchSummary {
                processed: 0,
                skipped: 1,
                failed: 1,
            },
        };
        assert_eq!(output.failures().count(), 1);
    }
}
