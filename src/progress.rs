//! Progress-callback trait for per-document batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::BatchConfigBuilder::progress_callback`] to receive
//! events as the runner works through the batch. The CLI uses this to drive
//! an indicatif progress bar; library callers can forward events to a
//! channel, a log, or a UI without the library knowing anything about the
//! host application.
//!
//! Documents are processed strictly sequentially, so callbacks are never
//! invoked concurrently; the trait is still `Send + Sync` so callers can
//! share one callback across tasks.

use std::sync::Arc;

/// Called by the batch runner as it works through discovered documents.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once after scanning, before the first document is handled.
    fn on_batch_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called when the gate declines a document (destination exists).
    fn on_document_skipped(&self, relative: &str) {
        let _ = relative;
    }

    /// Called just before a document's OCR conversion begins.
    fn on_document_start(&self, relative: &str) {
        let _ = relative;
    }

    /// Called when a document's Markdown has been written.
    fn on_document_complete(&self, relative: &str, markdown_path: &str) {
        let _ = (relative, markdown_path);
    }

    /// Called when a document fails after retries or permanently.
    fn on_document_error(&self, relative: &str, error: &str) {
        let _ = (relative, error);
    }

    /// Called once after every document has been attempted.
    fn on_batch_complete(&self, processed: usize, skipped: usize, failed: usize) {
        let _ = (processed, skipped, failed);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::BatchConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
