//! Per-document conversion: bounded retry around the OCR call, then an
//! atomic write of the returned Markdown.
//!
//! ## Retry strategy
//!
//! Transient failures (rate limits, 5xx, network blips) sleep for the
//! policy's fixed delay and try again, up to `max_attempts` total calls.
//! Permanent failures (auth errors, invalid documents) abort the document
//! immediately — remaining attempts are not consumed because they cannot
//! change the outcome.
//!
//! ## Atomic write
//!
//! The Markdown is written to `<dest>.md.tmp` and renamed into place, so an
//! interrupt mid-write never leaves a truncated destination file that the
//! gate would later mistake for a completed conversion. A write failure
//! fails the task without re-running the OCR call — the text is already in
//! hand, and retrying the network call cannot fix a filesystem problem.

use crate::error::DocumentError;
use crate::ocr::{OcrClient, OcrError};
use crate::output::Document;
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Bounded-retry parameters for a single document's OCR calls.
///
/// Distinct from the batch-level inter-call delay, which paces calls across
/// documents rather than attempts within one.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts per document, including the first. Always ≥ 1.
    pub max_attempts: u32,
    /// Sleep between consecutive attempts.
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_secs(5),
        }
    }
}

/// Convert one document: OCR with retry, then write the Markdown atomically.
///
/// Exactly one destination file appears on success; nothing appears on
/// failure.
pub async fn convert_document(
    client: &dyn OcrClient,
    document: &Document,
    destination: &Path,
    policy: &RetryPolicy,
) -> Result<(), DocumentError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut last_detail = String::new();

    for attempt in 1..=max_attempts {
        if attempt > 1 {
            warn!(
                "{}: retry {}/{} after {:?}",
                document.relative.display(),
                attempt,
                max_attempts,
                policy.retry_delay
            );
            sleep(policy.retry_delay).await;
        }

        match client.submit(document).await {
            Ok(markdown) => {
                debug!(
                    "{}: OCR returned {} bytes on attempt {}",
                    document.relative.display(),
                    markdown.len(),
                    attempt
                );
                return write_atomic(destination, &markdown).await;
            }
            Err(OcrError::Transient { detail }) => {
                warn!(
                    "{}: transient API error on attempt {}/{}: {}",
                    document.relative.display(),
                    attempt,
                    max_attempts,
                    detail
                );
                last_detail = detail;
            }
            Err(OcrError::Permanent { detail }) => {
                return Err(DocumentError::Permanent {
                    path: document.path.clone(),
                    detail,
                });
            }
        }
    }

    Err(DocumentError::RetriesExhausted {
        path: document.path.clone(),
        attempts: max_attempts,
        detail: last_detail,
    })
}

/// Write UTF-8 Markdown to `destination` via temp file + rename.
async fn write_atomic(destination: &Path, markdown: &str) -> Result<(), DocumentError> {
    let write_failed = |e: std::io::Error| DocumentError::WriteFailed {
        path: destination.to_path_buf(),
        detail: e.to_string(),
    };

    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
    }

    let tmp_path = destination.with_extension("md.tmp");
    tokio::fs::write(&tmp_path, markdown)
        .await
        .map_err(write_failed)?;
    if let Err(e) = tokio::fs::rename(&tmp_path, destination).await {
        // Best-effort: don't litter the destination tree with temp files.
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_failed(e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::OcrError;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted client: fails transiently until `succeed_on`, then succeeds.
    /// `succeed_on = 0` means never succeed; `permanent` switches the
    /// failure kind.
    struct ScriptedClient {
        calls: AtomicUsize,
        succeed_on: usize,
        permanent: bool,
    }

    impl ScriptedClient {
        fn transient_until(succeed_on: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                succeed_on,
                permanent: false,
            }
        }

        fn always_permanent() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                succeed_on: 0,
                permanent: true,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl OcrClient for ScriptedClient {
        async fn submit(&self, _document: &Document) -> Result<String, OcrError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.permanent {
                return Err(OcrError::Permanent {
                    detail: "HTTP 401 Unauthorized".into(),
                });
            }
            if self.succeed_on != 0 && n >= self.succeed_on {
                Ok("# Extracted\n".into())
            } else {
                Err(OcrError::Transient {
                    detail: "HTTP 502 Bad Gateway".into(),
                })
            }
        }
    }

    fn doc() -> Document {
        Document {
            path: PathBuf::from("pdf/a.pdf"),
            relative: PathBuf::from("a.pdf"),
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            retry_delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn succeeds_on_third_attempt_with_three_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a.md");
        let client = ScriptedClient::transient_until(3);

        convert_document(&client, &doc(), &dest, &fast_policy(3))
            .await
            .unwrap();

        assert_eq!(client.calls(), 3);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "# Extracted\n");
    }

    #[tokio::test]
    async fn exhausts_retries_with_two_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a.md");
        let client = ScriptedClient::transient_until(3);

        let err = convert_document(&client, &doc(), &dest, &fast_policy(2))
            .await
            .unwrap_err();

        assert_eq!(client.calls(), 2);
        assert!(matches!(
            err,
            DocumentError::RetriesExhausted { attempts: 2, .. }
        ));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn permanent_failure_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a.md");
        let client = ScriptedClient::always_permanent();

        let err = convert_document(&client, &doc(), &dest, &fast_policy(5))
            .await
            .unwrap_err();

        assert_eq!(client.calls(), 1);
        assert!(matches!(err, DocumentError::Permanent { .. }));
    }

    #[tokio::test]
    async fn write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("sub/deep/a.md");
        let client = ScriptedClient::transient_until(1);

        convert_document(&client, &doc(), &dest, &fast_policy(1))
            .await
            .unwrap();

        assert!(dest.is_file());
    }

    #[tokio::test]
    async fn write_failure_is_fatal_and_not_retried() {
        let dir = tempfile::tempdir().unwrap();
        // A directory at the destination path makes the rename fail.
        let dest = dir.path().join("a.md");
        std::fs::create_dir(&dest).unwrap();
        let client = ScriptedClient::transient_until(1);

        let err = convert_document(&client, &doc(), &dest, &fast_policy(3))
            .await
            .unwrap_err();

        // One OCR call only: the write failure must not re-trigger OCR.
        assert_eq!(client.calls(), 1);
        assert!(matches!(err, DocumentError::WriteFailed { .. }));
    }

    #[tokio::test]
    async fn no_partial_destination_after_failed_write() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a.md");
        std::fs::create_dir(&dest).unwrap();
        let client = ScriptedClient::transient_until(1);

        let _ = convert_document(&client, &doc(), &dest, &fast_policy(1)).await;

        // The destination is still not a file, so the gate would process it
        // again rather than mistake leftovers for a finished conversion.
        assert!(crate::pipeline::gate::should_process(&dest, false));
    }

    #[tokio::test]
    async fn failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a.md");
        std::fs::create_dir(&dest).unwrap();
        let client = ScriptedClient::transient_until(1);

        let err = convert_document(&client, &doc(), &dest, &fast_policy(1))
            .await
            .unwrap_err();

        assert!(matches!(err, DocumentError::WriteFailed { .. }));
        assert!(
            !dir.path().join("a.md.tmp").exists(),
            "temp file must be cleaned up when the rename fails"
        );
    }

    #[tokio::test]
    async fn zero_attempts_is_clamped_to_one() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a.md");
        let client = ScriptedClient::transient_until(1);

        convert_document(&client, &doc(), &dest, &fast_policy(0))
            .await
            .unwrap();
        assert_eq!(client.calls(), 1);
    }
}
