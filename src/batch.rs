//! The batch driver: scan → gate → convert, one document at a time.
//!
//! Processing is deliberately sequential. The remote OCR service is
//! rate-limited, so documents are submitted one by one with a configurable
//! pause between calls; the only blocking operations are the network call
//! and that pause. A single document's failure is recorded and the run
//! moves on — only preflight conditions (missing credential, bad source
//! root, bad pattern) abort the whole batch.

use crate::config::BatchConfig;
use crate::error::BatchError;
use crate::ocr::{MistralOcrClient, OcrClient};
use crate::output::{BatchOutput, BatchSummary, ConversionTask, TaskStatus};
use crate::pipeline::convert::convert_document;
use crate::pipeline::gate;
use crate::pipeline::mirror::PathMirror;
use crate::pipeline::scan::DocumentScanner;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{info, warn};

/// Run a batch conversion pass over the configured source tree.
///
/// Returns `Ok(BatchOutput)` even when individual documents failed — check
/// `output.summary.is_success()`. `Err(BatchError)` means the run could not
/// start at all.
///
/// In dry-run mode no OCR client is constructed, no API call is made, and
/// no file is written; would-be conversions are reported and counted as
/// processed.
pub async fn run(config: &BatchConfig) -> Result<BatchOutput, BatchError> {
    let scanner = DocumentScanner::new(&config.source_root, config.patterns.as_deref())?;
    let mirror = PathMirror::new(&config.source_root, &config.dest_root);

    // Resolving the client up front keeps credential problems a preflight
    // failure instead of a per-document one. Dry-run skips this entirely:
    // reporting what would happen must not require a key.
    let client = if config.dry_run {
        None
    } else {
        let client = resolve_client(config)?;
        info!("Testing OCR API connection...");
        client
            .healthcheck()
            .await
            .map_err(|e| BatchError::HealthcheckFailed {
                detail: e.detail().to_string(),
            })?;
        info!("API connection OK");

        tokio::fs::create_dir_all(&config.dest_root)
            .await
            .map_err(|source| BatchError::DestRootCreateFailed {
                path: config.dest_root.clone(),
                source,
            })?;
        Some(client)
    };

    // Collect up front so the progress callback can announce a total. The
    // scan is cheap relative to even one OCR call.
    let documents: Vec<_> = scanner.scan().collect();
    info!("Found {} PDF files", documents.len());
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(documents.len());
    }

    let policy = config.retry_policy();
    let inter_call_delay = config.inter_call_delay();
    let mut tasks = Vec::with_capacity(documents.len());
    let mut summary = BatchSummary::default();
    let mut any_call_made = false;

    for document in documents {
        let destination = mirror.destination_for(&document.path);
        let relative = document.relative.display().to_string();
        let mut task = ConversionTask::new(document, destination);

        if !gate::should_process(&task.destination, config.force) {
            info!("Skipping {} (already converted)", relative);
            if let Some(ref cb) = config.progress_callback {
                cb.on_document_skipped(&relative);
            }
            task.status = TaskStatus::Skipped;
            summary.skipped += 1;
            tasks.push(task);
            continue;
        }

        if config.dry_run {
            info!(
                "Would convert: {} -> {}",
                task.document.path.display(),
                task.destination.display()
            );
            summary.processed += 1;
            tasks.push(task);
            continue;
        }

        let client = client
            .as_ref()
            .expect("client resolved for non-dry-run batches");

        // Pace calls to the remote service. Applies between documents, on
        // top of any intra-document retry delays.
        if any_call_made && !inter_call_delay.is_zero() {
            info!("Waiting {:?} before next document...", inter_call_delay);
            sleep(inter_call_delay).await;
        }
        any_call_made = true;

        info!("Converting {}", relative);
        if let Some(ref cb) = config.progress_callback {
            cb.on_document_start(&relative);
        }

        match convert_document(client.as_ref(), &task.document, &task.destination, &policy).await
        {
            Ok(()) => {
                info!("Saved {}", task.destination.display());
                if let Some(ref cb) = config.progress_callback {
                    cb.on_document_complete(&relative, &task.destination.display().to_string());
                }
                task.status = TaskStatus::Succeeded;
                summary.processed += 1;
            }
            Err(e) => {
                warn!("{e}");
                if let Some(ref cb) = config.progress_callback {
                    cb.on_document_error(&relative, &e.to_string());
                }
                task.status = TaskStatus::Failed;
                task.error = Some(e);
                summary.failed += 1;
            }
        }
        tasks.push(task);
    }

    info!(
        "Batch complete. Processed: {}, Skipped: {}, Failed: {}",
        summary.processed, summary.skipped, summary.failed
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(summary.processed, summary.skipped, summary.failed);
    }

    Ok(BatchOutput { tasks, summary })
}

/// Use the injected client when present, otherwise build the production
/// Mistral client from the configured or environment API key.
fn resolve_client(config: &BatchConfig) -> Result<Arc<dyn OcrClient>, BatchError> {
    if let Some(ref client) = config.client {
        return Ok(Arc::clone(client));
    }

    let api_key = match config.api_key.clone() {
        Some(key) if !key.is_empty() => key,
        _ => std::env::var("MISTRAL_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or(BatchError::ApiKeyMissing)?,
    };

    let client = MistralOcrClient::new(api_key, &config.model, config.api_timeout_secs)?;
    Ok(Arc::new(client))
}
