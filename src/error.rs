//! Error types for the ocr2md library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`BatchError`] — **Fatal**: the batch cannot start at all (missing
//!   credential, invalid source root, bad glob pattern). Returned as
//!   `Err(BatchError)` from [`crate::batch::run`] before any document is
//!   touched.
//!
//! * [`DocumentError`] — **Non-fatal**: a single document failed (retries
//!   exhausted, permanent API rejection, output write error) but the batch
//!   carries on to the next one. Stored inside
//!   [`crate::output::ConversionTask`] so callers can inspect exactly which
//!   documents failed and why.
//!
//! The separation keeps the batch contract explicit: per-document failures
//! accumulate into the run summary; only preflight conditions abort the
//! whole run.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the ocr2md library.
///
/// Per-document failures use [`DocumentError`] and are stored in
/// [`crate::output::ConversionTask`] rather than propagated here.
#[derive(Debug, Error)]
pub enum BatchError {
    /// No API key available and no client was injected.
    #[error(
        "MISTRAL_API_KEY environment variable not set.\n\
         Get an API key from https://console.mistral.ai/ and export it."
    )]
    ApiKeyMissing,

    /// The configured source root does not exist or is not a directory.
    #[error("Source directory not found: '{path}'\nCheck the path exists and is a directory.")]
    SourceRootNotFound { path: PathBuf },

    /// A `--files` glob pattern failed to compile.
    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// Could not create the destination root directory.
    #[error("Failed to create destination directory '{path}': {source}")]
    DestRootCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The pre-run API connectivity check failed.
    #[error("OCR API connection check failed: {detail}\nVerify your API key and network, then retry.")]
    HealthcheckFailed { detail: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A non-fatal error for a single document.
///
/// Stored in [`crate::output::ConversionTask`] when a document ends in
/// [`crate::output::TaskStatus::Failed`]. The batch continues unless a
/// fatal [`BatchError`] occurred before any document was processed.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum DocumentError {
    /// The OCR API rejected the document with a non-retryable error.
    #[error("'{path}': permanent OCR failure: {detail}")]
    Permanent { path: PathBuf, detail: String },

    /// Every attempt hit a transient error.
    #[error("'{path}': OCR failed after {attempts} attempts: {detail}")]
    RetriesExhausted {
        path: PathBuf,
        attempts: u32,
        detail: String,
    },

    /// The OCR call succeeded but the Markdown could not be written.
    ///
    /// Not retried: the text was already extracted, so retrying the OCR
    /// call would spend API quota on a filesystem problem.
    #[error("'{path}': failed to write output: {detail}")]
    WriteFailed { path: PathBuf, detail: String },
}
