//! # ocr2md
//!
//! Batch-convert a directory tree of PDF documents to Markdown using the
//! Mistral OCR API.
//!
//! ## Why this crate?
//!
//! Converting a large PDF archive by hand means tracking which files are
//! done, re-running failures, and pacing requests so the API does not
//! rate-limit you. This crate turns that into one idempotent command: it
//! walks a source tree, converts each PDF through the hosted OCR model, and
//! writes the result as a Markdown file at the mirrored path. Files whose
//! Markdown already exists are skipped, so re-running after a partial
//! failure only touches what is missing.
//!
//! ## Pipeline Overview
//!
//! ```text
//! pdf/
//!  │
//!  ├─ 1. Scan     walk the source root (optionally glob-filtered)
//!  ├─ 2. Mirror   compute markdown/<same relative path>.md
//!  ├─ 3. Gate     skip if the destination already exists (unless --force)
//!  ├─ 4. OCR      upload → signed URL → OCR, with bounded retry
//!  └─ 5. Write    atomic temp-file + rename into the mirrored tree
//! ```
//!
//! Documents are processed strictly one at a time with a pause between API
//! calls; sequencing is the rate-limit strategy, not a limitation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ocr2md::{batch, BatchConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key read from MISTRAL_API_KEY
//!     let config = BatchConfig::builder()
//!         .source_root("pdf")
//!         .dest_root("markdown")
//!         .build()?;
//!     let output = batch::run(&config).await?;
//!     eprintln!(
//!         "processed {} / skipped {} / failed {}",
//!         output.summary.processed, output.summary.skipped, output.summary.failed
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ocr2md` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! ocr2md = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod error;
pub mod ocr;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{BatchConfig, BatchConfigBuilder};
pub use error::{BatchError, DocumentError};
pub use ocr::{MistralOcrClient, OcrClient, OcrError};
pub use output::{BatchOutput, BatchSummary, ConversionTask, Document, TaskStatus};
pub use pipeline::convert::RetryPolicy;
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
