//! CLI binary for ocr2md.
//!
//! A thin shim over the library crate that maps CLI flags to `BatchConfig`
//! and prints the run summary.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use ocr2md::{batch, BatchConfig, BatchProgressCallback, ProgressCallback};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar across the batch plus a log line per
/// document as it completes, skips, or fails.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    /// The bar length is set by `on_batch_start` once the scan completes.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Scanning");
        bar.set_message("Looking for PDF files…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_documents: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total_documents as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
        self.bar.reset_eta();
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Found {total_documents} PDF files"))
        ));
    }

    fn on_document_skipped(&self, relative: &str) {
        self.bar
            .println(format!("  {} {}  {}", dim("∙"), relative, dim("skipped")));
        self.bar.inc(1);
    }

    fn on_document_start(&self, relative: &str) {
        self.bar.set_message(relative.to_string());
    }

    fn on_document_complete(&self, relative: &str, markdown_path: &str) {
        self.bar.println(format!(
            "  {} {}  {}",
            green("✓"),
            relative,
            dim(&format!("→ {markdown_path}"))
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, relative: &str, error: &str) {
        // Truncate very long error messages to keep output tidy.
        let msg = ellipsize(error, 100);
        self.bar
            .println(format!("  {} {}  {}", red("✗"), relative, red(&msg)));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, processed: usize, skipped: usize, failed: usize) {
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} converted, {} skipped",
                green("✔"),
                bold(&processed.to_string()),
                skipped
            );
        } else {
            eprintln!(
                "{} {} converted, {} skipped, {} failed",
                if processed == 0 { red("✘") } else { cyan("⚠") },
                bold(&processed.to_string()),
                skipped,
                red(&failed.to_string()),
            );
        }
    }
}

/// Cap `s` at `max_bytes`, cutting on a char boundary and appending an
/// ellipsis. API error bodies can carry arbitrary UTF-8 (accented file
/// names, localised messages), so a fixed byte slice is not safe here.
fn ellipsize(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}\u{2026}", &s[..end])
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert everything under pdf/ into markdown/
  ocr2md

  # Preview what would be converted
  ocr2md --dry-run

  # Only specific files or patterns (relative to the source root)
  ocr2md --files "reports/*.pdf" "archive/**/scan-?.pdf"

  # Re-convert even if the markdown already exists
  ocr2md --force --files annual-report.pdf

  # Different roots, more patience with a flaky connection
  ocr2md --source ~/scans --dest ~/notes --max-retries 5 --retry-delay 10

ENVIRONMENT VARIABLES:
  MISTRAL_API_KEY    API key for the Mistral OCR service (required unless --dry-run)

SETUP:
  1. Set the API key:   export MISTRAL_API_KEY=...
  2. Drop PDFs under:   pdf/           (subdirectories are preserved)
  3. Convert:           ocr2md

  Output lands under markdown/ at the mirrored relative path with a .md
  extension. Already-converted files are skipped, so re-running is cheap."#;

/// Batch-convert PDF directory trees to Markdown using the Mistral OCR API.
#[derive(Parser, Debug)]
#[command(
    name = "ocr2md",
    version,
    about = "Batch-convert PDF directory trees to Markdown using the Mistral OCR API",
    long_about = "Walks a directory tree of PDF files, runs each through the hosted Mistral OCR \
model, and writes the extracted text as Markdown files in a mirrored directory structure. \
Skips files already converted; retries transient API failures.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Source directory scanned for PDFs.
    #[arg(long, env = "OCR2MD_SOURCE", default_value = "pdf")]
    source: PathBuf,

    /// Destination directory for mirrored Markdown output.
    #[arg(long, env = "OCR2MD_DEST", default_value = "markdown")]
    dest: PathBuf,

    /// Only show what would be converted, without calling the API.
    #[arg(long)]
    dry_run: bool,

    /// Glob patterns selecting specific files (relative to the source root).
    #[arg(long = "files", num_args = 1.., value_name = "PATTERN")]
    files: Vec<String>,

    /// Convert even when the Markdown file already exists.
    #[arg(long)]
    force: bool,

    /// Total OCR attempts per document on transient API errors.
    #[arg(long, env = "OCR2MD_MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    /// Pause in seconds between consecutive documents.
    #[arg(long, env = "OCR2MD_DELAY", default_value_t = 3.0)]
    delay: f64,

    /// Pause in seconds between retries of the same document.
    #[arg(long, env = "OCR2MD_RETRY_DELAY", default_value_t = 5.0)]
    retry_delay: f64,

    /// OCR model identifier.
    #[arg(long, env = "OCR2MD_MODEL", default_value = "mistral-ocr-latest")]
    model: String,

    /// Per-HTTP-request timeout in seconds.
    #[arg(long, env = "OCR2MD_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// Disable the progress bar.
    #[arg(long, env = "OCR2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "OCR2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "OCR2MD_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active; the
    // bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.dry_run;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new_dynamic() as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };

    let mut builder = BatchConfig::builder()
        .source_root(cli.source)
        .dest_root(cli.dest)
        .patterns(cli.files)
        .force(cli.force)
        .dry_run(cli.dry_run)
        .max_attempts(cli.max_retries)
        .delay_secs(cli.delay)
        .retry_delay_secs(cli.retry_delay)
        .model(cli.model)
        .api_timeout_secs(cli.api_timeout);

    if let Some(cb) = progress_cb {
        builder = builder.progress_callback(cb);
    }

    let config = builder.build().context("Invalid configuration")?;

    // ── Run the batch ────────────────────────────────────────────────────
    let output = batch::run(&config).await.context("Batch run failed")?;

    if cli.dry_run && !cli.quiet {
        eprintln!(
            "Dry run: {} would be converted, {} already up to date",
            output.summary.processed, output.summary.skipped
        );
    }

    if !cli.quiet {
        for task in output.failures() {
            if let Some(ref error) = task.error {
                eprintln!("{} {}", red("failed:"), error);
            }
        }
    }

    // Non-zero exit only when at least one document failed after retries.
    Ok(if output.summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
