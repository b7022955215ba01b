//! Configuration for a batch conversion run.
//!
//! All behaviour is controlled through [`BatchConfig`], built via its
//! [`BatchConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to map CLI flags onto a run, to log the effective settings, and to inject
//! a test double for the OCR client — there is no module-level client or
//! other global state anywhere in the crate.

use crate::error::BatchError;
use crate::ocr::OcrClient;
use crate::pipeline::convert::RetryPolicy;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for a batch PDF-to-Markdown run.
///
/// Built via [`BatchConfig::builder()`] or [`BatchConfig::default()`].
///
/// # Example
/// ```rust
/// use ocr2md::BatchConfig;
///
/// let config = BatchConfig::builder()
///     .source_root("pdf")
///     .dest_root("markdown")
///     .max_attempts(5)
///     .dry_run(true)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct BatchConfig {
    /// Root directory scanned for source PDFs. Default: `pdf`.
    pub source_root: PathBuf,

    /// Root directory for mirrored Markdown output. Default: `markdown`.
    pub dest_root: PathBuf,

    /// Optional glob patterns restricting the run to matching documents.
    ///
    /// Matched against paths relative to `source_root` with `*`, `?`, and
    /// `**` semantics. `None` converts every PDF under the root.
    pub patterns: Option<Vec<String>>,

    /// Convert even when the destination file already exists. Default: false.
    pub force: bool,

    /// Report what would be converted without calling the API or writing
    /// files. Default: false.
    pub dry_run: bool,

    /// Total OCR attempts per document, including the first. Default: 3.
    ///
    /// Only transient failures consume extra attempts; a permanent failure
    /// ends the document on its first occurrence.
    pub max_attempts: u32,

    /// Sleep between a document's consecutive OCR attempts, in seconds.
    /// Default: 5.0.
    pub retry_delay_secs: f64,

    /// Pause between consecutive documents' OCR calls, in seconds.
    /// Default: 3.0.
    ///
    /// This is rate-limit courtesy toward the remote service, deliberately
    /// separate from `retry_delay_secs`: it applies between documents even
    /// when every call succeeds first try.
    pub delay_secs: f64,

    /// OCR model identifier sent to the API. Default: `mistral-ocr-latest`.
    pub model: String,

    /// Per-HTTP-request timeout in seconds. Default: 120.
    ///
    /// Uploads of large PDFs dominate request time; 120 s accommodates a
    /// 50 MB document on a slow uplink without letting a hung connection
    /// stall the batch forever.
    pub api_timeout_secs: u64,

    /// Explicit API key. Falls back to `MISTRAL_API_KEY` when `None`.
    pub api_key: Option<String>,

    /// Pre-constructed OCR client. Takes precedence over `api_key`;
    /// primarily for injecting test doubles.
    pub client: Option<Arc<dyn OcrClient>>,

    /// Optional per-document progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("pdf"),
            dest_root: PathBuf::from("markdown"),
            patterns: None,
            force: false,
            dry_run: false,
            max_attempts: 3,
            retry_delay_secs: 5.0,
            delay_secs: 3.0,
            model: "mistral-ocr-latest".to_string(),
            api_timeout_secs: 120,
            api_key: None,
            client: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchConfig")
            .field("source_root", &self.source_root)
            .field("dest_root", &self.dest_root)
            .field("patterns", &self.patterns)
            .field("force", &self.force)
            .field("dry_run", &self.dry_run)
            .field("max_attempts", &self.max_attempts)
            .field("retry_delay_secs", &self.retry_delay_secs)
            .field("delay_secs", &self.delay_secs)
            .field("model", &self.model)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("client", &self.client.as_ref().map(|_| "<dyn OcrClient>"))
            .finish()
    }
}

impl BatchConfig {
    /// Create a new builder for `BatchConfig`.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder {
            config: Self::default(),
        }
    }

    /// The retry parameters for a single document.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            retry_delay: Duration::from_secs_f64(self.retry_delay_secs.max(0.0)),
        }
    }

    /// The pause inserted between consecutive documents' OCR calls.
    pub fn inter_call_delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay_secs.max(0.0))
    }
}

/// Builder for [`BatchConfig`].
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    pub fn source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.source_root = root.into();
        self
    }

    pub fn dest_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.dest_root = root.into();
        self
    }

    pub fn patterns(mut self, patterns: Vec<String>) -> Self {
        self.config.patterns = if patterns.is_empty() {
            None
        } else {
            Some(patterns)
        };
        self
    }

    pub fn force(mut self, v: bool) -> Self {
        self.config.force = v;
        self
    }

    pub fn dry_run(mut self, v: bool) -> Self {
        self.config.dry_run = v;
        self
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.config.max_attempts = n.max(1);
        self
    }

    pub fn retry_delay_secs(mut self, secs: f64) -> Self {
        self.config.retry_delay_secs = secs.max(0.0);
        self
    }

    pub fn delay_secs(mut self, secs: f64) -> Self {
        self.config.delay_secs = secs.max(0.0);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn client(mut self, client: Arc<dyn OcrClient>) -> Self {
        self.config.client = Some(client);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BatchConfig, BatchError> {
        let c = &self.config;
        if c.max_attempts == 0 {
            return Err(BatchError::InvalidConfig("max_attempts must be ≥ 1".into()));
        }
        if !c.retry_delay_secs.is_finite() || !c.delay_secs.is_finite() {
            return Err(BatchError::InvalidConfig("delays must be finite".into()));
        }
        if c.model.is_empty() {
            return Err(BatchError::InvalidConfig("model must not be empty".into()));
        }
        if c.source_root == c.dest_root {
            return Err(BatchError::InvalidConfig(
                "source and destination roots must differ".into(),
            ));
        }
        Ok(self.config)
    }
}
