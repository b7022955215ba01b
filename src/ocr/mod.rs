//! The OCR provider boundary.
//!
//! The batch pipeline only ever talks to [`OcrClient`], never to a concrete
//! HTTP client. That keeps transient-vs-permanent classification a visible
//! branch in the retry loop and lets tests inject a scripted double instead
//! of a network service.
//!
//! [`MistralOcrClient`] is the production implementation; see
//! [`mistral`] for the upload → signed-URL → process flow.

pub mod mistral;

pub use mistral::MistralOcrClient;

use crate::output::Document;
use async_trait::async_trait;
use thiserror::Error;

/// A failure reported by an OCR provider, classified by retryability.
///
/// The classification decides control flow in the retry loop:
/// transient errors sleep and retry, permanent errors fail the document
/// immediately without consuming the remaining attempts.
#[derive(Debug, Clone, Error)]
pub enum OcrError {
    /// Expected to resolve on retry: network error, timeout, rate limit,
    /// or a 5xx-equivalent server error.
    #[error("transient OCR API error: {detail}")]
    Transient { detail: String },

    /// Will not resolve on retry: auth failure, invalid document, or any
    /// other 4xx-equivalent rejection.
    #[error("permanent OCR API error: {detail}")]
    Permanent { detail: String },
}

impl OcrError {
    /// True when the retry loop should try again.
    pub fn is_transient(&self) -> bool {
        matches!(self, OcrError::Transient { .. })
    }

    /// Classify an HTTP status code.
    ///
    /// 408 (request timeout), 429 (rate limit) and all 5xx are transient;
    /// every other non-success status is permanent.
    pub fn from_status(status: u16, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        match status {
            408 | 429 => OcrError::Transient { detail },
            500..=599 => OcrError::Transient { detail },
            _ => OcrError::Permanent { detail },
        }
    }

    /// The human-readable detail string.
    pub fn detail(&self) -> &str {
        match self {
            OcrError::Transient { detail } | OcrError::Permanent { detail } => detail,
        }
    }
}

/// An OCR provider: submit a document, get its Markdown back.
///
/// Implementations must be `Send + Sync`; the batch runner holds the client
/// behind an `Arc` for the lifetime of the run. Calls are strictly
/// sequential — implementations never see concurrent `submit`s.
#[async_trait]
pub trait OcrClient: Send + Sync {
    /// Extract the document's text as Markdown.
    async fn submit(&self, document: &Document) -> Result<String, OcrError>;

    /// Cheap connectivity/credential probe, run once before a real batch.
    ///
    /// Defaults to a no-op so test doubles don't have to implement it.
    async fn healthcheck(&self) -> Result<(), OcrError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_is_transient() {
        assert!(OcrError::from_status(429, "too many requests").is_transient());
    }

    #[test]
    fn server_errors_are_transient() {
        for status in [500, 502, 503, 504] {
            assert!(
                OcrError::from_status(status, "boom").is_transient(),
                "status {status} should be transient"
            );
        }
    }

    #[test]
    fn request_timeout_is_transient() {
        assert!(OcrError::from_status(408, "timeout").is_transient());
    }

    #[test]
    fn client_errors_are_permanent() {
        for status in [400, 401, 403, 404, 422] {
            assert!(
                !OcrError::from_status(status, "nope").is_transient(),
                "status {status} should be permanent"
            );
        }
    }

    #[test]
    fn detail_is_preserved() {
        let e = OcrError::from_status(502, "HTTP 502 Bad Gateway");
        assert_eq!(e.detail(), "HTTP 502 Bad Gateway");
        assert!(e.to_string().contains("Bad Gateway"));
    }
}
