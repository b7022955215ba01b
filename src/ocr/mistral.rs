//! Mistral OCR API client.
//!
//! The hosted OCR endpoint cannot ingest raw bytes directly, so a
//! conversion is a three-step flow:
//!
//! 1. `POST /v1/files` — multipart upload of the PDF with `purpose=ocr`
//! 2. `GET /v1/files/{id}/url` — obtain a short-lived signed URL
//! 3. `POST /v1/ocr` — run the OCR model against the signed URL
//!
//! Each step maps HTTP failures onto [`OcrError`] so the retry loop sees a
//! plain transient/permanent classification rather than reqwest internals.
//! Connection and timeout errors are transient; non-success statuses are
//! classified by [`OcrError::from_status`].

use crate::error::BatchError;
use crate::ocr::{OcrClient, OcrError};
use crate::output::Document;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default API endpoint; override with [`MistralOcrClient::with_base_url`]
/// for test servers.
const DEFAULT_BASE_URL: &str = "https://api.mistral.ai";

/// Production [`OcrClient`] backed by the Mistral OCR API.
pub struct MistralOcrClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl MistralOcrClient {
    /// Create a client with a per-request timeout.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, BatchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| BatchError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Point the client at a different endpoint (local mock, proxy).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Step 1: upload the PDF, returning the server-side file id.
    async fn upload(&self, document: &Document) -> Result<String, OcrError> {
        // A missing or unreadable source file will not fix itself on retry.
        let bytes = tokio::fs::read(&document.path)
            .await
            .map_err(|e| OcrError::Permanent {
                detail: format!("cannot read '{}': {e}", document.path.display()),
            })?;

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(document.file_name().to_string())
            .mime_str("application/pdf")
            .map_err(|e| OcrError::Permanent {
                detail: format!("multipart: {e}"),
            })?;
        let form = reqwest::multipart::Form::new()
            .text("purpose", "ocr")
            .part("file", part);

        let response = self
            .http
            .post(format!("{}/v1/files", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;

        let upload: FileUploadResponse = decode(response).await?;
        debug!("Uploaded {} as file {}", document.file_name(), upload.id);
        Ok(upload.id)
    }

    /// Step 2: exchange the file id for a signed download URL.
    async fn signed_url(&self, file_id: &str) -> Result<String, OcrError> {
        let response = self
            .http
            .get(format!("{}/v1/files/{file_id}/url", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(transport_error)?;

        let signed: SignedUrlResponse = decode(response).await?;
        Ok(signed.url)
    }

    /// Step 3: run OCR against the signed URL and assemble the pages.
    async fn process(&self, document_url: &str) -> Result<String, OcrError> {
        let request = OcrRequest {
            model: &self.model,
            document: OcrDocument {
                kind: "document_url",
                document_url,
            },
        };

        let response = self
            .http
            .post(format!("{}/v1/ocr", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let ocr: OcrResponse = decode(response).await?;
        Ok(assemble_pages(&ocr.pages))
    }
}

#[async_trait]
impl OcrClient for MistralOcrClient {
    async fn submit(&self, document: &Document) -> Result<String, OcrError> {
        let file_id = self.upload(document).await?;
        let url = self.signed_url(&file_id).await?;
        self.process(&url).await
    }

    /// Listing models is the cheapest authenticated call the API offers.
    async fn healthcheck(&self) -> Result<(), OcrError> {
        let response = self
            .http
            .get(format!("{}/v1/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(OcrError::from_status(
                status.as_u16(),
                format!("HTTP {status}"),
            ))
        }
    }
}

/// Map a reqwest transport error (no HTTP status available) to [`OcrError`].
///
/// Timeouts and connection failures are network blips; anything else at this
/// layer (invalid request construction, redirect loops) won't improve on
/// retry.
fn transport_error(e: reqwest::Error) -> OcrError {
    if e.is_timeout() || e.is_connect() {
        OcrError::Transient {
            detail: e.to_string(),
        }
    } else {
        OcrError::Permanent {
            detail: e.to_string(),
        }
    }
}

/// Check the status and decode the JSON body of an API response.
async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, OcrError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let detail = if body.is_empty() {
            format!("HTTP {status}")
        } else {
            format!("HTTP {status}: {body}")
        };
        return Err(OcrError::from_status(status.as_u16(), detail));
    }

    response.json::<T>().await.map_err(|e| OcrError::Permanent {
        detail: format!("malformed API response: {e}"),
    })
}

/// Join per-page Markdown under `## Page N` headings.
fn assemble_pages(pages: &[OcrPage]) -> String {
    let mut markdown = String::new();
    for page in pages {
        markdown.push_str(&format!("## Page {}\n\n", page.index));
        markdown.push_str(&page.markdown);
        markdown.push_str("\n\n");
    }
    markdown
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct FileUploadResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SignedUrlResponse {
    url: String,
}

#[derive(Debug, Serialize)]
struct OcrRequest<'a> {
    model: &'a str,
    document: OcrDocument<'a>,
}

#[derive(Debug, Serialize)]
struct OcrDocument<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    document_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct OcrResponse {
    pages: Vec<OcrPage>,
}

#[derive(Debug, Deserialize)]
struct OcrPage {
    index: usize,
    markdown: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assemble_pages_headings_and_order() {
        let pages = vec![
            OcrPage {
                index: 0,
                markdown: "First page.".into(),
            },
            OcrPage {
                index: 1,
                markdown: "Second page.".into(),
            },
        ];
        let md = assemble_pages(&pages);
        assert!(md.starts_with("## Page 0\n\nFirst page.\n\n"));
        assert!(md.contains("## Page 1\n\nSecond page.\n\n"));
    }

    #[test]
    fn assemble_pages_empty() {
        assert_eq!(assemble_pages(&[]), "");
    }

    #[test]
    fn ocr_request_wire_shape() {
        let request = OcrRequest {
            model: "mistral-ocr-latest",
            document: OcrDocument {
                kind: "document_url",
                document_url: "https://signed.example/doc",
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "mistral-ocr-latest");
        assert_eq!(json["document"]["type"], "document_url");
        assert_eq!(json["document"]["document_url"], "https://signed.example/doc");
    }

    #[test]
    fn ocr_response_parses() {
        let body = r##"{"pages":[{"index":0,"markdown":"# Title"}]}"##;
        let parsed: OcrResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.pages.len(), 1);
        assert_eq!(parsed.pages[0].markdown, "# Title");
    }
}
