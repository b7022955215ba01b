//! Pipeline stages for batch PDF-to-Markdown conversion.
//!
//! Each submodule implements exactly one decision or transformation.
//! Keeping stages separate makes each independently testable and keeps the
//! batch runner a plain driver loop with no policy of its own.
//!
//! ## Data Flow
//!
//! ```text
//! scan ──▶ mirror ──▶ gate ──▶ convert
//! (walk)   (dest path) (skip?)  (OCR + retry + atomic write)
//! ```
//!
//! 1. [`scan`]    — enumerate candidate PDFs under the source root,
//!    optionally filtered by glob patterns
//! 2. [`mirror`]  — compute the mirrored `.md` destination path
//! 3. [`gate`]    — skip documents whose destination already exists
//! 4. [`convert`] — drive the OCR call with bounded retry; the only stage
//!    with network I/O

pub mod convert;
pub mod gate;
pub mod mirror;
pub mod scan;
