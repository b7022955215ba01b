//! Document discovery: walk the source root and yield candidate PDFs.
//!
//! The walk is depth-first with entries sorted by file name, so the yield
//! order is deterministic for a given filesystem state — tests can assert
//! exact sequences and two runs over an unchanged tree visit documents in
//! the same order. Nothing is cached: every [`DocumentScanner::scan`] call
//! re-walks the filesystem, which is what makes a second batch run pick up
//! files added (or converted) since the first.

use crate::error::BatchError;
use crate::output::{document_under, Document};
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Recursively enumerates source documents under a root.
///
/// Without patterns, every file with a `pdf` extension (ASCII
/// case-insensitive) is a candidate. With patterns, a file must *also*
/// match at least one pattern; matching is against the root-relative path
/// string with `glob` semantics (`*`, `?`, `**`).
#[derive(Debug)]
pub struct DocumentScanner {
    root: PathBuf,
    patterns: Option<Vec<Pattern>>,
}

impl DocumentScanner {
    /// Create a scanner, validating the root and compiling the patterns.
    ///
    /// Both failure modes are preflight errors: a missing root or an
    /// uncompilable pattern aborts the batch before any document is touched.
    pub fn new(
        root: impl Into<PathBuf>,
        patterns: Option<&[String]>,
    ) -> Result<Self, BatchError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(BatchError::SourceRootNotFound { path: root });
        }

        let patterns = patterns
            .map(|ps| {
                ps.iter()
                    .map(|p| {
                        Pattern::new(p).map_err(|source| BatchError::InvalidPattern {
                            pattern: p.clone(),
                            source,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        Ok(Self { root, patterns })
    }

    /// The scan root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lazily walk the tree, yielding matching documents in sorted order.
    ///
    /// Restartable: each call starts a fresh walk. Unreadable directory
    /// entries are logged at WARN and skipped rather than failing the scan.
    pub fn scan(&self) -> impl Iterator<Item = Document> + '_ {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(e) => {
                    warn!("Skipping unreadable entry: {e}");
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .filter_map(move |e| {
                let doc = document_under(&self.root, e.path());
                self.accepts(&doc).then_some(doc)
            })
    }

    /// Does this document pass the extension check and the pattern filter?
    fn accepts(&self, doc: &Document) -> bool {
        let is_pdf = doc
            .path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            return false;
        }

        match &self.patterns {
            None => true,
            Some(patterns) => {
                // `*` must not cross directory separators; `**` is the
                // explicit way to match across them.
                let options = MatchOptions {
                    require_literal_separator: true,
                    ..MatchOptions::default()
                };
                patterns
                    .iter()
                    .any(|p| p.matches_path_with(&doc.relative, options))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"%PDF-1.4").unwrap();
    }

    fn relatives(scanner: &DocumentScanner) -> Vec<PathBuf> {
        scanner.scan().map(|d| d.relative).collect()
    }

    #[test]
    fn scans_pdfs_recursively_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.pdf"));
        touch(&dir.path().join("a.pdf"));
        touch(&dir.path().join("sub/c.pdf"));
        touch(&dir.path().join("notes.txt"));

        let scanner = DocumentScanner::new(dir.path(), None).unwrap();
        assert_eq!(
            relatives(&scanner),
            vec![
                PathBuf::from("a.pdf"),
                PathBuf::from("b.pdf"),
                PathBuf::from("sub/c.pdf"),
            ]
        );
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("SCAN.PDF"));

        let scanner = DocumentScanner::new(dir.path(), None).unwrap();
        assert_eq!(relatives(&scanner), vec![PathBuf::from("SCAN.PDF")]);
    }

    #[test]
    fn patterns_filter_by_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.pdf"));
        touch(&dir.path().join("sub/b.pdf"));
        touch(&dir.path().join("sub/deep/c.pdf"));

        let patterns = vec!["sub/*.pdf".to_string()];
        let scanner = DocumentScanner::new(dir.path(), Some(&patterns)).unwrap();
        assert_eq!(relatives(&scanner), vec![PathBuf::from("sub/b.pdf")]);

        let patterns = vec!["**/c.pdf".to_string(), "a.pdf".to_string()];
        let scanner = DocumentScanner::new(dir.path(), Some(&patterns)).unwrap();
        assert_eq!(
            relatives(&scanner),
            vec![PathBuf::from("a.pdf"), PathBuf::from("sub/deep/c.pdf")]
        );
    }

    #[test]
    fn patterns_never_admit_non_pdfs() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.txt"));

        let patterns = vec!["*".to_string()];
        let scanner = DocumentScanner::new(dir.path(), Some(&patterns)).unwrap();
        assert!(relatives(&scanner).is_empty());
    }

    #[test]
    fn scan_is_restartable() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.pdf"));

        let scanner = DocumentScanner::new(dir.path(), None).unwrap();
        assert_eq!(scanner.scan().count(), 1);
        touch(&dir.path().join("b.pdf"));
        // A fresh walk sees the new file; nothing was cached.
        assert_eq!(scanner.scan().count(), 2);
    }

    #[test]
    fn missing_root_is_fatal() {
        let err = DocumentScanner::new("/nonexistent/pdf", None).unwrap_err();
        assert!(matches!(err, BatchError::SourceRootNotFound { .. }));
    }

    #[test]
    fn bad_pattern_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let patterns = vec!["[".to_string()];
        let err = DocumentScanner::new(dir.path(), Some(&patterns)).unwrap_err();
        assert!(matches!(err, BatchError::InvalidPattern { .. }));
    }
}
