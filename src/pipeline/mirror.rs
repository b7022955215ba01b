//! Source-to-destination path mapping.
//!
//! The destination tree mirrors the source tree: same relative path, `.md`
//! extension, re-rooted under the destination root. The mapping is a pure
//! function — directories are only created later, at write time — and it is
//! injective for any valid source tree, because two distinct source files
//! cannot share a relative path.

use std::path::{Path, PathBuf};

/// Computes the mirrored destination path for a source document.
#[derive(Debug, Clone)]
pub struct PathMirror {
    source_root: PathBuf,
    dest_root: PathBuf,
}

impl PathMirror {
    pub fn new(source_root: impl Into<PathBuf>, dest_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            dest_root: dest_root.into(),
        }
    }

    /// Destination path for `source_path`: relative path preserved under the
    /// destination root, extension replaced with `md`.
    ///
    /// # Panics
    ///
    /// If `source_path` does not live under the source root. The scanner
    /// only ever produces paths under its root, so a violation here is a
    /// caller bug, not a runtime condition.
    pub fn destination_for(&self, source_path: &Path) -> PathBuf {
        let relative = source_path
            .strip_prefix(&self.source_root)
            .expect("source path must live under the source root");
        self.dest_root.join(relative).with_extension("md")
    }
}
