//! The idempotency gate: should this document be converted at all?
//!
//! The existence of a destination file *is* the "already converted" marker —
//! there is no manifest or database. Combined with the atomic write in
//! [`crate::pipeline::convert`], a destination file either holds a complete
//! conversion or does not exist, so existence is a trustworthy signal.

use std::path::Path;

/// Decide whether a document must be processed.
///
/// Returns `false` only when the destination already exists as a regular
/// file and `force` is not set. Pure function of filesystem state; no side
/// effects.
pub fn should_process(destination: &Path, force: bool) -> bool {
    force || !destination.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_destination_is_processed() {
        let dir = tempfile::tempdir().unwrap();
        assert!(should_process(&dir.path().join("a.md"), false));
    }

    #[test]
    fn existing_destination_is_skipped_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a.md");
        std::fs::write(&dest, "# converted\n").unwrap();

        assert!(!should_process(&dest, false));
        assert!(should_process(&dest, true));
    }

    #[test]
    fn directory_at_destination_does_not_count_as_converted() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a.md");
        std::fs::create_dir(&dest).unwrap();

        assert!(should_process(&dest, false));
    }
}
