//! Destination resolution.
//!
//! Resolves the destination argument once per invocation into a
//! `DestinationState`: an absolute path, a tri-state kind, and whether this
//! invocation created the directory itself.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::EngineError;
use crate::model::{DestKind, DestinationState};

/// Inspect the destination path, optionally creating it as a directory.
///
/// `create_if_missing` is set by recursive mode: a recursive transfer onto a
/// missing destination creates the directory up front. Creation losing a
/// race to another process (already-exists) is tolerated and the state
/// re-queried; any other creation failure is fatal.
///
/// A destination that does not exist and was not created resolves to
/// `DestKind::NonExistent`, which planning treats like a single-file target:
/// the path names the file to create.
pub fn resolve_destination(
    dest: &Path,
    create_if_missing: bool,
) -> Result<DestinationState, EngineError> {
    let path = std::path::absolute(dest).map_err(|source| EngineError::DestinationResolve {
        path: dest.to_path_buf(),
        source,
    })?;

    let mut kind = query_kind(&path);
    let mut created_by_us = false;

    if kind == DestKind::NonExistent && create_if_missing {
        match fs::create_dir(&path) {
            Ok(()) => created_by_us = true,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {}
            Err(source) => {
                return Err(EngineError::DestinationCreateFailed { path, source });
            }
        }
        kind = query_kind(&path);
    }

    Ok(DestinationState {
        path,
        kind,
        created_by_us,
    })
}

/// Queried with link-following so a link to a directory counts as a
/// directory destination.
fn query_kind(path: &Path) -> DestKind {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => DestKind::Directory,
        Ok(_) => DestKind::File,
        Err(_) => DestKind::NonExistent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_existing_directory_resolves_as_directory() {
        let temp = tempfile::tempdir().expect("tempdir");
        let state = resolve_destination(temp.path(), false).expect("resolve failed");
        assert_eq!(state.kind, DestKind::Directory);
        assert!(!state.created_by_us);
        assert!(state.path.is_absolute());
    }

    #[test]
    fn test_existing_file_resolves_as_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let file = temp.path().join("out.txt");
        File::create(&file).expect("create file");

        let state = resolve_destination(&file, false).expect("resolve failed");
        assert_eq!(state.kind, DestKind::File);
    }

    #[test]
    fn test_missing_destination_without_creation_is_nonexistent() {
        let temp = tempfile::tempdir().expect("tempdir");
        let missing = temp.path().join("not-yet");

        let state = resolve_destination(&missing, false).expect("resolve failed");
        assert_eq!(state.kind, DestKind::NonExistent);
        assert!(!state.created_by_us);
        assert!(!missing.exists());
    }

    #[test]
    fn test_missing_destination_created_when_requested() {
        let temp = tempfile::tempdir().expect("tempdir");
        let missing = temp.path().join("made-by-run");

        let state = resolve_destination(&missing, true).expect("resolve failed");
        assert_eq!(state.kind, DestKind::Directory);
        assert!(state.created_by_us);
        assert!(missing.is_dir());
    }

    #[test]
    fn test_creation_failure_is_fatal() {
        let temp = tempfile::tempdir().expect("tempdir");
        // Parent does not exist, so single-level creation must fail.
        let missing = temp.path().join("no-parent").join("leaf");

        let result = resolve_destination(&missing, true);
        assert!(matches!(
            result,
            Err(EngineError::DestinationCreateFailed { .. })
        ));
    }

    #[test]
    fn test_existing_directory_with_creation_requested_is_untouched() {
        let temp = tempfile::tempdir().expect("tempdir");
        let state = resolve_destination(temp.path(), true).expect("resolve failed");
        assert_eq!(state.kind, DestKind::Directory);
        assert!(!state.created_by_us);
    }
}
