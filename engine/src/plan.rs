//! Transfer planning.
//!
//! For each matched entry, computes the final destination path and decides
//! whether the transfer is allowed at all. Planning touches no filesystem
//! state; it works purely from the entry, the resolved destination, and the
//! count of entries processed so far.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use crate::error::PlanRejection;
use crate::model::{DestKind, DestinationState, MatchedEntry, ReparseTag};

/// Compute the final destination path for one matched entry.
///
/// Directory destinations receive the entry under a path that mirrors how
/// deep the walker found it: the last `depth + 1` components of the source
/// path are joined onto the destination, so an entry discovered two levels
/// below its match lands two levels below the destination directory. The
/// joined path is lexically normalized before use.
///
/// File (or not-yet-existing) destinations are used as-is, but only for the
/// first entry: every later entry is rejected rather than silently
/// overwriting what the first one produced. The rejection is per-entry; it
/// does not abort the run or roll back earlier transfers.
pub fn plan_entry(
    entry: &MatchedEntry,
    dest: &DestinationState,
    attempted_so_far: u64,
) -> Result<PathBuf, PlanRejection> {
    match dest.kind {
        DestKind::Directory => {
            let tail = relative_tail(&entry.path, entry.depth);
            Ok(normalize(&dest.path.join(tail)))
        }
        DestKind::File | DestKind::NonExistent => {
            if attempted_so_far > 0 {
                Err(PlanRejection::MultipleSourcesSingleDestination {
                    dest: dest.path.clone(),
                })
            } else {
                Ok(dest.path.clone())
            }
        }
    }
}

/// Whether this entry should be transferred by recreating its link rather
/// than duplicating the data it points at. Only recognized link tags
/// qualify; anything else is handled as a regular file or directory.
pub fn copy_as_link(entry: &MatchedEntry, copy_links_as_links: bool) -> bool {
    copy_links_as_links
        && entry.metadata.is_reparse_point
        && matches!(
            entry.metadata.reparse_tag,
            ReparseTag::Symlink | ReparseTag::MountPoint
        )
}

/// The last `depth + 1` normal components of `path`: the entry's own name
/// plus one parent component per level of recursion that found it.
fn relative_tail(path: &Path, depth: usize) -> PathBuf {
    let components: Vec<&OsStr> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name),
            _ => None,
        })
        .collect();
    let keep = (depth + 1).min(components.len());
    components[components.len() - keep..].iter().collect()
}

/// Lexical normalization: strips `.` segments and resolves `..` against the
/// components already seen, without consulting the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntryMetadata;

    fn entry(path: &str, depth: usize, is_dir: bool) -> MatchedEntry {
        MatchedEntry {
            path: PathBuf::from(path),
            metadata: EntryMetadata {
                is_directory: is_dir,
                is_reparse_point: false,
                reparse_tag: ReparseTag::Other,
                size: 0,
            },
            depth,
        }
    }

    fn link_entry(path: &str) -> MatchedEntry {
        MatchedEntry {
            path: PathBuf::from(path),
            metadata: EntryMetadata {
                is_directory: false,
                is_reparse_point: true,
                reparse_tag: ReparseTag::Symlink,
                size: 0,
            },
            depth: 0,
        }
    }

    fn dir_dest(path: &str) -> DestinationState {
        DestinationState {
            path: PathBuf::from(path),
            kind: DestKind::Directory,
            created_by_us: false,
        }
    }

    fn file_dest(path: &str) -> DestinationState {
        DestinationState {
            path: PathBuf::from(path),
            kind: DestKind::File,
            created_by_us: false,
        }
    }

    #[test]
    fn test_depth_zero_into_directory_appends_file_name() {
        let planned = plan_entry(&entry("/src/notes.txt", 0, false), &dir_dest("/dest"), 0)
            .expect("plan rejected");
        assert_eq!(planned, PathBuf::from("/dest/notes.txt"));
    }

    #[test]
    fn test_deeper_entries_keep_their_relative_subtree() {
        // Found two levels below its match: lands two levels below dest.
        let planned = plan_entry(&entry("/top/a/b/c.txt", 2, false), &dir_dest("/dest"), 5)
            .expect("plan rejected");
        assert_eq!(planned, PathBuf::from("/dest/a/b/c.txt"));
    }

    #[test]
    fn test_depth_zero_under_multi_segment_pattern_takes_name_only() {
        // A pattern like sub/* matches entries at depth 0; only the entry's
        // own name is carried over, not the pattern's parent segments.
        let planned = plan_entry(&entry("/base/sub/item.txt", 0, false), &dir_dest("/dest"), 0)
            .expect("plan rejected");
        assert_eq!(planned, PathBuf::from("/dest/item.txt"));
    }

    #[test]
    fn test_joined_path_is_normalized() {
        let dest = dir_dest("/dest/./stage/../out");
        let planned = plan_entry(&entry("/src/x.txt", 0, false), &dest, 0).expect("plan rejected");
        assert_eq!(planned, PathBuf::from("/dest/out/x.txt"));
    }

    #[test]
    fn test_file_destination_allows_only_first_entry() {
        let dest = file_dest("/dest/out.txt");

        let first = plan_entry(&entry("/src/a.txt", 0, false), &dest, 0);
        assert_eq!(first.expect("plan rejected"), PathBuf::from("/dest/out.txt"));

        let second = plan_entry(&entry("/src/b.txt", 0, false), &dest, 1);
        assert!(matches!(
            second,
            Err(PlanRejection::MultipleSourcesSingleDestination { .. })
        ));
    }

    #[test]
    fn test_nonexistent_destination_behaves_like_file() {
        let dest = DestinationState {
            path: PathBuf::from("/dest/new-name"),
            kind: DestKind::NonExistent,
            created_by_us: false,
        };

        let planned =
            plan_entry(&entry("/src/a.txt", 0, false), &dest, 0).expect("plan rejected");
        assert_eq!(planned, PathBuf::from("/dest/new-name"));

        assert!(plan_entry(&entry("/src/b.txt", 0, false), &dest, 1).is_err());
    }

    #[test]
    fn test_copy_as_link_requires_flag_and_recognized_tag() {
        let link = link_entry("/src/alias");
        assert!(copy_as_link(&link, true));
        assert!(!copy_as_link(&link, false));

        let plain = entry("/src/file.txt", 0, false);
        assert!(!copy_as_link(&plain, true));

        let mut odd_tag = link_entry("/src/odd");
        odd_tag.metadata.reparse_tag = ReparseTag::Other;
        assert!(!copy_as_link(&odd_tag, true));
    }

    #[test]
    fn test_relative_tail_saturates_on_short_paths() {
        // Depth larger than the path has components: take what exists
        // rather than panicking.
        assert_eq!(relative_tail(Path::new("/x.txt"), 5), PathBuf::from("x.txt"));
    }

    #[test]
    fn test_relative_tail_ignores_trailing_separator() {
        assert_eq!(
            relative_tail(Path::new("/src/dir/"), 0),
            PathBuf::from("dir")
        );
    }
}
