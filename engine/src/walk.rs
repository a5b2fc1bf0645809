//! File-matching walker.
//!
//! `for_each_match` expands a source pattern and invokes a callback once per
//! matched entry, with metadata and the recursion depth at which the entry
//! was found. Wildcards are honored in the final pattern component; parent
//! components are taken literally.
//!
//! The walk is synchronous and depth-first. Matches of one pattern are never
//! interleaved with another pattern's; children of a recursed directory
//! appear directly after (or before, depending on the order flag) the
//! directory entry itself. Directory listings are name-sorted so traversal
//! order is deterministic.

use std::fs;
use std::path::{Path, PathBuf};

use globset::GlobBuilder;
use tracing::warn;

use crate::error::EngineError;
use crate::model::{EntryMetadata, MatchedEntry, ReparseTag};

/// Flags controlling what `for_each_match` yields and how it recurses.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchFlags {
    /// Yield non-directory entries.
    pub return_files: bool,

    /// Yield directory entries.
    pub return_directories: bool,

    /// When a pattern names a directory outright (no wildcards), enumerate
    /// that directory's contents at depth 0 instead of the directory itself.
    pub directory_contents: bool,

    /// Descend into matched directories, yielding children before their
    /// parent directory entry.
    pub recurse_before_return: bool,

    /// Descend into matched directories, yielding children after their
    /// parent directory entry.
    pub recurse_after_return: bool,

    /// Let wildcard expansion match names starting with a dot.
    pub include_dot_files: bool,

    /// Literal name comparison instead of wildcard expansion.
    pub basic_expansion: bool,

    /// Never descend through links to directories while recursing.
    pub no_link_traverse: bool,
}

/// Expand `pattern` and invoke `callback` once per matched entry.
///
/// Entries at or below `exclude` are never yielded or descended into. A
/// transfer's own destination is passed here so a destination created
/// inside the source tree is not re-enumerated as more source.
///
/// Returns `Ok(true)` when enumeration ran to completion, `Ok(false)` when
/// the callback asked to stop by returning `false`. A pattern matching
/// nothing is not an error; the callback is simply never invoked.
/// Unreadable directories encountered mid-walk are logged and skipped.
pub fn for_each_match(
    pattern: &str,
    flags: MatchFlags,
    exclude: Option<&Path>,
    callback: &mut dyn FnMut(&MatchedEntry) -> bool,
) -> Result<bool, EngineError> {
    for root in expand_pattern(pattern, flags)? {
        if excluded(&root, exclude) {
            continue;
        }
        if flags.directory_contents && is_traversable_dir(&root, flags) {
            if !visit_children(&root, 0, flags, exclude, callback) {
                return Ok(false);
            }
        } else if !visit(&root, 0, flags, exclude, callback) {
            return Ok(false);
        }
    }
    Ok(true)
}

fn excluded(path: &Path, exclude: Option<&Path>) -> bool {
    exclude.is_some_and(|root| path.starts_with(root))
}

/// Resolve the pattern to its depth-0 match roots, as absolute paths.
fn expand_pattern(pattern: &str, flags: MatchFlags) -> Result<Vec<PathBuf>, EngineError> {
    let path = Path::new(pattern);
    let leaf = path.file_name().and_then(|n| n.to_str());

    let leaf = match leaf {
        Some(leaf) if !flags.basic_expansion && has_wildcards(leaf) => leaf,
        // No wildcard component (or basic mode): the pattern is a literal
        // path that either exists or matches nothing.
        _ => return Ok(existing_path(path)),
    };

    let matcher = GlobBuilder::new(leaf)
        .literal_separator(true)
        .build()
        .map_err(|source| EngineError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?
        .compile_matcher();

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let entries = match fs::read_dir(&parent) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(path = %parent.display(), error = %err, "cannot enumerate pattern parent");
            return Ok(Vec::new());
        }
    };

    let mut matches = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.starts_with('.') && !flags.include_dot_files && !leaf.starts_with('.') {
            continue;
        }
        if matcher.is_match(name) {
            matches.push(absolute(&entry.path()));
        }
    }
    matches.sort();
    Ok(matches)
}

/// A literal path: one match if something is there (links included), none
/// otherwise.
fn existing_path(path: &Path) -> Vec<PathBuf> {
    if fs::symlink_metadata(path).is_ok() {
        vec![absolute(path)]
    } else {
        Vec::new()
    }
}

fn has_wildcards(component: &str) -> bool {
    component.contains(['*', '?', '['])
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Visit one entry, recursing according to the flags. Returns false when
/// the callback asked to stop.
fn visit(
    path: &Path,
    depth: usize,
    flags: MatchFlags,
    exclude: Option<&Path>,
    callback: &mut dyn FnMut(&MatchedEntry) -> bool,
) -> bool {
    if excluded(path, exclude) {
        return true;
    }

    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "skipping unreadable entry");
            return true;
        }
    };

    let is_link = meta.file_type().is_symlink();
    let is_dir = meta.is_dir() || (is_link && !flags.no_link_traverse && resolves_to_dir(path));

    let entry = MatchedEntry {
        path: path.to_path_buf(),
        metadata: EntryMetadata {
            is_directory: is_dir,
            is_reparse_point: is_link,
            reparse_tag: if is_link {
                ReparseTag::Symlink
            } else {
                ReparseTag::Other
            },
            size: if is_dir { 0 } else { meta.len() },
        },
        depth,
    };

    let descend = is_dir
        && (flags.recurse_before_return || flags.recurse_after_return)
        && !(flags.no_link_traverse && is_link);

    if flags.recurse_before_return
        && descend
        && !visit_children(path, depth + 1, flags, exclude, callback)
    {
        return false;
    }

    let wanted = if is_dir {
        flags.return_directories
    } else {
        flags.return_files
    };
    if wanted && !callback(&entry) {
        return false;
    }

    if flags.recurse_after_return
        && descend
        && !visit_children(path, depth + 1, flags, exclude, callback)
    {
        return false;
    }

    true
}

/// Visit every child of `dir` at the given depth, in name order.
fn visit_children(
    dir: &Path,
    depth: usize,
    flags: MatchFlags,
    exclude: Option<&Path>,
    callback: &mut dyn FnMut(&MatchedEntry) -> bool,
) -> bool {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(path = %dir.display(), error = %err, "skipping unreadable directory");
            return true;
        }
    };

    let mut children: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
    children.sort();

    for child in children {
        if !visit(&child, depth, flags, exclude, callback) {
            return false;
        }
    }
    true
}

fn is_traversable_dir(path: &Path, flags: MatchFlags) -> bool {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => true,
        Ok(meta) if meta.file_type().is_symlink() && !flags.no_link_traverse => {
            resolves_to_dir(path)
        }
        _ => false,
    }
}

fn resolves_to_dir(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}
