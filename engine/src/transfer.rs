//! Per-entry transfer execution.
//!
//! One function call per matched entry, acquiring and releasing everything
//! it needs before returning: open handles, link data, and any partially
//! created destination state, which is rolled back on failure. Errors are
//! per-entry; callers report them and continue with the next match.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::EntryError;

/// Copy one entry to its final destination.
///
/// `as_link` selects link-preserving duplication for recognized link
/// entries; otherwise directories are created (merging into an existing
/// tree is fine) and regular files are duplicated whole, overwriting any
/// existing destination.
pub fn copy_entry(
    src: &Path,
    dst: &Path,
    is_directory: bool,
    as_link: bool,
) -> Result<(), EntryError> {
    if as_link {
        copy_entry_as_link(src, dst, is_directory)
    } else if is_directory {
        copy_entry_dir(dst)
    } else {
        copy_entry_file(src, dst)
    }
}

/// Duplicate a link without following it: read the source link's target,
/// recreate it at the destination, and verify the destination points at
/// byte-identical target data. On any failure the partially created
/// destination is deleted; a half-made link is never left behind.
pub fn copy_entry_as_link(src: &Path, dst: &Path, is_directory: bool) -> Result<(), EntryError> {
    if is_same_file(src, dst) {
        return Err(EntryError::SameFile {
            path: src.to_path_buf(),
        });
    }

    let target = fs::read_link(src).map_err(|source| EntryError::LinkRead {
        path: src.to_path_buf(),
        source,
    })?;

    // Create-always semantics: a stale destination entry is replaced.
    remove_existing(dst).map_err(|source| EntryError::DestinationCreate {
        path: dst.to_path_buf(),
        source,
    })?;

    create_link(&target, dst, is_directory).map_err(|source| EntryError::LinkWrite {
        path: dst.to_path_buf(),
        source,
    })?;

    match fs::read_link(dst) {
        Ok(created) if created == target => Ok(()),
        Ok(_) => {
            let _ = remove_existing(dst);
            Err(EntryError::LinkWrite {
                path: dst.to_path_buf(),
                source: io::Error::new(
                    io::ErrorKind::InvalidData,
                    "destination link does not match source",
                ),
            })
        }
        Err(source) => {
            let _ = remove_existing(dst);
            Err(EntryError::LinkWrite {
                path: dst.to_path_buf(),
                source,
            })
        }
    }
}

/// Create a directory at the destination. Already existing is success, so
/// a recursive copy can merge into a tree a prior run left behind.
pub fn copy_entry_dir(dst: &Path) -> Result<(), EntryError> {
    match fs::create_dir(dst) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(source) => Err(EntryError::DestinationCreate {
            path: dst.to_path_buf(),
            source,
        }),
    }
}

/// Whole-file duplication, overwriting an existing destination. The source
/// modification time is carried over best-effort. A partial destination
/// left by a failed copy is deleted before the error is returned.
pub fn copy_entry_file(src: &Path, dst: &Path) -> Result<(), EntryError> {
    if is_same_file(src, dst) {
        return Err(EntryError::SameFile {
            path: src.to_path_buf(),
        });
    }

    let mut src_file = fs::File::open(src).map_err(|source| EntryError::SourceOpen {
        path: src.to_path_buf(),
        source,
    })?;
    let src_mtime = src_file.metadata().ok().and_then(|m| m.modified().ok());

    let mut dst_file = fs::File::create(dst).map_err(|source| EntryError::DestinationCreate {
        path: dst.to_path_buf(),
        source,
    })?;

    if let Err(source) = io::copy(&mut src_file, &mut dst_file) {
        drop(dst_file);
        let _ = fs::remove_file(dst);
        return Err(EntryError::CopyFailed {
            path: src.to_path_buf(),
            source,
        });
    }
    drop(dst_file);

    if let Some(mtime) = src_mtime {
        let _ = filetime::set_file_mtime(dst, filetime::FileTime::from_system_time(mtime));
    }

    Ok(())
}

/// Move one entry to its final destination.
///
/// Renames in place, replacing an existing destination file. A rename that
/// fails because source and destination sit on different volumes falls
/// back to copy + delete for non-directories; links survive the fallback
/// as recreated links. Directories get no cross-volume fallback.
pub fn move_entry(src: &Path, dst: &Path) -> Result<(), EntryError> {
    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            // Replace-existing semantics on platforms where rename refuses
            // to overwrite.
            remove_existing(dst).map_err(|source| EntryError::RenameFailed {
                path: src.to_path_buf(),
                source,
            })?;
            fs::rename(src, dst).map_err(|source| EntryError::RenameFailed {
                path: src.to_path_buf(),
                source,
            })
        }
        Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
            move_across_volumes(src, dst, err)
        }
        Err(source) => Err(EntryError::RenameFailed {
            path: src.to_path_buf(),
            source,
        }),
    }
}

fn move_across_volumes(src: &Path, dst: &Path, rename_err: io::Error) -> Result<(), EntryError> {
    let meta = fs::symlink_metadata(src).map_err(|source| EntryError::SourceOpen {
        path: src.to_path_buf(),
        source,
    })?;

    if meta.is_dir() {
        return Err(EntryError::RenameFailed {
            path: src.to_path_buf(),
            source: rename_err,
        });
    }

    if meta.file_type().is_symlink() {
        copy_entry_as_link(src, dst, false)?;
    } else {
        copy_entry_file(src, dst)?;
    }

    fs::remove_file(src).map_err(|source| EntryError::RenameFailed {
        path: src.to_path_buf(),
        source,
    })
}

/// Best-effort: clear any protection carried over from the source so the
/// destination picks up its new parent's policy. Callers discard the
/// result (logging at most); this is hygiene, not correctness.
#[cfg(windows)]
pub fn reset_inherited_security(path: &Path) -> io::Result<()> {
    let mut perms = fs::metadata(path)?.permissions();
    if perms.readonly() {
        perms.set_readonly(false);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}

/// Best-effort: clear any protection carried over from the source so the
/// destination picks up its new parent's policy. No such capability exists
/// on this platform, so this is a no-op.
#[cfg(not(windows))]
pub fn reset_inherited_security(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// True when both paths resolve to one existing filesystem object, in any
/// lexical or link-aliased spelling. A destination that does not exist yet
/// cannot be the source.
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn remove_existing(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir(path),
        Ok(_) => fs::remove_file(path),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

#[cfg(unix)]
fn create_link(target: &Path, dst: &Path, _is_directory: bool) -> io::Result<()> {
    std::os::unix::fs::symlink(target, dst)
}

#[cfg(windows)]
fn create_link(target: &Path, dst: &Path, is_directory: bool) -> io::Result<()> {
    if is_directory {
        std::os::windows::fs::symlink_dir(target, dst)
    } else {
        std::os::windows::fs::symlink_file(target, dst)
    }
}
