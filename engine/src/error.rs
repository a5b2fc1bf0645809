//! Error types for the transfer engine.
//!
//! Three distinct families, kept separate so callers can tell them apart:
//! - `EngineError`: fatal, aborts the whole invocation.
//! - `EntryError`: per-entry, reported and the run continues.
//! - `PlanRejection`: policy, the entry is refused without an attempt.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort the whole invocation before or during enumeration.
///
/// Per-entry failures are never represented here; they become
/// `TransferOutcome`s with a `Failed` status instead.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The destination argument could not be resolved to a single path.
    #[error("could not resolve destination {path}: {source}")]
    DestinationResolve { path: PathBuf, source: io::Error },

    /// Recursive mode required the destination directory to exist and
    /// creating it failed for a reason other than already-exists.
    #[error("failed to create destination directory {path}: {source}")]
    DestinationCreateFailed { path: PathBuf, source: io::Error },

    /// A source pattern is not a valid wildcard expression.
    #[error("invalid source pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: globset::Error,
    },
}

/// Errors transferring a single entry. Reported to the caller and the run
/// moves on to the next match.
#[derive(Debug, Error)]
pub enum EntryError {
    /// The source could not be opened or read.
    #[error("open of source failed: {path}: {source}")]
    SourceOpen { path: PathBuf, source: io::Error },

    /// The link data of the source could not be read.
    #[error("reading link data of source failed: {path}: {source}")]
    LinkRead { path: PathBuf, source: io::Error },

    /// The destination could not be created or opened.
    #[error("create of destination failed: {path}: {source}")]
    DestinationCreate { path: PathBuf, source: io::Error },

    /// The link could not be recreated on the destination.
    #[error("recreating link on destination failed: {path}: {source}")]
    LinkWrite { path: PathBuf, source: io::Error },

    /// Whole-file duplication failed.
    #[error("copy failed: {path}: {source}")]
    CopyFailed { path: PathBuf, source: io::Error },

    /// Source and destination are the same file. Refused up front: creating
    /// the destination would truncate the source before it is read.
    #[error("cannot copy a file onto itself: {path}")]
    SameFile { path: PathBuf },

    /// The entry could not be renamed to the destination.
    #[error("move failed: {path}: {source}")]
    RenameFailed { path: PathBuf, source: io::Error },
}

/// Policy decisions that refuse an entry before any filesystem work.
#[derive(Debug, Error)]
pub enum PlanRejection {
    /// A second or later source would land on a single-file destination,
    /// silently destroying whatever the first source put there.
    #[error("attempting to transfer multiple files over a single file ({dest})")]
    MultipleSourcesSingleDestination { dest: PathBuf },
}
