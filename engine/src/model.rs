//! Core data model for transfer invocations.
//!
//! This module defines the main data structures for a copy or move run:
//! - TransferRequest / TransferOptions: what the caller asked for
//! - DestinationState: the resolved destination and its kind
//! - MatchedEntry: one entry produced by the file walker
//! - TransferOutcome / RunSummary: per-entry results and run totals

use std::path::PathBuf;
use uuid::Uuid;

/// Option flags for a transfer invocation. Immutable once built.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransferOptions {
    /// Descend into subdirectories, reproducing their structure at the
    /// destination. Also allows creating a missing destination directory.
    pub recursive: bool,

    /// Copy links as links rather than copying their contents (copy only).
    pub copy_links_as_links: bool,

    /// Use literal name comparison instead of wildcard expansion.
    pub basic_enumeration: bool,

    /// Announce every attempted transfer before it happens (copy only).
    pub verbose: bool,
}

/// A single transfer invocation: one or more source patterns mapped onto
/// one destination path.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    /// Source patterns in the order the caller supplied them. The final
    /// path component may contain wildcards.
    pub sources: Vec<String>,

    /// Destination path. May name an existing file, an existing directory,
    /// or a path that does not exist yet.
    pub dest: PathBuf,

    /// Option flags for this invocation.
    pub options: TransferOptions,
}

/// What the destination path refers to, queried once before any transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestKind {
    /// Nothing exists at the destination path. Planned like a single-file
    /// target: the path names the file to create.
    NonExistent,
    /// The destination is an existing non-directory.
    File,
    /// The destination is an existing directory; entries land inside it.
    Directory,
}

/// The resolved destination for a whole invocation.
#[derive(Debug, Clone)]
pub struct DestinationState {
    /// Absolute destination path.
    pub path: PathBuf,

    /// Tri-state kind of the destination.
    pub kind: DestKind,

    /// True if this invocation created the destination directory itself
    /// (recursive mode with a previously missing destination).
    pub created_by_us: bool,
}

/// Classification of a reparse point (link) entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReparseTag {
    /// A symbolic link.
    Symlink,
    /// A mount point / junction. Only produced on platforms that have one.
    MountPoint,
    /// Any other tag; treated as a regular file or directory.
    Other,
}

/// Filesystem facts about a matched entry, captured without following links.
#[derive(Debug, Clone, Copy)]
pub struct EntryMetadata {
    /// True for directories, including links that resolve to directories
    /// when the walker is allowed to traverse them.
    pub is_directory: bool,

    /// True if the entry is itself a link.
    pub is_reparse_point: bool,

    /// Link classification; `Other` for non-links.
    pub reparse_tag: ReparseTag,

    /// Size in bytes (0 for directories).
    pub size: u64,
}

/// One entry produced by the file walker. Valid only for the duration of
/// the callback invocation that receives it; paths needed later must be
/// cloned out.
#[derive(Debug, Clone)]
pub struct MatchedEntry {
    /// Absolute source path.
    pub path: PathBuf,

    /// Metadata captured at enumeration time.
    pub metadata: EntryMetadata,

    /// Recursion depth: 0 for entries matched directly by the pattern,
    /// greater for entries discovered by descending below a match.
    pub depth: usize,
}

/// The operation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Copy entries; sources remain in place.
    Copy,
    /// Move entries; sources are renamed away.
    Move,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Copy => write!(f, "copy"),
            Mode::Move => write!(f, "move"),
        }
    }
}

/// Terminal state of one entry's transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    /// Transferred successfully.
    Done,
    /// Not transferred due to policy; no attempt was made.
    Skipped,
    /// Attempted and failed, or rejected; see the outcome message.
    Failed,
}

/// Per-entry result recorded for the run summary.
#[derive(Debug, Clone)]
pub struct TransferOutcome {
    /// Absolute source path of the entry.
    pub source: PathBuf,

    /// Final destination path the entry was (or would have been) sent to.
    pub dest: PathBuf,

    /// Terminal state for this entry.
    pub status: TransferStatus,

    /// Diagnostic for failed entries, with the OS error text appended.
    pub error_message: Option<String>,
}

/// Aggregate result of one copy or move invocation.
///
/// The invocation as a whole succeeds when at least one entry transferred;
/// per-entry failures and policy rejections do not fail the run on their
/// own.
#[derive(Debug)]
pub struct RunSummary {
    /// Unique identifier for this run.
    pub id: Uuid,

    /// The operation that produced this summary.
    pub mode: Mode,

    /// Entries for which a transfer was attempted (whether it succeeded
    /// or not). Policy rejections are not attempts.
    pub attempted: u64,

    /// Entries transferred successfully.
    pub transferred: u64,

    /// Entries attempted but failed.
    pub failed: u64,

    /// Entries rejected without an attempt (a second or later source over
    /// a single-file destination).
    pub rejected: u64,

    /// Per-entry outcomes in encounter order.
    pub outcomes: Vec<TransferOutcome>,
}

impl RunSummary {
    /// Create an empty summary for a new run.
    pub fn new(mode: Mode) -> Self {
        RunSummary {
            id: Uuid::new_v4(),
            mode,
            attempted: 0,
            transferred: 0,
            failed: 0,
            rejected: 0,
            outcomes: Vec::new(),
        }
    }

    /// True when at least one entry transferred.
    pub fn success(&self) -> bool {
        self.transferred > 0
    }
}
