//! # copymv engine - wildcard file transfer library
//!
//! The core library behind the `copymv` command-line tool. It copies and
//! moves files matched by wildcard patterns onto a single destination,
//! handling the parts that need care:
//!
//! - recursive traversal with depth tracking, so a source tree's structure
//!   is reproduced below the destination directory
//! - single-destination validation: many sources never silently collapse
//!   onto one destination file
//! - link-preserving copies that duplicate the link itself, not its target,
//!   with rollback of partial destination state on failure
//! - per-entry error isolation: one failed entry never stops the run
//!
//! ## Basic Usage
//!
//! ```no_run
//! use engine::{run_copy, TransferOptions, TransferRequest};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let request = TransferRequest {
//!     sources: vec!["notes/*.txt".to_string()],
//!     dest: "archive".into(),
//!     options: TransferOptions::default(),
//! };
//!
//! let summary = run_copy(&request, None)?;
//! println!(
//!     "transferred {} of {} entries",
//!     summary.transferred, summary.attempted
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - **model**: data structures (TransferRequest, MatchedEntry, RunSummary)
//! - **error**: fatal, per-entry, and policy error types
//! - **walk**: the wildcard file walker
//! - **dest**: destination resolution
//! - **plan**: per-entry destination planning and policy
//! - **transfer**: per-entry copy and move execution
//! - **runner**: whole-invocation orchestration
//! - **report**: observer trait for progress and diagnostics

pub mod dest;
pub mod error;
pub mod model;
pub mod plan;
pub mod report;
pub mod runner;
pub mod transfer;
pub mod walk;

// Re-export main types and entry points
pub use error::{EngineError, EntryError, PlanRejection};
pub use model::{
    DestKind, DestinationState, EntryMetadata, MatchedEntry, Mode, ReparseTag, RunSummary,
    TransferOptions, TransferOutcome, TransferRequest, TransferStatus,
};
pub use report::TransferObserver;
pub use runner::{run_copy, run_move};
pub use walk::{for_each_match, MatchFlags};
