//! Transfer reporting trait.
//!
//! Decouples the engine from any particular output surface. The CLI
//! implements this to write verbose and diagnostic lines; tests implement
//! it to record call order. All methods are invoked synchronously from the
//! run loop.

use std::path::Path;

use crate::model::{RunSummary, TransferOutcome};

/// Receives notifications as a run progresses.
pub trait TransferObserver {
    /// An entry is about to be transferred. Only called for verbose runs,
    /// and always before the attempt is made.
    fn on_entry_started(&self, source: &Path, dest: &Path);

    /// An entry reached a terminal state: transferred, rejected, or failed.
    fn on_entry_completed(&self, outcome: &TransferOutcome);

    /// The whole invocation finished; every pattern has been walked.
    fn on_run_completed(&self, summary: &RunSummary);
}
