//! Run orchestration.
//!
//! The entry points for a whole invocation: resolve the destination once,
//! walk every source pattern in order, and plan + execute + record each
//! matched entry. Per-entry failures and policy rejections are recorded and
//! the walk continues; only destination resolution and invalid patterns
//! abort the run.

use tracing::debug;

use crate::dest::resolve_destination;
use crate::error::EngineError;
use crate::model::{
    DestinationState, MatchedEntry, Mode, RunSummary, TransferOutcome, TransferRequest,
    TransferStatus,
};
use crate::report::TransferObserver;
use crate::walk::{self, MatchFlags};
use crate::{plan, transfer};

/// Copy every entry matching the request's source patterns onto its
/// destination.
///
/// Recursive mode returns directories, descends after returning them (so a
/// directory is created at the destination before its children arrive), and
/// creates a missing destination directory up front. A pattern that names a
/// directory outright transfers that directory's contents.
pub fn run_copy(
    request: &TransferRequest,
    observer: Option<&dyn TransferObserver>,
) -> Result<RunSummary, EngineError> {
    let dest = resolve_destination(&request.dest, request.options.recursive)?;

    let mut flags = MatchFlags {
        return_files: true,
        directory_contents: true,
        basic_expansion: request.options.basic_enumeration,
        ..Default::default()
    };
    if request.options.recursive {
        flags.return_directories = true;
        flags.recurse_after_return = true;
        if request.options.copy_links_as_links {
            flags.no_link_traverse = true;
        }
    }

    run_patterns(request, &dest, flags, Mode::Copy, observer)
}

/// Move every entry matching the request's source patterns onto its
/// destination. Non-recursive: a matched directory is renamed whole, links
/// move as opaque entries.
pub fn run_move(
    request: &TransferRequest,
    observer: Option<&dyn TransferObserver>,
) -> Result<RunSummary, EngineError> {
    let dest = resolve_destination(&request.dest, false)?;

    let flags = MatchFlags {
        return_files: true,
        return_directories: true,
        basic_expansion: request.options.basic_enumeration,
        ..Default::default()
    };

    run_patterns(request, &dest, flags, Mode::Move, observer)
}

fn run_patterns(
    request: &TransferRequest,
    dest: &DestinationState,
    flags: MatchFlags,
    mode: Mode,
    observer: Option<&dyn TransferObserver>,
) -> Result<RunSummary, EngineError> {
    let mut summary = RunSummary::new(mode);
    let span = tracing::debug_span!("transfer_run", id = %summary.id, %mode);
    let _guard = span.enter();

    for pattern in &request.sources {
        // The destination subtree is excluded from the walk so a destination
        // created inside the source is never re-enumerated as more source.
        let completed = walk::for_each_match(pattern, flags, Some(dest.path.as_path()), &mut |entry| {
            process_entry(entry, dest, request, mode, observer, &mut summary)
        })?;
        if !completed {
            break;
        }
    }

    debug!(
        attempted = summary.attempted,
        transferred = summary.transferred,
        failed = summary.failed,
        rejected = summary.rejected,
        "run finished"
    );
    if let Some(observer) = observer {
        observer.on_run_completed(&summary);
    }
    Ok(summary)
}

/// Handle one matched entry. Always returns true: per-entry failures never
/// stop enumeration.
fn process_entry(
    entry: &MatchedEntry,
    dest: &DestinationState,
    request: &TransferRequest,
    mode: Mode,
    observer: Option<&dyn TransferObserver>,
    summary: &mut RunSummary,
) -> bool {
    let final_dest = match plan::plan_entry(entry, dest, summary.attempted) {
        Ok(path) => path,
        Err(rejection) => {
            summary.rejected += 1;
            record(
                summary,
                observer,
                TransferOutcome {
                    source: entry.path.clone(),
                    dest: dest.path.clone(),
                    status: TransferStatus::Failed,
                    error_message: Some(rejection.to_string()),
                },
            );
            return true;
        }
    };

    if request.options.verbose {
        if let Some(observer) = observer {
            observer.on_entry_started(&entry.path, &final_dest);
        }
    }

    summary.attempted += 1;
    let result = match mode {
        Mode::Copy => {
            let as_link = plan::copy_as_link(entry, request.options.copy_links_as_links);
            transfer::copy_entry(&entry.path, &final_dest, entry.metadata.is_directory, as_link)
        }
        Mode::Move => {
            let moved = transfer::move_entry(&entry.path, &final_dest);
            if moved.is_ok() {
                if let Err(err) = transfer::reset_inherited_security(&final_dest) {
                    debug!(path = %final_dest.display(), error = %err, "security reset skipped");
                }
            }
            moved
        }
    };

    let outcome = match result {
        Ok(()) => {
            summary.transferred += 1;
            TransferOutcome {
                source: entry.path.clone(),
                dest: final_dest,
                status: TransferStatus::Done,
                error_message: None,
            }
        }
        Err(err) => {
            summary.failed += 1;
            TransferOutcome {
                source: entry.path.clone(),
                dest: final_dest,
                status: TransferStatus::Failed,
                error_message: Some(err.to_string()),
            }
        }
    };
    record(summary, observer, outcome);
    true
}

fn record(
    summary: &mut RunSummary,
    observer: Option<&dyn TransferObserver>,
    outcome: TransferOutcome,
) {
    if let Some(observer) = observer {
        observer.on_entry_completed(&outcome);
    }
    summary.outcomes.push(outcome);
}
