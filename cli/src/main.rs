//! copymv - copy and move files matching wildcard patterns.
//!
//! Thin command-line front end for the transfer engine: argument parsing,
//! verbose/diagnostic output, and exit codes. The last path argument is the
//! destination; with a single path argument the destination defaults to the
//! current directory.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use engine::{
    run_copy, run_move, RunSummary, TransferObserver, TransferOptions, TransferOutcome,
    TransferRequest, TransferStatus,
};

#[derive(Parser, Debug)]
#[command(name = "copymv")]
#[command(version)]
#[command(about = "Copy or move files matching wildcard patterns")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Copy one or more files
    Copy {
        /// Use basic search criteria for files only
        #[arg(short = 'b', long = "basic")]
        basic: bool,

        /// Copy links as links rather than contents
        #[arg(short = 'l', long = "links")]
        links: bool,

        /// Copy subdirectories as well as files
        #[arg(short = 's', long = "recursive")]
        recursive: bool,

        /// Verbose output
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,

        /// Source patterns, optionally followed by the destination
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<String>,
    },

    /// Move or rename one or more files
    #[command(name = "move")]
    Move {
        /// Use basic search criteria for files only
        #[arg(short = 'b', long = "basic")]
        basic: bool,

        /// Source patterns, optionally followed by the destination
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<String>,
    },
}

/// Writes verbose lines to stdout and per-entry diagnostics to stderr.
struct ConsoleObserver;

impl TransferObserver for ConsoleObserver {
    fn on_entry_started(&self, source: &Path, dest: &Path) {
        println!("copying {} to {}", source.display(), dest.display());
    }

    fn on_entry_completed(&self, outcome: &TransferOutcome) {
        if outcome.status == TransferStatus::Failed {
            if let Some(ref message) = outcome.error_message {
                eprintln!("{}", message);
            }
        }
    }

    fn on_run_completed(&self, _summary: &RunSummary) {}
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    std::process::exit(run_cli(cli.command));
}

/// Dispatch a parsed subcommand. Separated from `main` for testability.
///
/// Exit codes: 0 when at least one entry transferred, 1 when nothing
/// matched or transferred, 2 on fatal errors.
fn run_cli(command: Command) -> i32 {
    match command {
        Command::Copy {
            basic,
            links,
            recursive,
            verbose,
            paths,
        } => {
            let request = build_request(
                paths,
                TransferOptions {
                    recursive,
                    copy_links_as_links: links,
                    basic_enumeration: basic,
                    verbose,
                },
            );
            report("copy", run_copy(&request, Some(&ConsoleObserver)))
        }
        Command::Move { basic, paths } => {
            let request = build_request(
                paths,
                TransferOptions {
                    basic_enumeration: basic,
                    ..Default::default()
                },
            );
            report("move", run_move(&request, Some(&ConsoleObserver)))
        }
    }
}

/// The last path argument names the destination; a lone argument transfers
/// into the current directory.
fn build_request(mut paths: Vec<String>, options: TransferOptions) -> TransferRequest {
    let dest = match paths.pop() {
        Some(last) if !paths.is_empty() => PathBuf::from(last),
        Some(only) => {
            paths.push(only);
            PathBuf::from(".")
        }
        None => PathBuf::from("."),
    };
    TransferRequest {
        sources: paths,
        dest,
        options,
    }
}

fn report(verb: &str, result: Result<RunSummary, engine::EngineError>) -> i32 {
    match result {
        Ok(summary) => {
            if summary.success() {
                0
            } else {
                eprintln!("{}: no matching files found", verb);
                1
            }
        }
        Err(err) => {
            eprintln!("{}: {}", verb, err);
            2
        }
    }
}
