use std::ffi::OsString;
use std::sync::Arc;

use clap::{CommandFactory, FromArgMatches};
use tracing::info;

use crate::app::{self, RunPlan};
use crate::args::LoadArgs;
use crate::error::AppResult;
use crate::http::HttpTransport;

/// Parses the CLI, initializes logging, and drives the selected run mode on a
/// multi-threaded runtime.
///
/// # Errors
///
/// Returns an error when argument parsing, runtime construction, or the run
/// itself fails.
pub fn run() -> AppResult<()> {
    let Some(args) = parse_args()? else {
        return Ok(());
    };

    crate::logger::init_logging(args.verbose);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args))
}

fn parse_args() -> AppResult<Option<LoadArgs>> {
    let raw_args: Vec<OsString> = std::env::args_os().collect();
    if matches!(raw_args.as_slice(), [] | [_]) {
        let mut cmd = LoadArgs::command();
        cmd.print_help()?;
        println!();
        return Ok(None);
    }
    let matches = LoadArgs::command().get_matches_from(raw_args);
    Ok(Some(LoadArgs::from_arg_matches(&matches)?))
}

async fn run_async(args: LoadArgs) -> AppResult<()> {
    // Setup failures abort here, before any worker starts.
    let target = args.target_url()?;
    let payload = args.load_payload()?;
    payload.announce();
    println!("Target: {}", target);
    info!("target resolved to {}", target);

    let transport = HttpTransport::new(target, payload.bytes(), &args.transport_settings())?;
    let plan = RunPlan {
        transport: Arc::new(transport),
        workers: args.worker_count(),
        duration: args.run_duration(),
        status_line: !args.no_status,
    };

    if args.interactive {
        app::run_interactive(plan).await
    } else {
        app::run_batch(plan).await
    }
}
