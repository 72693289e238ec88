mod controller;
mod interactive;
mod rss;
mod status;
mod summary;

#[cfg(test)]
mod tests;

pub use controller::{RunController, RunPlan, RunReport, StartOutcome, StopOutcome};
pub use interactive::run_interactive;

use tracing::warn;

use crate::error::AppResult;

use summary::print_summary;

/// Runs one fixed-duration batch: start, wait out the deadline, then stop and
/// print the final summary.
///
/// # Errors
///
/// Returns an error when a worker task cannot be joined.
pub async fn run_batch(plan: RunPlan) -> AppResult<()> {
    let mut controller = RunController::new();
    if controller.start(&plan) == StartOutcome::AlreadyRunning {
        warn!("batch controller refused to start");
        return Ok(());
    }
    controller.join_workers().await?;
    if let StopOutcome::Stopped(report) = controller.stop().await {
        print_summary(&report);
    }
    Ok(())
}
