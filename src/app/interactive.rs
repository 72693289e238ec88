use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::error::AppResult;

use super::controller::{RunController, RunPlan, StartOutcome, StopOutcome};
use super::summary::print_summary;

/// Menu-driven control surface: one named attack at a time, grown on demand,
/// stopped on demand. No deadline; the run lasts until `stop` or `quit`.
///
/// # Errors
///
/// Returns an error when stdin cannot be read.
pub async fn run_interactive(plan: RunPlan) -> AppResult<()> {
    let mut controller = RunController::new();
    print_menu();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        let (command, argument) = match input.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (input, ""),
        };

        match command {
            "start" => match controller.start(&plan) {
                StartOutcome::Started => {
                    let name = if argument.is_empty() { "attack" } else { argument };
                    info!("interactive attack '{}' started", name);
                    println!("Started '{}' with {} workers.", name, plan.workers);
                }
                StartOutcome::AlreadyRunning => {
                    println!("An attack is already running; nothing to do.");
                }
            },
            "grow" => {
                let count = argument.parse::<usize>().ok().filter(|n| *n > 0).unwrap_or(1);
                let reaped = controller.reap_finished().await;
                if reaped > 0 {
                    info!("reaped {} finished workers", reaped);
                }
                let spawned = controller.grow(count);
                if spawned == 0 {
                    println!("No attack is running; nothing to grow.");
                } else {
                    println!(
                        "Spawned {} workers ({} active).",
                        spawned,
                        controller.active_workers()
                    );
                }
            }
            "status" => {
                let reaped = controller.reap_finished().await;
                if reaped > 0 {
                    info!("reaped {} finished workers", reaped);
                }
                match controller.status() {
                    Some(snapshot) => println!(
                        "Running: {} workers | Sent: {} | Failed: {} | Unique errors: {}",
                        controller.active_workers(),
                        snapshot.total_requests,
                        snapshot.failed_requests,
                        snapshot.unique_errors
                    ),
                    None => println!("Idle."),
                }
            }
            "stop" => match controller.stop().await {
                StopOutcome::Stopped(report) => print_summary(&report),
                StopOutcome::NothingRunning => {
                    println!("No attack is running; nothing to do.");
                }
            },
            "quit" | "exit" => break,
            "help" | "menu" => print_menu(),
            "" => {}
            other => println!("Unknown command '{}'. Type 'help' for the menu.", other),
        }
    }

    // Quitting with a live attack still joins every spawned task.
    if let StopOutcome::Stopped(report) = controller.stop().await {
        print_summary(&report);
    }
    Ok(())
}

fn print_menu() {
    println!("Commands:");
    println!("  start [name]  begin the attack");
    println!("  grow [n]      add n workers to the running attack");
    println!("  status        show live counters");
    println!("  stop          stop the attack and print the summary");
    println!("  quit          exit");
}
