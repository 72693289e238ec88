use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use super::controller::{MAX_RUN_DURATION, deadline_for};
use super::summary::summary_lines;
use super::*;
use crate::http::{SendOutcome, Transport};
use crate::metrics::MetricsSnapshot;

struct SteadySuccess {
    latency: Duration,
}

#[async_trait]
impl Transport for SteadySuccess {
    async fn send(&self) -> SendOutcome {
        sleep(self.latency).await;
        SendOutcome::Success
    }
}

fn plan(workers: usize, duration: Option<Duration>) -> RunPlan {
    RunPlan {
        transport: Arc::new(SteadySuccess {
            latency: Duration::from_millis(10),
        }),
        workers,
        duration,
        status_line: false,
    }
}

#[tokio::test(start_paused = true)]
async fn start_while_running_is_rejected_without_disturbing_the_run() {
    let mut controller = RunController::new();
    assert_eq!(controller.start(&plan(2, None)), StartOutcome::Started);
    assert!(controller.is_running());
    assert_eq!(controller.active_workers(), 2);

    assert_eq!(controller.start(&plan(5, None)), StartOutcome::AlreadyRunning);
    assert_eq!(controller.active_workers(), 2);

    drop(controller.stop().await);
    assert!(!controller.is_running());
}

#[tokio::test]
async fn absurd_durations_clamp_instead_of_unbounding_the_run() {
    let at = tokio::time::Instant::now();
    assert_eq!(deadline_for(at, None), None);
    assert_eq!(
        deadline_for(at, Some(Duration::from_secs(5))),
        at.checked_add(Duration::from_secs(5))
    );
    // A duration too large to add to `now` still yields a deadline.
    assert_eq!(
        deadline_for(at, Some(Duration::MAX)),
        at.checked_add(MAX_RUN_DURATION)
    );
}

#[tokio::test]
async fn stop_while_idle_is_a_noop() {
    let mut controller = RunController::new();
    assert!(matches!(controller.stop().await, StopOutcome::NothingRunning));
    assert!(matches!(controller.stop().await, StopOutcome::NothingRunning));
    assert_eq!(controller.status(), None);
}

#[tokio::test(start_paused = true)]
async fn batch_run_stops_at_or_after_the_deadline() -> Result<(), String> {
    let duration = Duration::from_secs(1);
    let mut controller = RunController::new();
    assert_eq!(
        controller.start(&plan(3, Some(duration))),
        StartOutcome::Started
    );
    controller
        .join_workers()
        .await
        .map_err(|err| err.to_string())?;

    let StopOutcome::Stopped(report) = controller.stop().await else {
        return Err("expected a stopped report".to_owned());
    };
    assert!(report.elapsed >= duration);
    assert!(report.snapshot.total_requests > 0);
    assert_eq!(report.snapshot.failed_requests, 0);
    assert!(report.unique_errors.is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn grow_joins_workers_to_the_running_attack() {
    let mut controller = RunController::new();
    assert_eq!(controller.grow(3), 0);

    assert_eq!(controller.start(&plan(2, None)), StartOutcome::Started);
    assert_eq!(controller.grow(3), 3);
    assert_eq!(controller.active_workers(), 5);

    sleep(Duration::from_millis(100)).await;
    let StopOutcome::Stopped(report) = controller.stop().await else {
        return;
    };
    assert!(report.snapshot.total_requests > 0);
    assert_eq!(controller.grow(1), 0);
}

#[tokio::test(start_paused = true)]
async fn finished_workers_are_reaped_from_the_registry() {
    let mut controller = RunController::new();
    assert_eq!(
        controller.start(&plan(4, Some(Duration::from_millis(100)))),
        StartOutcome::Started
    );

    // Well past the deadline every worker has exited on its own.
    sleep(Duration::from_millis(300)).await;
    assert_eq!(controller.reap_finished().await, 4);
    assert_eq!(controller.active_workers(), 0);
    assert!(controller.is_running());

    assert_eq!(controller.reap_finished().await, 0);
    drop(controller.stop().await);
}

#[tokio::test(start_paused = true)]
async fn stop_reports_counters_from_the_shared_metrics() {
    let mut controller = RunController::new();
    assert_eq!(controller.start(&plan(2, None)), StartOutcome::Started);
    sleep(Duration::from_millis(200)).await;

    let status = controller.status();
    let StopOutcome::Stopped(report) = controller.stop().await else {
        return;
    };
    if let Some(snapshot) = status {
        assert!(report.snapshot.total_requests >= snapshot.total_requests);
    }
}

#[test]
fn summary_reports_integer_average_and_bulleted_errors() {
    let report = RunReport {
        snapshot: MetricsSnapshot {
            total_requests: 105,
            failed_requests: 40,
            unique_errors: 2,
        },
        unique_errors: vec!["500 - server error".to_owned(), "timeout".to_owned()],
        elapsed: Duration::from_secs(10),
    };
    let lines = summary_lines(&report);
    assert!(lines.contains(&"Total Requests: 105".to_owned()));
    assert!(lines.contains(&"Failed: 40".to_owned()));
    assert!(lines.contains(&"Average RPS: 10".to_owned()));
    assert!(lines.contains(&"Encountered errors:".to_owned()));
    assert!(lines.contains(&"- 500 - server error".to_owned()));
    assert!(lines.contains(&"- timeout".to_owned()));
}

#[test]
fn summary_omits_the_error_block_on_clean_runs() {
    let report = RunReport {
        snapshot: MetricsSnapshot {
            total_requests: 12,
            failed_requests: 0,
            unique_errors: 0,
        },
        unique_errors: Vec::new(),
        elapsed: Duration::ZERO,
    };
    let lines = summary_lines(&report);
    // Sub-second elapsed clamps the divisor to one second.
    assert!(lines.contains(&"Average RPS: 12".to_owned()));
    assert!(!lines.iter().any(|line| line.starts_with("- ")));
}
