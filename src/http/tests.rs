use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{Instant, sleep, timeout};

use super::*;
use crate::metrics::RunMetrics;
use crate::shutdown;

/// Transport that always answers the same outcome after a fixed latency.
struct ScriptedTransport {
    outcome: SendOutcome,
    latency: Duration,
}

impl ScriptedTransport {
    fn new(outcome: SendOutcome, latency: Duration) -> Arc<Self> {
        Arc::new(Self { outcome, latency })
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self) -> SendOutcome {
        sleep(self.latency).await;
        self.outcome.clone()
    }
}

#[tokio::test(start_paused = true)]
async fn successes_are_recorded_until_deadline() {
    let transport = ScriptedTransport::new(SendOutcome::Success, Duration::from_millis(10));
    let metrics = Arc::new(RunMetrics::new());
    let shutdown_tx = shutdown::channel();
    let deadline = Instant::now().checked_add(Duration::from_secs(1));

    run_sender(
        transport,
        Arc::clone(&metrics),
        shutdown_tx.subscribe(),
        deadline,
    )
    .await;

    let snapshot = metrics.snapshot();
    assert!(snapshot.total_requests >= 90);
    assert_eq!(snapshot.failed_requests, 0);
    assert_eq!(snapshot.unique_errors, 0);
}

#[tokio::test(start_paused = true)]
async fn rejected_responses_skip_backoff() {
    let transport = ScriptedTransport::new(
        SendOutcome::Rejected {
            label: "500 - server error".to_owned(),
        },
        Duration::from_millis(50),
    );
    let metrics = Arc::new(RunMetrics::new());
    let shutdown_tx = shutdown::channel();
    let deadline = Instant::now().checked_add(Duration::from_secs(1));

    run_sender(
        transport,
        Arc::clone(&metrics),
        shutdown_tx.subscribe(),
        deadline,
    )
    .await;

    // 50ms per iteration and no backoff: roughly 20 requests in one second.
    let snapshot = metrics.snapshot();
    assert!((18..=21).contains(&snapshot.total_requests));
    assert_eq!(snapshot.failed_requests, snapshot.total_requests);
    assert_eq!(metrics.unique_error_labels(), vec!["500 - server error"]);
}

#[tokio::test(start_paused = true)]
async fn faults_back_off_between_attempts() {
    let transport = ScriptedTransport::new(
        SendOutcome::Fault {
            label: "connection refused".to_owned(),
        },
        Duration::ZERO,
    );
    let metrics = Arc::new(RunMetrics::new());
    let shutdown_tx = shutdown::channel();
    let deadline = Instant::now().checked_add(Duration::from_secs(1));

    run_sender(
        transport,
        Arc::clone(&metrics),
        shutdown_tx.subscribe(),
        deadline,
    )
    .await;

    // Each attempt costs one FAULT_BACKOFF, bounding the volume near
    // duration / backoff.
    let snapshot = metrics.snapshot();
    assert!((9..=12).contains(&snapshot.total_requests));
    assert_eq!(snapshot.failed_requests, snapshot.total_requests);
    assert_eq!(snapshot.unique_errors, 1);
}

#[tokio::test(start_paused = true)]
async fn shutdown_interrupts_an_unbounded_run() -> Result<(), String> {
    let transport = ScriptedTransport::new(SendOutcome::Success, Duration::from_secs(60));
    let metrics = Arc::new(RunMetrics::new());
    let shutdown_tx = shutdown::channel();

    let handle = tokio::spawn(run_sender(
        transport,
        Arc::clone(&metrics),
        shutdown_tx.subscribe(),
        None,
    ));

    sleep(Duration::from_millis(50)).await;
    drop(shutdown_tx.send(()));

    timeout(Duration::from_secs(1), handle)
        .await
        .map_err(|_| "worker did not observe shutdown".to_owned())?
        .map_err(|err| err.to_string())?;
    assert_eq!(metrics.snapshot().total_requests, 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn shutdown_interrupts_the_fault_backoff() -> Result<(), String> {
    let transport = ScriptedTransport::new(
        SendOutcome::Fault {
            label: "timeout".to_owned(),
        },
        Duration::ZERO,
    );
    let metrics = Arc::new(RunMetrics::new());
    let shutdown_tx = shutdown::channel();

    let handle = tokio::spawn(run_sender(
        transport,
        Arc::clone(&metrics),
        shutdown_tx.subscribe(),
        None,
    ));

    sleep(Duration::from_millis(10)).await;
    drop(shutdown_tx.send(()));

    timeout(Duration::from_millis(200), handle)
        .await
        .map_err(|_| "worker stuck in backoff past shutdown".to_owned())?
        .map_err(|err| err.to_string())?;
    assert!(metrics.snapshot().failed_requests >= 1);
    Ok(())
}
