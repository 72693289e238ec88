use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, sleep, sleep_until};
use tracing::debug;

use crate::metrics::RunMetrics;
use crate::shutdown::ShutdownReceiver;

use super::transport::{SendOutcome, Transport};

/// Delay after a transport fault before the next attempt, so a completely
/// unreachable target is not hot-spun against. Ordinary rejected responses
/// proceed immediately.
pub const FAULT_BACKOFF: Duration = Duration::from_millis(100);

/// One worker: sends requests back to back until the deadline passes or the
/// shutdown signal fires, recording every outcome into the shared metrics.
///
/// The shutdown receiver is raced against the in-flight request and against
/// the fault backoff, so cancellation latency is bounded by one request
/// timeout plus one backoff. Per-request errors never escape the loop.
pub async fn run_sender(
    transport: Arc<dyn Transport>,
    metrics: Arc<RunMetrics>,
    mut shutdown_rx: ShutdownReceiver,
    deadline: Option<Instant>,
) {
    loop {
        let outcome = if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                break;
            }
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                _ = sleep_until(deadline) => break,
                outcome = transport.send() => outcome,
            }
        } else {
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                outcome = transport.send() => outcome,
            }
        };

        match outcome {
            SendOutcome::Success => metrics.record_success(),
            SendOutcome::Rejected { label } => metrics.record_failure(&label),
            SendOutcome::Fault { label } => {
                debug!("transport fault: {}", label);
                metrics.record_failure(&label);
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    _ = sleep(FAULT_BACKOFF) => {}
                }
            }
        }
    }
}
