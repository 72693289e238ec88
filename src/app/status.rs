use std::io::{IsTerminal, Write};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    cursor, queue,
    style::Print,
    terminal::{Clear, ClearType},
};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::metrics::RunMetrics;
use crate::shutdown::ShutdownSender;

use super::rss::read_rss_bytes;

const TICK_INTERVAL: Duration = Duration::from_secs(1);
const BYTES_PER_MB: u64 = 1024 * 1024;

/// Spawns the status reporter: once per tick it samples the shared metrics,
/// derives requests-per-tick from the delta, and overwrites one stderr line.
/// A read-only consumer; it never touches worker state.
pub(crate) fn spawn_status_reporter(
    metrics: Arc<RunMetrics>,
    shutdown_tx: &ShutdownSender,
    deadline: Option<Instant>,
) -> JoinHandle<()> {
    let mut shutdown_rx = shutdown_tx.subscribe();

    tokio::spawn(async move {
        if !std::io::stderr().is_terminal() {
            // Nothing to render; wait for shutdown so joining stays uniform.
            drop(shutdown_rx.recv().await);
            return;
        }

        let run_start = Instant::now();
        let mut last_total = 0u64;
        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately; swallow it so every rendered
        // delta covers a full interval.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                _ = ticker.tick() => {
                    if let Some(deadline) = deadline
                        && Instant::now() >= deadline
                    {
                        break;
                    }
                    let snapshot = metrics.snapshot();
                    let per_tick = snapshot.total_requests.saturating_sub(last_total);
                    last_total = snapshot.total_requests;
                    let line = status_line(
                        run_start.elapsed(),
                        per_tick,
                        snapshot.total_requests,
                        read_rss_bytes(),
                    );
                    if render_line(&line).is_err() {
                        break;
                    }
                }
            }
        }

        drop(finish_line());
    })
}

fn status_line(elapsed: Duration, per_tick: u64, total: u64, rss_bytes: Option<u64>) -> String {
    let secs = elapsed.as_secs();
    let minutes = secs.checked_div(60).unwrap_or(0);
    let seconds = secs.checked_rem(60).unwrap_or(0);
    let memory = rss_bytes.map_or_else(
        || "n/a".to_owned(),
        |bytes| format!("{}MB", bytes.checked_div(BYTES_PER_MB).unwrap_or(0)),
    );
    format!(
        "Time: {:02}:{:02} | RPS: {} | Sent: {} | Memory: {}",
        minutes, seconds, per_tick, total, memory
    )
}

fn render_line(line: &str) -> Result<(), std::io::Error> {
    let mut out = std::io::stderr();
    queue!(
        out,
        cursor::MoveToColumn(0),
        Clear(ClearType::CurrentLine),
        Print(line)
    )?;
    out.flush()
}

fn finish_line() -> Result<(), std::io::Error> {
    let mut out = std::io::stderr();
    out.write_all(b"\n")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_formats_elapsed_and_memory() {
        let line = status_line(
            Duration::from_secs(75),
            1_200,
            50_000,
            Some(12 * BYTES_PER_MB),
        );
        assert_eq!(line, "Time: 01:15 | RPS: 1200 | Sent: 50000 | Memory: 12MB");
    }

    #[test]
    fn status_line_handles_missing_memory() {
        let line = status_line(Duration::ZERO, 0, 0, None);
        assert_eq!(line, "Time: 00:00 | RPS: 0 | Sent: 0 | Memory: n/a");
    }
}
