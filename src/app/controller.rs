use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::AppResult;
use crate::http::{Transport, run_sender};
use crate::metrics::{MetricsSnapshot, RunMetrics};
use crate::shutdown::{self, ShutdownSender};

use super::status::spawn_status_reporter;

/// Everything one run needs. Immutable for the lifetime of the run; the same
/// plan can seed any number of consecutive runs.
#[derive(Clone)]
pub struct RunPlan {
    pub transport: Arc<dyn Transport>,
    pub workers: usize,
    /// `None` means run until an explicit stop (interactive mode).
    pub duration: Option<Duration>,
    pub status_line: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// `start` while already running; the in-progress run is undisturbed.
    AlreadyRunning,
}

#[derive(Debug)]
pub enum StopOutcome {
    Stopped(RunReport),
    /// `stop` while idle; nothing to do.
    NothingRunning,
}

/// Final snapshot of one finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub snapshot: MetricsSnapshot,
    pub unique_errors: Vec<String>,
    pub elapsed: Duration,
}

/// Longest deadline a plan duration can produce. Anything larger clamps here
/// so an overflowing duration never turns a bounded run into an unbounded one.
pub(crate) const MAX_RUN_DURATION: Duration = Duration::from_secs(31_536_000); // one year

pub(crate) fn deadline_for(started_at: Instant, duration: Option<Duration>) -> Option<Instant> {
    duration.map(|period| {
        started_at
            .checked_add(period.min(MAX_RUN_DURATION))
            .unwrap_or(started_at)
    })
}

/// One spawned request loop, tracked so stop can join every task ever
/// started, not just the original batch.
struct WorkerRecord {
    handle: JoinHandle<()>,
    spawned_at: Instant,
}

struct ActiveRun {
    transport: Arc<dyn Transport>,
    metrics: Arc<RunMetrics>,
    shutdown_tx: ShutdownSender,
    workers: Vec<WorkerRecord>,
    reporter: Option<JoinHandle<()>>,
    started_at: Instant,
    deadline: Option<Instant>,
}

impl ActiveRun {
    fn spawn_workers(&mut self, count: usize) {
        for _ in 0..count {
            let handle = tokio::spawn(run_sender(
                Arc::clone(&self.transport),
                Arc::clone(&self.metrics),
                self.shutdown_tx.subscribe(),
                self.deadline,
            ));
            self.workers.push(WorkerRecord {
                handle,
                spawned_at: Instant::now(),
            });
        }
    }
}

/// Owns the run lifecycle: `Idle -> Running -> Stopping -> Idle`. `active`
/// is `Some` exactly while Running; both control calls are idempotent no-ops
/// out of state.
#[derive(Default)]
pub struct RunController {
    active: Option<ActiveRun>,
}

impl RunController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh run: new metrics, new shutdown channel, deadline from
    /// the plan duration, `workers` sender tasks plus one status reporter.
    pub fn start(&mut self, plan: &RunPlan) -> StartOutcome {
        if self.active.is_some() {
            warn!("start requested while a run is active");
            return StartOutcome::AlreadyRunning;
        }

        let started_at = Instant::now();
        let deadline = deadline_for(started_at, plan.duration);
        let mut run = ActiveRun {
            transport: Arc::clone(&plan.transport),
            metrics: Arc::new(RunMetrics::new()),
            shutdown_tx: shutdown::channel(),
            workers: Vec::with_capacity(plan.workers),
            reporter: None,
            started_at,
            deadline,
        };
        run.spawn_workers(plan.workers);
        if plan.status_line {
            run.reporter = Some(spawn_status_reporter(
                Arc::clone(&run.metrics),
                &run.shutdown_tx,
                deadline,
            ));
        }

        info!("run started with {} workers", plan.workers);
        self.active = Some(run);
        StartOutcome::Started
    }

    /// Adds workers to the active run; new workers join the same metrics and
    /// shutdown signal. Returns how many were spawned (zero while idle).
    pub fn grow(&mut self, count: usize) -> usize {
        match self.active.as_mut() {
            Some(run) => {
                run.spawn_workers(count);
                count
            }
            None => 0,
        }
    }

    /// Reaps worker records whose task already finished, so a long-lived
    /// interactive run cannot grow its registry without bound. Returns the
    /// number reaped.
    pub async fn reap_finished(&mut self) -> usize {
        let Some(run) = self.active.as_mut() else {
            return 0;
        };
        let mut kept = Vec::with_capacity(run.workers.len());
        let mut reaped = 0usize;
        for record in run.workers.drain(..) {
            if record.handle.is_finished() {
                if record.handle.await.is_err() {
                    warn!("worker task failed before reap");
                }
                debug!("reaped worker alive for {:?}", record.spawned_at.elapsed());
                reaped = reaped.saturating_add(1);
            } else {
                kept.push(record);
            }
        }
        run.workers = kept;
        reaped
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Tracked (not yet reaped) worker records in the active run.
    #[must_use]
    pub fn active_workers(&self) -> usize {
        self.active.as_ref().map_or(0, |run| run.workers.len())
    }

    /// Live counters of the active run, if any.
    #[must_use]
    pub fn status(&self) -> Option<MetricsSnapshot> {
        self.active.as_ref().map(|run| run.metrics.snapshot())
    }

    /// Waits for every worker to exit naturally at the deadline.
    ///
    /// # Errors
    ///
    /// Returns an error when a worker task cannot be joined.
    pub async fn join_workers(&mut self) -> AppResult<()> {
        if let Some(run) = self.active.as_mut() {
            for record in run.workers.drain(..) {
                record.handle.await?;
            }
        }
        Ok(())
    }

    /// Signals shutdown, joins every remaining task, and reports the final
    /// snapshot. Shutdown latency is bounded by one in-flight request timeout
    /// plus one fault backoff per worker.
    pub async fn stop(&mut self) -> StopOutcome {
        let Some(mut run) = self.active.take() else {
            info!("stop requested with no active run");
            return StopOutcome::NothingRunning;
        };

        drop(run.shutdown_tx.send(()));
        for record in run.workers.drain(..) {
            if record.handle.await.is_err() {
                warn!("worker task failed during shutdown");
            }
        }
        if let Some(reporter) = run.reporter.take()
            && reporter.await.is_err()
        {
            warn!("status reporter failed during shutdown");
        }

        let report = RunReport {
            snapshot: run.metrics.snapshot(),
            unique_errors: run.metrics.unique_error_labels(),
            elapsed: run.started_at.elapsed(),
        };
        info!(
            "run stopped after {:?} with {} requests",
            report.elapsed, report.snapshot.total_requests
        );
        StopOutcome::Stopped(report)
    }
}
