use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Shared counters for one run, written by every worker and read by the
/// status reporter and the final summary.
///
/// The numeric counters sit on the hot path of every request and use
/// lock-free atomics. The error set only grows on the failure path, so it
/// takes a short mutex-guarded critical section instead.
#[derive(Debug, Default)]
pub struct RunMetrics {
    total_requests: AtomicU64,
    failed_requests: AtomicU64,
    unique_errors: Mutex<ErrorSet>,
}

/// Deduplicated error labels in insertion order.
#[derive(Debug, Default)]
struct ErrorSet {
    seen: HashSet<String>,
    ordered: Vec<String>,
}

/// Point-in-time read of the counters. Fields are read individually, so a
/// snapshot taken while workers are mid-record may lag by a few requests;
/// `total_requests >= failed_requests` holds at every observed instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub failed_requests: u64,
    pub unique_errors: u64,
}

impl RunMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a failed request and remembers its label once. Duplicate labels
    /// neither grow the set nor double-count.
    pub fn record_failure(&self, label: &str) {
        // Total first, and failed with Release: a snapshot that acquires the
        // failed count then also sees the matching total increments, so no
        // reader observes failed > total.
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.failed_requests.fetch_add(1, Ordering::Release);

        let mut set = self
            .unique_errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if set.seen.insert(label.to_owned()) {
            set.ordered.push(label.to_owned());
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let unique_errors = self
            .unique_errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .ordered
            .len();
        // Failed is read first: the Acquire load pairs with the Release
        // increment in `record_failure`, making every total increment that
        // preceded a counted failure visible to the total load below.
        let failed_requests = self.failed_requests.load(Ordering::Acquire);
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        MetricsSnapshot {
            total_requests,
            failed_requests,
            unique_errors: u64::try_from(unique_errors).unwrap_or(u64::MAX),
        }
    }

    /// Every distinct failure label recorded so far, oldest first.
    #[must_use]
    pub fn unique_error_labels(&self) -> Vec<String> {
        self.unique_errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .ordered
            .clone()
    }
}
