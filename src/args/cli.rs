use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use reqwest::Url;
use tracing::warn;

use crate::error::AppResult;
use crate::http::TransportSettings;
use crate::payload::{DEFAULT_PAYLOAD_BYTES, Payload};

use super::parsers::{normalize_target, parse_duration_arg};

/// Worker count substituted when the requested value is out of range.
pub const DEFAULT_WORKERS: usize = 10;
/// Upper bound on concurrent workers for one process.
pub const MAX_WORKERS: usize = 1024;

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Concurrent HTTP load-generation CLI - worker pools, live status reporting, and error-diversity summaries."
)]
pub struct LoadArgs {
    /// Target server URL or IP (scheme defaults to http://)
    #[arg(long, short)]
    pub url: String,

    /// Endpoint path appended to the target
    #[arg(long, default_value = "/")]
    pub path: String,

    /// Run duration in seconds (batch mode)
    #[arg(long, short = 't', required_unless_present = "interactive")]
    pub duration: Option<u64>,

    /// Number of concurrent workers (1-1024; out of range falls back to 10)
    #[arg(long, short = 'w', default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Payload file attached to every request (built-in buffer when omitted)
    #[arg(long)]
    pub payload: Option<PathBuf>,

    /// Size in bytes of the built-in payload
    #[arg(long = "payload-size", default_value_t = DEFAULT_PAYLOAD_BYTES)]
    pub payload_size: usize,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(long = "request-timeout", value_parser = parse_duration_arg, default_value = "10s")]
    pub request_timeout: Duration,

    /// Connect timeout (supports ms/s/m/h)
    #[arg(long = "connect-timeout", value_parser = parse_duration_arg, default_value = "5s")]
    pub connect_timeout: Duration,

    /// Maximum redirects followed per request
    #[arg(long = "redirect-limit", default_value_t = 3)]
    pub redirect_limit: usize,

    /// Menu-driven mode: start one attack, grow its worker set, stop on demand
    #[arg(long, short)]
    pub interactive: bool,

    /// Disable the live status line
    #[arg(long = "no-status")]
    pub no_status: bool,

    /// Enable debug logging
    #[arg(long, short)]
    pub verbose: bool,
}

impl LoadArgs {
    /// Worker count clamped to a sane range; an out-of-range request keeps
    /// the run alive with the default instead of failing.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        if (1..=MAX_WORKERS).contains(&self.workers) {
            self.workers
        } else {
            warn!(
                "Worker count {} outside 1..={}; using default {}",
                self.workers, MAX_WORKERS, DEFAULT_WORKERS
            );
            DEFAULT_WORKERS
        }
    }

    /// Full normalized target URL.
    ///
    /// # Errors
    ///
    /// Returns an error when the target cannot form a valid URL.
    pub fn target_url(&self) -> AppResult<Url> {
        normalize_target(&self.url, &self.path)
    }

    /// Loads the payload named by the arguments.
    ///
    /// # Errors
    ///
    /// Returns an error when the payload file is missing or empty, or the
    /// built-in size is zero.
    pub fn load_payload(&self) -> AppResult<Payload> {
        match self.payload.as_ref() {
            Some(path) => Payload::from_file(path),
            None => Payload::generated(self.payload_size),
        }
    }

    #[must_use]
    pub const fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            request_timeout: self.request_timeout,
            connect_timeout: self.connect_timeout,
            redirect_limit: self.redirect_limit,
        }
    }

    /// Batch run duration; `None` in interactive mode, which runs until an
    /// explicit stop.
    #[must_use]
    pub fn run_duration(&self) -> Option<Duration> {
        if self.interactive {
            None
        } else {
            self.duration.map(Duration::from_secs)
        }
    }
}
