use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url, multipart, redirect};

use crate::error::{AppError, AppResult, HttpError};

/// Placeholder used when a failed exchange carries no message text.
pub const NO_MESSAGE_PLACEHOLDER: &str = "No error message";

/// Longest message text kept in a failure label. Labels feed a deduplicated
/// set, so unbounded bodies would defeat deduplication.
const MAX_LABEL_MESSAGE_CHARS: usize = 120;

/// Outcome of one request exchange.
///
/// A request is `Success` only when the exchange completed at the transport
/// level and carried a 2xx status. A completed exchange with any other status
/// is `Rejected`; anything that prevented the exchange from completing
/// (refused connection, timeout, DNS or TLS failure) is `Fault`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Success,
    Rejected { label: String },
    Fault { label: String },
}

/// One-request capability the worker loop drives. TLS trust, redirect policy,
/// and connection reuse are owned entirely by the implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self) -> SendOutcome;
}

#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub redirect_limit: usize,
}

/// reqwest-backed transport: POSTs the payload as a multipart `file` part on
/// every call, reusing one pooled client for the whole run.
pub struct HttpTransport {
    client: Client,
    url: Url,
    payload: Arc<[u8]>,
}

impl HttpTransport {
    /// Builds the HTTP client for one run: accept-any-certificate, bounded
    /// redirect following, fixed connect/request timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying client cannot be constructed.
    pub fn new(url: Url, payload: Arc<[u8]>, settings: &TransportSettings) -> AppResult<Self> {
        let redirect_policy = if settings.redirect_limit == 0 {
            redirect::Policy::none()
        } else {
            redirect::Policy::limited(settings.redirect_limit)
        };
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .connect_timeout(settings.connect_timeout)
            .redirect(redirect_policy)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|err| AppError::http(HttpError::BuildClientFailed { source: err }))?;
        Ok(Self {
            client,
            url,
            payload,
        })
    }

    fn form(&self) -> multipart::Form {
        let part = multipart::Part::bytes(self.payload.to_vec()).file_name("payload.bin");
        multipart::Form::new().part("file", part)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self) -> SendOutcome {
        let request = self.client.post(self.url.clone()).multipart(self.form());
        match request.send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return SendOutcome::Success;
                }
                let message = match response.text().await {
                    Ok(body) => normalize_message(&body),
                    Err(_) => NO_MESSAGE_PLACEHOLDER.to_owned(),
                };
                SendOutcome::Rejected {
                    label: format!("{} - {}", status.as_u16(), message),
                }
            }
            Err(err) => SendOutcome::Fault {
                label: fault_label(&err),
            },
        }
    }
}

/// Collapses a message body to one bounded line so syntactically identical
/// failures deduplicate to one label.
fn normalize_message(body: &str) -> String {
    let line = body.lines().next().unwrap_or("").trim();
    if line.is_empty() {
        return NO_MESSAGE_PLACEHOLDER.to_owned();
    }
    line.chars().take(MAX_LABEL_MESSAGE_CHARS).collect()
}

/// Uses the root cause text so repeated faults against the same dead target
/// produce one label instead of one per URL-decorated wrapper.
fn fault_label(err: &reqwest::Error) -> String {
    let mut label = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        label = inner.to_string();
        source = inner.source();
    }
    if label.trim().is_empty() {
        NO_MESSAGE_PLACEHOLDER.to_owned()
    } else {
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_body_gets_the_placeholder() {
        assert_eq!(normalize_message(""), NO_MESSAGE_PLACEHOLDER);
        assert_eq!(normalize_message("   \n  "), NO_MESSAGE_PLACEHOLDER);
    }

    #[test]
    fn body_is_collapsed_to_one_trimmed_line() {
        assert_eq!(normalize_message("  server error  \nstack trace"), "server error");
    }

    #[test]
    fn long_bodies_are_bounded() {
        let body = "x".repeat(10_000);
        assert_eq!(normalize_message(&body).chars().count(), MAX_LABEL_MESSAGE_CHARS);
    }
}
