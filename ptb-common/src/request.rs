//! Resilient JSON request layer
//!
//! One logical HTTP JSON exchange with bounded exponential-backoff retry,
//! offline detection, and cooperative cancellation. Only transient failures
//! (connection errors, HTTP 5xx/429, unparseable bodies on a 2xx) consume
//! retry budget; any other non-2xx response is returned as-is so the caller
//! can inspect the application-level `{ok, data?, error?}` envelope.
//!
//! A `RequestSite` gives call sites single-flight semantics: beginning a new
//! request supersedes (cancels) the previous in-flight one, so at most one
//! attempt per site is outstanding and stale responses cannot race.

use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Default base delay between retries
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(400);

/// Default retry count beyond the first attempt (3 total tries)
pub const DEFAULT_RETRIES: u32 = 2;

/// Retry schedule: attempt ceiling and exponential backoff base
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries beyond the first attempt
    pub retries: u32,
    /// Base delay; attempt n (0-indexed) waits `base * 2^n` before retrying
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Backoff delay after the given 0-indexed attempt
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

/// Failures surfaced by [`fetch_json_with_retry`]
#[derive(Debug, Error)]
pub enum RequestError {
    /// Connectivity probe reported offline; no attempt was made
    #[error("You appear to be offline. Reconnect and try again.")]
    Offline,

    /// 2xx response whose body failed to parse as JSON
    #[error("Invalid JSON response.")]
    InvalidJson,

    /// Retryable HTTP status (5xx or 429) after exhausting retries
    #[error("{message}")]
    Status { status: u16, message: String },

    /// Transport-level failure (connect, timeout, body read)
    #[error("Request failed: {0}")]
    Network(String),

    /// The request was aborted by a newer request from the same site
    #[error("Request cancelled")]
    Cancelled,
}

impl RequestError {
    /// Cancelled requests are surfaced as a silent no-op by callers
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RequestError::Cancelled)
    }
}

/// Result of one logical exchange: HTTP status plus parsed JSON body, if any
#[derive(Debug)]
pub struct FetchOutcome {
    pub status: StatusCode,
    pub body: Option<serde_json::Value>,
}

/// Application-protocol envelope used by the bridge HTTP boundary
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

/// Network connectivity probe, checked before every attempt
pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Probe that always reports online (native processes have no equivalent of
/// a browser's offline signal; embedders with one implement [`Connectivity`])
#[derive(Debug, Default)]
pub struct AlwaysOnline;

impl Connectivity for AlwaysOnline {
    fn is_online(&self) -> bool {
        true
    }
}

/// Single-flight guard for one logical call site.
///
/// `begin` cancels whatever request the site had in flight and hands back a
/// fresh token for the new one.
#[derive(Debug, Default)]
pub struct RequestSite {
    current: Mutex<Option<CancellationToken>>,
}

impl RequestSite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supersede any in-flight request and return the token for the new one.
    pub fn begin(&self) -> CancellationToken {
        let token = CancellationToken::new();
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = current.replace(token.clone()) {
            previous.cancel();
        }
        token
    }
}

/// Perform one logical JSON exchange with bounded retry.
///
/// The request builder must be cloneable (JSON and form bodies are; streamed
/// bodies are not). Offline detection fails the whole call immediately with
/// the offline message. An aborted attempt is never retried.
pub async fn fetch_json_with_retry(
    request: reqwest::RequestBuilder,
    policy: &RetryPolicy,
    connectivity: &dyn Connectivity,
    cancel: &CancellationToken,
) -> Result<FetchOutcome, RequestError> {
    let mut attempt: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(RequestError::Cancelled);
        }
        if !connectivity.is_online() {
            return Err(RequestError::Offline);
        }

        let error = match execute_attempt(&request, cancel).await {
            Ok(outcome) => return Ok(outcome),
            Err(e) => e,
        };

        // Aborts and offline probes never consume retry budget
        if error.is_cancelled() {
            return Err(error);
        }

        if attempt >= policy.retries {
            warn!(attempt, error = %error, "Retry budget exhausted");
            return Err(error);
        }

        let backoff = policy.delay_for_attempt(attempt);
        debug!(attempt, backoff_ms = backoff.as_millis() as u64, error = %error, "Retrying request");
        tokio::select! {
            _ = cancel.cancelled() => return Err(RequestError::Cancelled),
            _ = sleep(backoff) => {}
        }
        attempt += 1;
    }
}

async fn execute_attempt(
    request: &reqwest::RequestBuilder,
    cancel: &CancellationToken,
) -> Result<FetchOutcome, RequestError> {
    let attempt_request = request
        .try_clone()
        .ok_or_else(|| RequestError::Network("Request body is not cloneable".to_string()))?;

    let response = tokio::select! {
        _ = cancel.cancelled() => return Err(RequestError::Cancelled),
        result = attempt_request.send() => {
            result.map_err(|e| RequestError::Network(e.to_string()))?
        }
    };

    let status = response.status();
    let bytes = tokio::select! {
        _ = cancel.cancelled() => return Err(RequestError::Cancelled),
        result = response.bytes() => {
            result.map_err(|e| RequestError::Network(e.to_string()))?
        }
    };

    let body: Option<serde_json::Value> = serde_json::from_slice(&bytes).ok();

    // 204/205 legitimately carry no body; anything else successful must
    // parse, otherwise the exchange is treated as a transient failure.
    if status.is_success()
        && body.is_none()
        && status != StatusCode::NO_CONTENT
        && status != StatusCode::RESET_CONTENT
    {
        return Err(RequestError::InvalidJson);
    }

    if !status.is_success() {
        let message = body
            .as_ref()
            .and_then(|b| b.get("error"))
            .and_then(|e| e.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Server error ({}).", status.as_u16()));

        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(RequestError::Status {
                status: status.as_u16(),
                message,
            });
        }
        // Terminal non-2xx: the caller inspects the envelope itself
    }

    Ok(FetchOutcome { status, body })
}
