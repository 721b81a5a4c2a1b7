//! Retry with exponential back-off and jitter for Square requests.
//!
//! [`retry_with_backoff`] wraps one page request. Rate limits, network
//! failures and 5xx responses are retried; everything else is returned on
//! the first occurrence. Cancellation interrupts both the in-flight request
//! and any back-off sleep.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{is_transient_http, SquareError};

const MAX_DELAY_MS: u64 = 60_000;

/// How many times a request is attempted and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first request.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on every further retry.
    pub backoff_base_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            backoff_base_ms: 1_000,
        }
    }
}

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** HTTP 429, HTTP 5xx, and network failures (timeout,
/// connection refused/reset/closed, body read).
///
/// **Not retriable:** authentication and request errors (400/401/403/404/422),
/// undecodable bodies, and cancellation.
pub(crate) fn is_retriable(err: &SquareError) -> bool {
    match err {
        SquareError::Http(e) => is_transient_http(e),
        SquareError::RateLimited { .. } | SquareError::ServerError { .. } => true,
        SquareError::Unauthorized { .. }
        | SquareError::BadRequest { .. }
        | SquareError::UnexpectedStatus { .. }
        | SquareError::Deserialize { .. }
        | SquareError::PaginationLimit { .. }
        | SquareError::RetriesExhausted { .. }
        | SquareError::InvalidConfig(_)
        | SquareError::Cancelled => false,
    }
}

/// Delay before retry number `retry` (1-based): `base * 2^(retry-1)`, capped
/// at 60 s, ±25 % jitter, and never shorter than a server-supplied
/// `Retry-After`.
pub(crate) fn backoff_delay_ms(
    backoff_base_ms: u64,
    retry: u32,
    retry_after_secs: Option<u64>,
) -> u64 {
    let computed = backoff_base_ms.saturating_mul(1u64 << retry.saturating_sub(1).min(20));
    let capped = computed.min(MAX_DELAY_MS);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
    let floor = retry_after_secs.map_or(0, |secs| secs.saturating_mul(1_000));
    jittered.max(floor)
}

/// Runs `operation` up to `policy.max_attempts` times.
///
/// When a retriable error persists through the last attempt the result is
/// [`SquareError::RetriesExhausted`] carrying the attempt count and the last
/// error. Non-retriable errors are returned unchanged.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    cancel: &CancellationToken,
    mut operation: F,
) -> Result<T, SquareError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SquareError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(SquareError::Cancelled),
            outcome = operation() => outcome,
        };

        let err = match outcome {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !is_retriable(&err) {
            return Err(err);
        }
        if attempt >= max_attempts {
            return Err(SquareError::RetriesExhausted {
                attempts: attempt,
                source: Box::new(err),
            });
        }

        let retry_after_secs = match &err {
            SquareError::RateLimited { retry_after_secs } => *retry_after_secs,
            _ => None,
        };
        let delay_ms = backoff_delay_ms(policy.backoff_base_ms, attempt, retry_after_secs);
        tracing::warn!(
            attempt,
            max_attempts,
            delay_ms,
            error = %err,
            "Square transient error, retrying after back-off"
        );

        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(SquareError::Cancelled),
            () = tokio::time::sleep(Duration::from_millis(delay_ms)) => {}
        }
    }
}
