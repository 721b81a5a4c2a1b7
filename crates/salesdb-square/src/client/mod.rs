//! HTTP client for the Square Orders API.

mod extract;
mod pager;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use tokio_util::sync::CancellationToken;

use crate::error::SquareError;
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::types::{SearchOrdersRequest, SearchOrdersResponse};

pub use extract::Extraction;
pub use pager::{OrderPage, OrderPager, OrderQuery};

/// Maximum number of pages fetched for one location before giving up.
/// Guards against a cursor that never terminates.
pub(crate) const MAX_PAGES: usize = 10_000;

/// Authenticated client for `POST /orders/search`.
///
/// Rate limits (429), 5xx responses and network failures are retried per
/// the configured [`RetryPolicy`]; any other non-2xx status is returned as a
/// typed error on the first occurrence.
pub struct SquareClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl SquareClient {
    /// Creates a client that sends the bearer token and `Square-Version`
    /// header on every request.
    ///
    /// # Errors
    ///
    /// Returns [`SquareError::InvalidConfig`] if the token or version is not
    /// a valid header value, or [`SquareError::Http`] if the underlying
    /// `reqwest::Client` cannot be built.
    pub fn new(
        base_url: &str,
        access_token: &str,
        api_version: &str,
        timeout_secs: u64,
        retry: RetryPolicy,
    ) -> Result<Self, SquareError> {
        let mut auth =
            HeaderValue::from_str(&format!("Bearer {access_token}")).map_err(|_| {
                SquareError::InvalidConfig("access token is not a valid header value".into())
            })?;
        auth.set_sensitive(true);

        let version = HeaderValue::from_str(api_version).map_err(|_| {
            SquareError::InvalidConfig(format!(
                "API version \"{api_version}\" is not a valid header value"
            ))
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert("Square-Version", version);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("salesdb/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            retry,
        })
    }

    /// Fetches one page of orders, retrying transient failures.
    ///
    /// # Errors
    ///
    /// - [`SquareError::RetriesExhausted`] when 429/5xx/network failures
    ///   outlast the retry policy.
    /// - [`SquareError::Unauthorized`] on 401/403 (not retried).
    /// - [`SquareError::BadRequest`] on 400/404/422 (not retried).
    /// - [`SquareError::Deserialize`] if a 2xx body is not valid JSON (not retried).
    /// - [`SquareError::Cancelled`] once `cancel` fires.
    pub async fn search_orders_page(
        &self,
        request: &SearchOrdersRequest,
        cancel: &CancellationToken,
    ) -> Result<SearchOrdersResponse, SquareError> {
        let url = format!("{}/orders/search", self.base_url);

        retry_with_backoff(self.retry, cancel, || {
            let url = url.clone();
            async move {
                let response = self.client.post(&url).json(request).send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.trim().parse::<u64>().ok());
                    return Err(SquareError::RateLimited { retry_after_secs });
                }

                if status.is_server_error() {
                    return Err(SquareError::ServerError {
                        status: status.as_u16(),
                    });
                }

                if status == reqwest::StatusCode::UNAUTHORIZED
                    || status == reqwest::StatusCode::FORBIDDEN
                {
                    return Err(SquareError::Unauthorized {
                        status: status.as_u16(),
                    });
                }

                if status.is_client_error() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(SquareError::BadRequest {
                        status: status.as_u16(),
                        detail: error_detail(&body),
                    });
                }

                if !status.is_success() {
                    return Err(SquareError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<SearchOrdersResponse>(&body).map_err(|e| {
                    SquareError::Deserialize {
                        context: format!("orders/search page for {:?}", request.location_ids),
                        source: e,
                    }
                })
            }
        })
        .await
    }
}

/// Pulls the first entry of Square's `errors` array out of an error body,
/// falling back to the raw (truncated) body.
fn error_detail(body: &str) -> String {
    let parsed = serde_json::from_str::<SearchOrdersResponse>(body)
        .ok()
        .and_then(|r| r.errors)
        .and_then(|errors| errors.into_iter().next());
    match parsed {
        Some(err) => err.summary(),
        None => body.chars().take(200).collect(),
    }
}
