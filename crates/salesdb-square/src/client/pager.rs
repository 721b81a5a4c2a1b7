//! Lazy, cursor-driven pagination over `orders/search`.

use chrono::{DateTime, Utc};
use futures::Stream;
use salesdb_core::ValidationError;
use tokio_util::sync::CancellationToken;

use crate::error::SquareError;
use crate::parse::{parse_order, RawTransaction};
use crate::types::SearchOrdersRequest;

use super::{SquareClient, MAX_PAGES};

/// What to extract for one location.
#[derive(Debug, Clone)]
pub struct OrderQuery {
    /// Square location id.
    pub location_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub page_limit: u32,
    /// Stop after this many orders (sample mode).
    pub max_orders: Option<usize>,
}

/// One decoded page.
#[derive(Debug, Default)]
pub struct OrderPage {
    pub transactions: Vec<RawTransaction>,
    /// Orders and line items rejected while parsing this page.
    pub rejected: Vec<ValidationError>,
    /// Orders received on this page, accepted or not.
    pub orders_received: usize,
}

/// Fetches pages one at a time, carrying the continuation cursor forward.
///
/// After a failed page the pager is finished; pages already returned stay
/// valid.
pub struct OrderPager<'a> {
    client: &'a SquareClient,
    query: OrderQuery,
    cancel: CancellationToken,
    cursor: Option<String>,
    pages: usize,
    orders_seen: usize,
    done: bool,
}

impl<'a> OrderPager<'a> {
    #[must_use]
    pub fn new(client: &'a SquareClient, query: OrderQuery, cancel: CancellationToken) -> Self {
        Self {
            client,
            query,
            cancel,
            cursor: None,
            pages: 0,
            orders_seen: 0,
            done: false,
        }
    }

    /// Pages requested so far.
    #[must_use]
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Fetches the next page, or `Ok(None)` once the last page has been
    /// returned.
    ///
    /// # Errors
    ///
    /// Propagates [`SquareClient::search_orders_page`] errors and returns
    /// [`SquareError::PaginationLimit`] if the cursor never terminates.
    pub async fn next_page(&mut self) -> Result<Option<OrderPage>, SquareError> {
        if self.done {
            return Ok(None);
        }

        let remaining = self
            .query
            .max_orders
            .map(|cap| cap.saturating_sub(self.orders_seen));
        if remaining == Some(0) {
            self.done = true;
            return Ok(None);
        }

        if self.pages >= MAX_PAGES {
            self.done = true;
            return Err(SquareError::PaginationLimit {
                location_id: self.query.location_id.clone(),
                max_pages: MAX_PAGES,
            });
        }
        self.pages += 1;

        let limit = remaining.map_or(self.query.page_limit, |r| {
            u32::try_from(r).map_or(self.query.page_limit, |r| r.min(self.query.page_limit))
        });
        let request = SearchOrdersRequest::completed_between(
            &self.query.location_id,
            self.query.start,
            self.query.end,
            limit,
            self.cursor.take(),
        );

        let response = match self.client.search_orders_page(&request, &self.cancel).await {
            Ok(response) => response,
            Err(err) => {
                self.done = true;
                return Err(err);
            }
        };

        self.cursor = response.cursor.filter(|c| !c.is_empty());
        if self.cursor.is_none() {
            self.done = true;
        }

        let mut orders = response.orders.unwrap_or_default();
        if let Some(remaining) = remaining {
            if orders.len() >= remaining {
                orders.truncate(remaining);
                self.done = true;
            }
        }
        self.orders_seen += orders.len();

        let mut page = OrderPage {
            orders_received: orders.len(),
            ..OrderPage::default()
        };
        for order in orders {
            match parse_order(order) {
                Ok(parsed) => {
                    page.rejected.extend(parsed.rejected_items);
                    page.transactions.push(parsed.transaction);
                }
                Err(err) => {
                    tracing::warn!(
                        location = %self.query.location_id,
                        order_id = %err.order_id,
                        error = %err,
                        "order rejected"
                    );
                    page.rejected.push(err);
                }
            }
        }

        tracing::debug!(
            location = %self.query.location_id,
            page = self.pages,
            orders = page.orders_received,
            more = !self.done,
            "fetched orders page"
        );

        Ok(Some(page))
    }

    /// The same pages as a `Stream`; ends after the last page or the first
    /// error.
    pub fn into_stream(self) -> impl Stream<Item = Result<OrderPage, SquareError>> + 'a {
        futures::stream::unfold(self, |mut pager| async move {
            match pager.next_page().await {
                Ok(Some(page)) => Some((Ok(page), pager)),
                Ok(None) => None,
                Err(err) => Some((Err(err), pager)),
            }
        })
    }
}
