//! Full extraction for one location.

use salesdb_core::ValidationError;
use tokio_util::sync::CancellationToken;

use crate::error::SquareError;
use crate::parse::RawTransaction;

use super::pager::{OrderPager, OrderQuery};
use super::SquareClient;

/// Everything fetched for one location.
///
/// When `error` is set, `transactions` still holds whatever was fetched
/// before the failing page.
#[derive(Debug, Default)]
pub struct Extraction {
    pub transactions: Vec<RawTransaction>,
    pub rejected: Vec<ValidationError>,
    pub orders_fetched: usize,
    pub pages: usize,
    pub error: Option<SquareError>,
}

impl Extraction {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

impl SquareClient {
    /// Drains an [`OrderPager`] for `query`, keeping partial results on
    /// failure.
    pub async fn extract_orders(
        &self,
        query: OrderQuery,
        cancel: &CancellationToken,
    ) -> Extraction {
        let location_id = query.location_id.clone();
        let mut pager = OrderPager::new(self, query, cancel.clone());
        let mut extraction = Extraction::default();

        loop {
            match pager.next_page().await {
                Ok(Some(page)) => {
                    extraction.orders_fetched += page.orders_received;
                    extraction.transactions.extend(page.transactions);
                    extraction.rejected.extend(page.rejected);
                }
                Ok(None) => break,
                Err(err) => {
                    tracing::error!(
                        location = %location_id,
                        salvaged_orders = extraction.orders_fetched,
                        error = %err,
                        "extraction stopped"
                    );
                    extraction.error = Some(err);
                    break;
                }
            }
        }

        extraction.pages = pager.pages();
        tracing::info!(
            location = %location_id,
            orders = extraction.orders_fetched,
            pages = extraction.pages,
            complete = extraction.is_complete(),
            "extraction finished"
        );
        extraction
    }
}
