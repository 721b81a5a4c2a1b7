//! Batched, transactional loading of normalized sales.
//!
//! Each batch is its own transaction. A failing batch is rolled back and
//! reported; later batches are still attempted. Nothing is retried row by
//! row.

use salesdb_core::{LocationResolver, NormalizedSale, RunError, UnknownLocation};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::sales::insert_sales_batch;

/// Outcome of loading one location's sales.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub inserted: u64,
    /// Rows skipped because their natural key already existed.
    pub duplicates: u64,
    pub batches_attempted: usize,
    pub batches_failed: usize,
    /// Rows excluded before loading plus failed batches.
    pub errors: Vec<RunError>,
    /// Set when cancellation stopped the load before every batch ran.
    pub cancelled: bool,
}

/// Loads `sales` in batches of `batch_size` rows.
///
/// Every sale is re-resolved against `resolver` first; a sale whose
/// external location id is unknown, or resolves to a different internal id
/// than the one it carries, is excluded and reported as
/// [`RunError::UnknownLocation`].
///
/// Cancellation is checked before each batch. A batch that has started is
/// allowed to commit.
pub async fn load_sales<R: LocationResolver + ?Sized>(
    pool: &PgPool,
    resolver: &R,
    sales: Vec<NormalizedSale>,
    batch_size: usize,
    cancel: &CancellationToken,
) -> LoadReport {
    let mut report = LoadReport::default();
    let rows = resolve_rows(resolver, sales, &mut report.errors);

    for (batch, chunk) in rows.chunks(batch_size.max(1)).enumerate() {
        if cancel.is_cancelled() {
            tracing::warn!(batch, "load cancelled before batch");
            report.cancelled = true;
            break;
        }

        report.batches_attempted += 1;
        match write_batch(pool, chunk).await {
            Ok(inserted) => {
                let duplicates = chunk.len() as u64 - inserted;
                tracing::debug!(
                    batch,
                    rows = chunk.len(),
                    inserted,
                    duplicates,
                    "batch committed"
                );
                report.inserted += inserted;
                report.duplicates += duplicates;
            }
            Err(err) => {
                tracing::error!(batch, rows = chunk.len(), error = %err, "batch rolled back");
                report.batches_failed += 1;
                report.errors.push(RunError::LoadBatch {
                    batch,
                    rows: chunk.len(),
                    cause: err.to_string(),
                });
            }
        }
    }

    report
}

async fn write_batch(pool: &PgPool, chunk: &[NormalizedSale]) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    match insert_sales_batch(&mut *tx, chunk).await {
        Ok(inserted) => {
            tx.commit().await?;
            Ok(inserted)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}

fn resolve_rows<R: LocationResolver + ?Sized>(
    resolver: &R,
    sales: Vec<NormalizedSale>,
    errors: &mut Vec<RunError>,
) -> Vec<NormalizedSale> {
    let mut rows = Vec::with_capacity(sales.len());
    for sale in sales {
        match resolver.resolve(&sale.external_location_id) {
            Ok(id) if id == sale.location_id => rows.push(sale),
            Ok(_) => errors.push(RunError::UnknownLocation {
                order_id: sale.external_order_id,
                position: sale.line_item_position,
                source: UnknownLocation {
                    external_location_id: sale.external_location_id,
                },
            }),
            Err(source) => errors.push(RunError::UnknownLocation {
                order_id: sale.external_order_id,
                position: sale.line_item_position,
                source,
            }),
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use rust_decimal::Decimal;
    use salesdb_core::{Location, LocationCache};

    fn sale(position: i32, location_id: i64, external: &str) -> NormalizedSale {
        let ts = DateTime::parse_from_rfc3339("2025-10-03T12:45:12-05:00").unwrap();
        NormalizedSale {
            external_order_id: "O1".to_owned(),
            line_item_position: position,
            item_name: "Croissant".to_owned(),
            sale_price: Decimal::new(450, 2),
            quantity: 1,
            sale_timestamp: ts,
            month: "2025-10".to_owned(),
            day_of_week: "Friday".to_owned(),
            item_category: "N/A".to_owned(),
            location_id,
            external_location_id: external.to_owned(),
            modifiers: String::new(),
        }
    }

    fn cache() -> LocationCache {
        LocationCache::new([Location {
            id: 1,
            name: "Downtown".to_owned(),
            external_id: "L1".to_owned(),
        }])
    }

    #[test]
    fn resolve_rows_keeps_matching_sales() {
        let mut errors = Vec::new();
        let rows = resolve_rows(&cache(), vec![sale(0, 1, "L1"), sale(1, 1, "L1")], &mut errors);
        assert_eq!(rows.len(), 2);
        assert!(errors.is_empty());
    }

    #[test]
    fn resolve_rows_excludes_unknown_and_mismatched() {
        let mut errors = Vec::new();
        let rows = resolve_rows(
            &cache(),
            vec![sale(0, 1, "L1"), sale(1, 1, "LX"), sale(2, 7, "L1")],
            &mut errors,
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| matches!(e, RunError::UnknownLocation { .. })));
    }
}
